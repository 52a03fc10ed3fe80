use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;

use crate::error::TransferError;
use crate::ssm::exec::Executor;

/// Largest local file accepted for upload; the encoded script has to fit in a
/// single SendCommand request.
pub(crate) const MAX_UPLOAD_BYTES: u64 = 100 * 1024;

/// Systems Manager keeps at most this many characters of a command's stdout.
pub(crate) const SSM_STDOUT_LIMIT: usize = 24_000;

/// Quotes `value` for a POSIX shell.
pub(crate) fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub(crate) fn upload_script(payload: &[u8], remote_path: &str) -> String {
    format!(
        "echo '{}' | base64 -d > {}",
        Base64.encode(payload),
        shell_quote(remote_path)
    )
}

pub(crate) fn download_script(remote_path: &str) -> String {
    format!("base64 {}", shell_quote(remote_path))
}

/// Decodes `base64` output, ignoring the line breaks the tool inserts.
pub(crate) fn decode_payload(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Base64.decode(compact)
}

pub(crate) fn check_upload_size(local_path: &Path, size: u64) -> Result<(), TransferError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(TransferError::PayloadTooLarge {
            path: local_path.display().to_string(),
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Copies a small local file to `remote_path` on the instance. Returns the number
/// of bytes sent.
pub(crate) fn upload(
    executor: &Executor<'_>,
    local_path: &Path,
    target_id: &str,
    remote_path: &str,
) -> Result<u64, TransferError> {
    let local_error = |action, source| TransferError::Local {
        action,
        path: local_path.display().to_string(),
        source,
    };
    let meta = fs::metadata(local_path).map_err(|err| local_error("failed to read local file", err))?;
    check_upload_size(local_path, meta.len())?;

    let payload = fs::read(local_path).map_err(|err| local_error("failed to read local file", err))?;
    // The file may have grown between stat and read.
    check_upload_size(local_path, payload.len() as u64)?;

    executor.execute(target_id, &upload_script(&payload, remote_path))?;
    Ok(payload.len() as u64)
}

/// Copies `remote_path` from the instance to `local_path`. Returns the number of
/// bytes written.
pub(crate) fn download(
    executor: &Executor<'_>,
    target_id: &str,
    remote_path: &str,
    local_path: &Path,
) -> Result<u64, TransferError> {
    let output = executor.execute(target_id, &download_script(remote_path))?;
    if output.stdout.len() >= SSM_STDOUT_LIMIT {
        return Err(TransferError::OutputTruncated {
            target_id: target_id.to_string(),
            remote_path: remote_path.to_string(),
            limit: SSM_STDOUT_LIMIT,
        });
    }
    let data = decode_payload(&output.stdout).map_err(|err| TransferError::Decode {
        target_id: target_id.to_string(),
        remote_path: remote_path.to_string(),
        reason: err.to_string(),
    })?;
    fs::write(local_path, &data).map_err(|err| TransferError::Local {
        action: "failed to write local file",
        path: local_path.display().to_string(),
        source: err,
    })?;
    Ok(data.len() as u64)
}
