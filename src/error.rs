use std::io;

use thiserror::Error;

use crate::model::CommandStatus;

#[derive(Debug, Error)]
pub(crate) enum PickError {
    #[error("no instances available")]
    EmptyInput,
    #[error("selection cancelled")]
    Cancelled,
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ExecError {
    #[error("failed to send command to {target_id}: {reason}")]
    Submission { target_id: String, reason: String },
    #[error("command {command_id} on {target_id}: {status}: {stderr}")]
    Remote {
        command_id: String,
        target_id: String,
        status: CommandStatus,
        stderr: String,
    },
    #[error("command {command_id} on {target_id} cancelled while waiting")]
    Cancelled {
        command_id: String,
        target_id: String,
    },
    #[error("command {command_id} on {target_id} still unresolved after {waited_secs}s")]
    WaitExceeded {
        command_id: String,
        target_id: String,
        waited_secs: u64,
    },
}

#[derive(Debug, Error)]
pub(crate) enum TransferError {
    #[error("file size {size} bytes of {path} exceeds maximum allowed size of {limit} bytes (100KB)")]
    PayloadTooLarge {
        path: String,
        size: u64,
        limit: u64,
    },
    #[error(
        "output for {target_id}:{remote_path} reached the {limit}-character SSM output limit; \
         the file is too large to download this way"
    )]
    OutputTruncated {
        target_id: String,
        remote_path: String,
        limit: usize,
    },
    #[error("failed to decode content of {target_id}:{remote_path}: {reason}")]
    Decode {
        target_id: String,
        remote_path: String,
        reason: String,
    },
    #[error("{action} {path}: {source}")]
    Local {
        action: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Exec(#[from] ExecError),
}
