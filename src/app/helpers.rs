use crate::model::Candidate;
use crate::picker::filter::{matches_all, query_tokens};

/// One side of a copy: `instance:/path` is remote, anything else is local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location<'a> {
    Local(&'a str),
    Remote { instance: &'a str, path: &'a str },
}

pub(crate) fn parse_location(value: &str) -> Location<'_> {
    match value.split_once(':') {
        Some((instance, path)) if !instance.is_empty() && !path.is_empty() => {
            Location::Remote { instance, path }
        }
        _ => Location::Local(value),
    }
}

/// Accepts `-copy` and `-run` as spellings of `--copy` and `--run`.
pub(crate) fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            match arg.as_str() {
                "--" => {
                    passthrough = true;
                    arg
                }
                "-copy" => "--copy".to_string(),
                "-run" => "--run".to_string(),
                _ => arg,
            }
        })
        .collect()
}

pub(crate) fn filter_for_listing(instances: Vec<Candidate>, words: &[String]) -> Vec<Candidate> {
    let tokens = query_tokens(&words.join(" "));
    instances
        .into_iter()
        .filter(|candidate| matches_all(candidate, &tokens))
        .collect()
}

pub(crate) fn list_line(candidate: &Candidate) -> String {
    if candidate.display_name.is_empty() {
        format!("{}\t{}", candidate.id, candidate.address)
    } else {
        format!(
            "{}\t{}\t{}",
            candidate.id, candidate.display_name, candidate.address
        )
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < KB * KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / (KB * KB))
    }
}
