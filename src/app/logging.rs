use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use crossterm::style::Stylize;

use crate::app::constants::{
    LOG_MAX_ENTRIES, LOG_PARSE_FORMAT, LOG_RETENTION_DAYS, LOG_SEPARATOR,
    LOG_TIMESTAMP_FORMAT,
};

/// Console messages for the user, mirrored into the log file when one is set.
#[derive(Debug, Clone)]
pub(crate) struct Output {
    debug: bool,
    log_path: Option<PathBuf>,
}

impl Output {
    pub(crate) fn new(debug: bool, log_path: Option<PathBuf>) -> Self {
        Self { debug, log_path }
    }

    pub(crate) fn info(&self, message: &str) {
        println!("{} {message}", "ℹ".cyan());
        self.log_line(message);
    }

    pub(crate) fn success(&self, message: &str) {
        println!("{} {message}", "✓".green());
        self.log_line(message);
    }

    pub(crate) fn warning(&self, message: &str) {
        eprintln!("{} {message}", "⚠".yellow());
        self.log_line(&format!("WARN {message}"));
    }

    pub(crate) fn error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red(), message);
        self.log_line(&format!("ERROR {message}"));
    }

    /// Shown with `--debug`, always logged.
    pub(crate) fn debug(&self, message: &str) {
        if self.debug {
            eprintln!("{}", format!("[DEBUG] {message}").dark_grey());
        }
        self.log_line(&format!("DEBUG {message}"));
    }

    pub(crate) fn log_line(&self, message: &str) {
        let Some(log_path) = &self.log_path else {
            return;
        };
        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT);
        let line = format!("{timestamp}{LOG_SEPARATOR}{message}");
        if let Some(parent) = log_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(mut file) = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
        {
            let _ = writeln!(file, "{line}");
        }
    }
}

pub(crate) fn prune_log_file(path: &Path) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let cutoff = chrono::Local::now().naive_local() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let current_year = chrono::Local::now().year();
    let mut kept = Vec::new();
    for line in content.lines() {
        if let Some((timestamp, _)) = line.split_once(LOG_SEPARATOR) {
            let with_year = format!("{current_year}-{timestamp}");
            if let Ok(parsed) =
                chrono::NaiveDateTime::parse_from_str(&with_year, LOG_PARSE_FORMAT)
            {
                if parsed >= cutoff {
                    kept.push(line.to_string());
                }
            }
        }
    }
    if kept.len() > LOG_MAX_ENTRIES {
        kept = kept.split_off(kept.len().saturating_sub(LOG_MAX_ENTRIES));
    }
    if kept.is_empty() {
        let _ = fs::remove_file(path);
    } else if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
        let _ = fs::write(path, kept.join("\n") + "\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_log_file_removes_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connect.log");
        let now = chrono::Local::now().naive_local();
        let old = now - chrono::Duration::days(LOG_RETENTION_DAYS + 1);
        let recent = now - chrono::Duration::days(1);
        let old_line = format!("{}{}stale", old.format(LOG_TIMESTAMP_FORMAT), LOG_SEPARATOR);
        let recent_line = format!("{}{}fresh", recent.format(LOG_TIMESTAMP_FORMAT), LOG_SEPARATOR);
        fs::write(&path, format!("{old_line}\nnot a log line\n{recent_line}\n")).unwrap();
        prune_log_file(&path);
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(!content.contains("not a log line"));
        assert!(content.contains("fresh"));
    }

    #[test]
    fn prune_log_file_keeps_newest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connect.log");
        let stamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT).to_string();
        let lines: Vec<String> = (0..LOG_MAX_ENTRIES + 5)
            .map(|index| format!("{stamp}{LOG_SEPARATOR}entry {index}"))
            .collect();
        fs::write(&path, lines.join("\n")).unwrap();
        prune_log_file(&path);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), LOG_MAX_ENTRIES);
        assert!(content.lines().next().unwrap().ends_with("entry 5"));
    }

    #[test]
    fn debug_lines_are_logged_even_when_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("connect.log");
        let out = Output::new(false, Some(path.clone()));
        out.debug("Command ID: abc");
        out.log_line("Upload complete");
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" | DEBUG Command ID: abc"));
        assert!(lines[1].ends_with(" | Upload complete"));
    }

    #[test]
    fn no_log_path_writes_nothing() {
        let out = Output::new(false, None);
        out.debug("ignored");
        out.log_line("ignored");
    }
}
