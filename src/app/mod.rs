use std::sync::Arc;

use anyhow::Result;

use crate::app::logging::{Output, prune_log_file};
use crate::error::PickError;
use crate::model::{Candidate, Settings};
use crate::ssm::SsmBackend;
use crate::ssm::aws_cli::AwsCliBackend;
use crate::storage::{FileRecencyStore, RecencyStore, history_path, log_path};

pub(crate) mod constants;
mod connections;
pub(crate) mod helpers;
pub(crate) mod logging;
mod transfer;

/// Interactive selection over a candidate list with recent ids first.
pub(crate) type PickFn = fn(&[Candidate], &[String]) -> Result<Candidate, PickError>;

pub(crate) struct App {
    pub(crate) settings: Settings,
    pub(crate) out: Output,
    backend: Arc<dyn SsmBackend>,
    history: Arc<dyn RecencyStore>,
    pick: PickFn,
}

impl App {
    pub(crate) fn load(settings: Settings) -> Result<Self> {
        let log_path = log_path().ok();
        if let Some(path) = &log_path {
            prune_log_file(path);
        }
        let out = Output::new(settings.debug, log_path);
        let history = FileRecencyStore::new(history_path().ok(), settings.record_history);
        let backend = AwsCliBackend::new(&settings);
        if let Some(region) = &settings.region {
            out.debug(&format!("Region: {region}"));
        }
        Ok(Self::new(
            settings,
            out,
            Arc::new(backend),
            Arc::new(history),
            crate::picker::pick,
        ))
    }

    pub(crate) fn new(
        settings: Settings,
        out: Output,
        backend: Arc<dyn SsmBackend>,
        history: Arc<dyn RecencyStore>,
        pick: PickFn,
    ) -> Self {
        Self {
            settings,
            out,
            backend,
            history,
            pick,
        }
    }
}
