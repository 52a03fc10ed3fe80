use anyhow::{Context, Result};

use crate::app::App;
use crate::app::constants::{NO_INSTANCES_MESSAGE, NO_MATCHES_MESSAGE};
use crate::app::helpers::{filter_for_listing, list_line};
use crate::error::PickError;
use crate::model::Candidate;

impl App {
    fn running_instances(&self) -> Result<Vec<Candidate>> {
        self.out.debug("Fetching SSM-managed instances...");
        let instances = self.backend.list_instances().context("list instances")?;
        self.out
            .debug(&format!("Found {} running instances", instances.len()));
        Ok(instances)
    }

    /// Lines printed by `--list`.
    pub(crate) fn listing(&self, words: &[String]) -> Result<Vec<String>> {
        let instances = self.running_instances()?;
        if instances.is_empty() {
            return Ok(vec![NO_INSTANCES_MESSAGE.to_string()]);
        }
        let matched = filter_for_listing(instances, words);
        if matched.is_empty() {
            return Ok(vec![NO_MATCHES_MESSAGE.to_string()]);
        }
        Ok(matched.iter().map(list_line).collect())
    }

    fn choose(&self, candidates: &[Candidate]) -> Result<Candidate> {
        let recent = self.history.load().ids();
        Ok((self.pick)(candidates, &recent)?)
    }

    pub(crate) fn select_instance(&self) -> Result<Candidate> {
        let instances = self.running_instances()?;
        self.choose(&instances)
    }

    /// One match connects directly; several open the picker over the matches.
    pub(crate) fn select_by_name(&self, name: &str) -> Result<Candidate> {
        let instances = self.running_instances()?;
        if instances.is_empty() {
            return Err(PickError::EmptyInput.into());
        }
        let mut matches = filter_for_listing(instances, &[name.to_string()]);
        match matches.len() {
            0 => anyhow::bail!("no instances found matching \"{name}\""),
            1 => Ok(matches.remove(0)),
            _ => self.choose(&matches),
        }
    }

    /// Instance ids pass through; anything else is looked up by name.
    pub(crate) fn resolve_instance(&self, instance: &str) -> Result<String> {
        if instance.starts_with("i-") {
            return Ok(instance.to_string());
        }
        let candidate = self.select_by_name(instance)?;
        self.out
            .debug(&format!("Resolved {instance} to {}", candidate.id));
        Ok(candidate.id)
    }

    pub(crate) fn connect(&self, candidate: &Candidate) -> Result<()> {
        self.out
            .info(&format!("Starting session with {}...", candidate.id));
        if let Err(err) = self.history.record(&candidate.id, &candidate.display_name) {
            self.out.debug(&format!("Failed to save history: {err:#}"));
        }
        let result = self.backend.start_session(&candidate.id);
        let farewell = format!("Disconnected from {}", candidate.label());
        println!("{farewell}");
        self.out.log_line(&farewell);
        result.context("start session")
    }
}
