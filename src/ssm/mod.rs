use anyhow::Result;

use crate::model::{Candidate, Invocation};

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

pub(crate) mod aws_cli;
pub(crate) mod exec;
pub(crate) mod transfer;
pub(crate) mod wait;

/// Operations the tool needs from Systems Manager and EC2.
pub(crate) trait SsmBackend: Send + Sync {
    /// Running instances that are registered with Systems Manager.
    fn list_instances(&self) -> Result<Vec<Candidate>>;
    /// Submits `script` as a shell command and returns the command id.
    fn send_command(&self, target_id: &str, script: &str) -> Result<String>;
    fn get_invocation(&self, command_id: &str, target_id: &str) -> Result<Invocation>;
    /// Runs an interactive session attached to the current terminal.
    fn start_session(&self, target_id: &str) -> Result<()>;
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockSsmBackend {
    instances: Mutex<Vec<Candidate>>,
    submit_error: Mutex<Option<String>>,
    sent: Mutex<Vec<(String, String)>>,
    polls: Mutex<VecDeque<std::result::Result<Invocation, String>>>,
    poll_count: Mutex<usize>,
    sessions: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSsmBackend {
    pub(crate) fn set_instances(&self, instances: Vec<Candidate>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub(crate) fn fail_submit(&self, message: &str) {
        *self.submit_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn push_poll(&self, result: Result<Invocation>) {
        self.polls
            .lock()
            .unwrap()
            .push_back(result.map_err(|err| err.to_string()));
    }

    pub(crate) fn push_status(&self, status: crate::model::CommandStatus, stdout: &str, stderr: &str) {
        self.push_poll(Ok(Invocation {
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn poll_count(&self) -> usize {
        *self.poll_count.lock().unwrap()
    }

    pub(crate) fn sessions(&self) -> Vec<String> {
        self.sessions.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SsmBackend for MockSsmBackend {
    fn list_instances(&self) -> Result<Vec<Candidate>> {
        Ok(self.instances.lock().unwrap().clone())
    }

    fn send_command(&self, target_id: &str, script: &str) -> Result<String> {
        if let Some(err) = self.submit_error.lock().unwrap().as_ref() {
            return Err(anyhow::anyhow!(err.clone()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((target_id.to_string(), script.to_string()));
        Ok(format!("cmd-{}", sent.len()))
    }

    fn get_invocation(&self, _command_id: &str, _target_id: &str) -> Result<Invocation> {
        *self.poll_count.lock().unwrap() += 1;
        match self.polls.lock().unwrap().pop_front() {
            Some(Ok(invocation)) => Ok(invocation),
            Some(Err(err)) => Err(anyhow::anyhow!(err)),
            None => Err(anyhow::anyhow!("InvocationDoesNotExist")),
        }
    }

    fn start_session(&self, target_id: &str) -> Result<()> {
        self.sessions.lock().unwrap().push(target_id.to_string());
        Ok(())
    }
}
