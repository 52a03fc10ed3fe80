use std::time::Duration;

use crate::app::logging::Output;
use crate::error::ExecError;
use crate::model::{CommandOutput, CommandStatus, Invocation, PollPolicy};
use crate::ssm::SsmBackend;
use crate::ssm::wait::{WaitOutcome, Waiter};

/// A submitted command and everything the polling loop has learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandExecution {
    pub(crate) command_id: String,
    pub(crate) target_id: String,
    pub(crate) status: CommandStatus,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) poll_interval: Duration,
    pub(crate) waited: Duration,
}

impl CommandExecution {
    pub(crate) fn new(command_id: String, target_id: String, policy: &PollPolicy) -> Self {
        Self {
            command_id,
            target_id,
            status: CommandStatus::Pending,
            stdout: String::new(),
            stderr: String::new(),
            poll_interval: policy.initial,
            waited: Duration::ZERO,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Records a status report. Reports arriving after a terminal status are
    /// ignored.
    pub(crate) fn observe(&mut self, invocation: Invocation) {
        if self.is_finished() {
            return;
        }
        self.status = invocation.status;
        self.stdout = invocation.stdout;
        self.stderr = invocation.stderr;
    }

    pub(crate) fn back_off(&mut self, ceiling: Duration) {
        self.poll_interval = self.poll_interval.saturating_mul(2).min(ceiling);
    }

    fn cancelled(&mut self) -> ExecError {
        self.status = CommandStatus::Cancelled;
        ExecError::Cancelled {
            command_id: self.command_id.clone(),
            target_id: self.target_id.clone(),
        }
    }

    fn into_result(self) -> Result<CommandOutput, ExecError> {
        match self.status {
            CommandStatus::Success => Ok(CommandOutput {
                stdout: self.stdout,
                stderr: self.stderr,
            }),
            status => Err(ExecError::Remote {
                command_id: self.command_id,
                target_id: self.target_id,
                status,
                stderr: self.stderr,
            }),
        }
    }
}

/// Runs shell commands on instances and waits for them with exponential
/// backoff.
pub(crate) struct Executor<'a> {
    backend: &'a dyn SsmBackend,
    waiter: &'a dyn Waiter,
    policy: PollPolicy,
    out: &'a Output,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(
        backend: &'a dyn SsmBackend,
        waiter: &'a dyn Waiter,
        policy: PollPolicy,
        out: &'a Output,
    ) -> Self {
        Self {
            backend,
            waiter,
            policy,
            out,
        }
    }

    pub(crate) fn execute(
        &self,
        target_id: &str,
        command_text: &str,
    ) -> Result<CommandOutput, ExecError> {
        self.out.debug("Sending command to instance...");
        let command_id = self
            .backend
            .send_command(target_id, command_text)
            .map_err(|err| ExecError::Submission {
                target_id: target_id.to_string(),
                reason: format!("{err:#}"),
            })?;
        self.out.debug(&format!("Command ID: {command_id}"));

        let mut execution = CommandExecution::new(command_id, target_id.to_string(), &self.policy);
        self.wait_for(&mut execution)?;
        execution.into_result()
    }

    /// Polls until `execution` reaches a terminal status. Poll errors count as
    /// "not yet resolved".
    pub(crate) fn wait_for(&self, execution: &mut CommandExecution) -> Result<(), ExecError> {
        while !execution.is_finished() {
            if self.waiter.wait(execution.poll_interval) == WaitOutcome::Cancelled {
                return Err(execution.cancelled());
            }
            execution.waited = execution.waited.saturating_add(execution.poll_interval);

            match self
                .backend
                .get_invocation(&execution.command_id, &execution.target_id)
            {
                Ok(invocation) => {
                    execution.observe(invocation);
                    if execution.is_finished() {
                        break;
                    }
                    self.out
                        .debug(&format!("Command status: {}", execution.status));
                }
                Err(err) => {
                    self.out
                        .debug(&format!("Waiting for command to register... ({err:#})"));
                }
            }

            if execution.waited >= self.policy.max_wait {
                return Err(ExecError::WaitExceeded {
                    command_id: execution.command_id.clone(),
                    target_id: execution.target_id.clone(),
                    waited_secs: execution.waited.as_secs(),
                });
            }
            execution.back_off(self.policy.ceiling);
        }
        Ok(())
    }
}
