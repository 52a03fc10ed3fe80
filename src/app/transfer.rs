use std::path::Path;

use anyhow::Result;

use crate::app::App;
use crate::app::constants::{COPY_USAGE, RUN_USAGE};
use crate::app::helpers::{Location, format_bytes, parse_location};
use crate::model::CommandOutput;
use crate::ssm::exec::Executor;
use crate::ssm::transfer::{download, upload};
use crate::ssm::wait::{CancelWaiter, Waiter};

impl App {
    fn executor<'a>(&'a self, waiter: &'a dyn Waiter) -> Executor<'a> {
        Executor::new(self.backend.as_ref(), waiter, self.settings.poll, &self.out)
    }

    /// `--run <instance> <command...>`: prints remote stdout, and stderr to stderr.
    pub(crate) fn run_command(&self, args: &[String]) -> Result<()> {
        let waiter = CancelWaiter::on_interrupt()?;
        let output = self.run_command_with(&waiter, args)?;
        print!("{}", output.stdout);
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
        Ok(())
    }

    pub(crate) fn run_command_with(
        &self,
        waiter: &dyn Waiter,
        args: &[String],
    ) -> Result<CommandOutput> {
        let [instance, command @ ..] = args else {
            anyhow::bail!(RUN_USAGE);
        };
        if command.is_empty() {
            anyhow::bail!(RUN_USAGE);
        }
        let target_id = self.resolve_instance(instance)?;
        let command_text = command.join(" ");
        self.out
            .log_line(&format!("Running on {target_id}: {command_text}"));
        Ok(self.executor(waiter).execute(&target_id, &command_text)?)
    }

    /// `--copy <src> <dst>` where exactly one side is `instance:/path`.
    pub(crate) fn copy(&self, args: &[String]) -> Result<()> {
        let waiter = CancelWaiter::on_interrupt()?;
        self.copy_with(&waiter, args)
    }

    pub(crate) fn copy_with(&self, waiter: &dyn Waiter, args: &[String]) -> Result<()> {
        let [source, destination] = args else {
            anyhow::bail!(COPY_USAGE);
        };
        match (parse_location(source), parse_location(destination)) {
            (Location::Remote { .. }, Location::Remote { .. }) => {
                anyhow::bail!("cannot copy between two remote instances")
            }
            (Location::Local(_), Location::Local(_)) => {
                anyhow::bail!("one of src or dst must be remote (instance:/path)")
            }
            (Location::Local(local), Location::Remote { instance, path }) => {
                let target_id = self.resolve_instance(instance)?;
                self.out
                    .info(&format!("Uploading {local} to {target_id}:{path}"));
                let sent = upload(&self.executor(waiter), Path::new(local), &target_id, path)?;
                self.out
                    .success(&format!("Upload complete ({})", format_bytes(sent)));
            }
            (Location::Remote { instance, path }, Location::Local(local)) => {
                let target_id = self.resolve_instance(instance)?;
                self.out
                    .info(&format!("Downloading {target_id}:{path} to {local}"));
                let written =
                    download(&self.executor(waiter), &target_id, path, Path::new(local))?;
                self.out
                    .success(&format!("Download complete ({})", format_bytes(written)));
            }
        }
        Ok(())
    }
}
