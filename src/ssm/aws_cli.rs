use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::{Candidate, CommandStatus, Invocation, Settings};
use crate::ssm::SsmBackend;

const AWS_PROGRAM: &str = "aws";
const RUN_SHELL_DOCUMENT: &str = "AWS-RunShellScript";
const RUNNING_STATE: &str = "running";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceInformationList {
    #[serde(default)]
    instance_information_list: Vec<InstanceInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceInformation {
    instance_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    instance_id: Option<String>,
    private_ip_address: Option<String>,
    state: Option<InstanceState>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendCommandResponse {
    command: SentCommand,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SentCommand {
    command_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CommandInvocation {
    status: String,
    #[serde(default)]
    standard_output_content: Option<String>,
    #[serde(default)]
    standard_error_content: Option<String>,
}

impl Ec2Instance {
    fn name_tag(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key.as_deref() == Some("Name"))
            .and_then(|tag| tag.value.as_deref())
    }

    fn is_running(&self) -> bool {
        self.state
            .as_ref()
            .and_then(|state| state.name.as_deref())
            == Some(RUNNING_STATE)
    }
}

/// Keeps the SSM-managed ids whose EC2 instance is running, in SSM order.
fn merge_instances(managed_ids: &[String], details: &DescribeInstances) -> Vec<Candidate> {
    let by_id: HashMap<&str, &Ec2Instance> = details
        .reservations
        .iter()
        .flat_map(|reservation| reservation.instances.iter())
        .filter_map(|instance| instance.instance_id.as_deref().map(|id| (id, instance)))
        .collect();
    managed_ids
        .iter()
        .filter_map(|id| {
            let instance = by_id.get(id.as_str())?;
            if !instance.is_running() {
                return None;
            }
            Some(Candidate::new(
                id.clone(),
                instance.name_tag().unwrap_or_default(),
                instance.private_ip_address.clone().unwrap_or_default(),
            ))
        })
        .collect()
}

/// Talks to AWS through the `aws` command line tool, which owns credentials and
/// the session-manager plugin.
#[derive(Debug, Clone)]
pub(crate) struct AwsCliBackend {
    program: String,
    profile: Option<String>,
    region: Option<String>,
}

impl AwsCliBackend {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            program: AWS_PROGRAM.to_string(),
            profile: settings.profile.clone(),
            region: settings.region.clone(),
        }
    }

    fn command(&self, service: &str, operation: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(service).arg(operation);
        if let Some(profile) = &self.profile {
            command.arg("--profile").arg(profile);
        }
        if let Some(region) = &self.region {
            command.arg("--region").arg(region);
        }
        command
    }

    fn run_json<T: DeserializeOwned>(&self, mut command: Command, what: &str) -> Result<T> {
        command
            .arg("--output")
            .arg("json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let output = command
            .output()
            .with_context(|| format!("run {} (is the AWS CLI installed?)", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("failed to {what}: {}", stderr.trim());
        }
        serde_json::from_slice(&output.stdout).with_context(|| format!("parse {what} response"))
    }
}

impl SsmBackend for AwsCliBackend {
    fn list_instances(&self) -> Result<Vec<Candidate>> {
        let info: InstanceInformationList = self.run_json(
            self.command("ssm", "describe-instance-information"),
            "describe SSM instances",
        )?;
        let managed_ids: Vec<String> = info
            .instance_information_list
            .into_iter()
            .filter_map(|entry| entry.instance_id)
            .collect();
        if managed_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut describe = self.command("ec2", "describe-instances");
        describe
            .arg("--instance-ids")
            .args(&managed_ids)
            .arg("--filters")
            .arg(format!("Name=instance-state-name,Values={RUNNING_STATE}"));
        let details: DescribeInstances =
            self.run_json(describe, "describe EC2 instances")?;
        Ok(merge_instances(&managed_ids, &details))
    }

    fn send_command(&self, target_id: &str, script: &str) -> Result<String> {
        // Scripts can exceed the per-argument limit, so parameters go through a file.
        let mut parameters = tempfile::NamedTempFile::new().context("create parameters file")?;
        serde_json::to_writer(&mut parameters, &serde_json::json!({ "commands": [script] }))
            .context("write parameters file")?;
        parameters.flush().context("flush parameters file")?;

        let mut command = self.command("ssm", "send-command");
        command
            .arg("--instance-ids")
            .arg(target_id)
            .arg("--document-name")
            .arg(RUN_SHELL_DOCUMENT)
            .arg("--parameters")
            .arg(format!("file://{}", parameters.path().display()));
        let response: SendCommandResponse = self.run_json(command, "send command")?;
        Ok(response.command.command_id)
    }

    fn get_invocation(&self, command_id: &str, target_id: &str) -> Result<Invocation> {
        let mut command = self.command("ssm", "get-command-invocation");
        command
            .arg("--command-id")
            .arg(command_id)
            .arg("--instance-id")
            .arg(target_id);
        let invocation: CommandInvocation =
            self.run_json(command, "get command invocation")?;
        Ok(Invocation {
            status: CommandStatus::parse(&invocation.status),
            stdout: invocation.standard_output_content.unwrap_or_default(),
            stderr: invocation.standard_error_content.unwrap_or_default(),
        })
    }

    fn start_session(&self, target_id: &str) -> Result<()> {
        let mut command = self.command("ssm", "start-session");
        command.arg("--target").arg(target_id);
        let status = command
            .status()
            .with_context(|| format!("run {} (is the AWS CLI installed?)", self.program))?;
        if !status.success() {
            anyhow::bail!("session with {target_id} ended with {status}");
        }
        Ok(())
    }
}
