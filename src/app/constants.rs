pub(crate) const APP_DIR: &str = ".aws-ssm-connect";
pub(crate) const HISTORY_FILE: &str = "history.json";
pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const LOG_FILE: &str = "connect.log";
pub(crate) const HISTORY_DISABLED_ENV: &str = "AWS_SSM_CONNECT_HISTORY_DISABLED";

pub(crate) const LOG_TIMESTAMP_FORMAT: &str = "%m-%d %H:%M:%S";
pub(crate) const LOG_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const LOG_SEPARATOR: &str = " | ";

pub(crate) const LOG_RETENTION_DAYS: i64 = 7;
pub(crate) const LOG_MAX_ENTRIES: usize = 10_000;

pub(crate) const NO_INSTANCES_MESSAGE: &str = "No running SSM-managed instances found";
pub(crate) const NO_MATCHES_MESSAGE: &str = "No instances match the filters";
pub(crate) const SELECTION_CANCELLED_MESSAGE: &str = "Selection cancelled";
pub(crate) const RUN_USAGE: &str = "usage: aws-ssm-connect --run <instance> [--] <command...>";
pub(crate) const COPY_USAGE: &str =
    "usage: aws-ssm-connect --copy <src> <dst> (use instance:/path for remote)";
