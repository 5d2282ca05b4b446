//! Gerrit API over the SSH command interface.

use tracing::debug;

use super::api::{bind_gsql, Api, ApiResult, GsqlValue};
use crate::config::GerritSection;
use crate::execution::{make_safe_string, Command, CommandExecutor, ProcessRunner, ShellRunner};
use crate::Result;

/// Talks to Gerrit by running `ssh -x -p <port> -- [user@]<host> gerrit ...`.
///
/// The remote command is escaped for the remote shell with
/// [`make_safe_string`], and the whole thing is then passed as one quoted
/// argument to the local `ssh` command.
#[derive(Debug, Clone)]
pub struct SshApi<R: ProcessRunner = ShellRunner> {
    host: String,
    port: u16,
    user: Option<String>,
    executor: CommandExecutor<R>,
}

impl SshApi<ShellRunner> {
    /// Create an API client from the `gerrit` config section.
    pub fn from_config(section: &GerritSection) -> Self {
        Self::with_executor(section, CommandExecutor::default())
    }
}

impl<R: ProcessRunner> SshApi<R> {
    /// Create an API client that runs ssh through `executor`.
    pub fn with_executor(section: &GerritSection, executor: CommandExecutor<R>) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
            user: section.user.clone(),
            executor,
        }
    }

    /// `user@host`, or just the host.
    fn target(&self) -> String {
        match self.user {
            Some(ref user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// Build the local ssh command for a remote command already escaped
    /// for the remote shell.
    ///
    /// Options end at `--`, so a host or user starting with `-` is never
    /// parsed as an ssh option.
    pub fn ssh_command(&self, remote: &str) -> Result<Command> {
        let port = self.port.to_string();
        let target = self.target();
        Command::new("ssh -x -p %s -- %s %s", &[port.as_str(), target.as_str(), remote])
    }

    fn execute(&self, remote: &str) -> Result<ApiResult> {
        let command = self.ssh_command(remote)?;
        debug!(host = %self.host, remote = %remote, "Running gerrit command");
        let lines = self.executor.run_lines(&command)?;
        ApiResult::from_json_lines(&lines)
    }
}

impl<R: ProcessRunner> Api for SshApi<R> {
    fn query(&self, template: &str, args: &[String]) -> Result<ApiResult> {
        let remote = make_safe_string(&format!("gerrit query --format=JSON {template}"), args)?;
        self.execute(&remote)
    }

    fn gsql(&self, sql: &str, params: &[GsqlValue]) -> Result<ApiResult> {
        let statement = bind_gsql(sql, params)?;
        let remote = make_safe_string("gerrit gsql --format JSON -c %s", &[statement])?;
        self.execute(&remote)
    }

    fn review(
        &self,
        change_and_patch_set: &str,
        score: Option<i32>,
        message: &str,
        extra: &[&str],
    ) -> Result<ApiResult> {
        let mut template = String::from("gerrit review %s");
        let mut args = vec![change_and_patch_set.to_string()];

        if let Some(score) = score {
            template.push_str(" --code-review %s");
            args.push(score.to_string());
        }

        template.push_str(" --message %s");
        args.push(message.to_string());

        for option in extra {
            template.push_str(" %s");
            args.push(option.to_string());
        }

        let remote = make_safe_string(&template, &args)?;
        self.execute(&remote)
    }
}
