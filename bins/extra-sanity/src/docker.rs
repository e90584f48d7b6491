// Container CLI wrapper
//
// Every container operation is a single blocking invocation of the Docker CLI.
// Process spawning sits behind `CommandRunner` so the run sequence can be
// exercised without a daemon.

use crate::console::Console;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Exit code and captured streams of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Launches external commands. `argv[0]` is the program.
pub trait CommandRunner {
    /// Run with inherited stdio and wait for the exit code
    async fn status(&self, argv: &[String]) -> Result<Option<i32>>;

    /// Run with stdout and stderr captured
    async fn output(&self, argv: &[String]) -> Result<CommandOutput>;
}

/// Runs commands on the host
pub struct SystemRunner;

impl SystemRunner {
    fn command(argv: &[String]) -> Result<Command> {
        let Some((program, args)) = argv.split_first() else {
            bail!("empty command line");
        };
        let mut command = Command::new(program);
        command.args(args);
        Ok(command)
    }
}

impl CommandRunner for SystemRunner {
    async fn status(&self, argv: &[String]) -> Result<Option<i32>> {
        let status = Self::command(argv)?
            .stdin(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to execute `{}`", argv[0]))?;
        Ok(status.code())
    }

    async fn output(&self, argv: &[String]) -> Result<CommandOutput> {
        let output = Self::command(argv)?
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to execute `{}`", argv[0]))?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Docker CLI bound to a runner. Every invocation is echoed to the console first.
pub struct DockerCli<'a, R> {
    runner: &'a R,
    binary: String,
    console: Console,
}

impl<'a, R: CommandRunner> DockerCli<'a, R> {
    pub fn new(runner: &'a R, binary: impl Into<String>, console: Console) -> Self {
        Self {
            runner,
            binary: binary.into(),
            console,
        }
    }

    fn argv<I, S>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        std::iter::once(self.binary.clone())
            .chain(args.into_iter().map(Into::into))
            .collect()
    }

    async fn invoke(&self, argv: Vec<String>) -> Result<Option<i32>> {
        self.console.command(&argv);
        let code = self.runner.status(&argv).await?;
        debug!(command = %argv[1], exit_code = ?code, "Command finished");
        Ok(code)
    }

    /// `docker pull <image>`
    pub async fn pull(&self, image: &str) -> Result<Option<i32>> {
        self.invoke(self.argv(["pull", image])).await
    }

    /// `docker run --detach` with an entrypoint that keeps the container alive
    pub async fn run_detached(
        &self,
        container: &str,
        workdir: &Path,
        image: &str,
        keep_alive: &[&str],
    ) -> Result<Option<i32>> {
        let mut args = vec![
            "run".to_string(),
            "--detach".to_string(),
            "--workdir".to_string(),
            workdir.display().to_string(),
            "--name".to_string(),
            container.to_string(),
            image.to_string(),
        ];
        args.extend(keep_alive.iter().map(|s| s.to_string()));
        self.invoke(self.argv(args)).await
    }

    /// `docker cp <source> <container>:<destination>`
    pub async fn copy_into(&self, container: &str, source: &Path, destination: &Path) -> Result<Option<i32>> {
        let target = format!("{}:{}", container, destination.display());
        self.invoke(self.argv(["cp".to_string(), source.display().to_string(), target]))
            .await
    }

    /// `docker exec <container> <command...>` with output streamed to the terminal
    pub async fn exec(&self, container: &str, command: &[String]) -> Result<Option<i32>> {
        let args = ["exec", container]
            .into_iter()
            .map(str::to_string)
            .chain(command.iter().cloned());
        self.invoke(self.argv(args)).await
    }

    /// `docker exec <container> <command...>` with stdout and stderr captured
    pub async fn exec_capture(&self, container: &str, command: &[String]) -> Result<CommandOutput> {
        let argv = self.argv(
            ["exec", container]
                .into_iter()
                .map(str::to_string)
                .chain(command.iter().cloned()),
        );
        self.console.command(&argv);
        let output = self.runner.output(&argv).await?;
        debug!(
            exit_code = ?output.code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Captured command output"
        );
        Ok(output)
    }

    /// `docker rm -f <container>`
    pub async fn remove_force(&self, container: &str) -> Result<Option<i32>> {
        self.invoke(self.argv(["rm", "-f", container])).await
    }
}
