// Runner configuration: command-line flags plus a few environment overrides
use crate::paths;
use anyhow::{bail, Context, Result};
use clap::Parser;
use extra_sanity_common::config::{DEFAULT_CONTAINER_CLI, RUNNER_SCRIPT};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "extra-sanity")]
#[command(about = "Extra sanity test runner", long_about = None)]
pub struct Cli {
    /// Use ANSI colors
    #[arg(long)]
    pub color: bool,

    /// Do not try to pull the docker image
    #[arg(long)]
    pub docker_no_pull: bool,

    /// Directory containing runner.py (defaults to the executable's directory; must hold runner.py)
    #[arg(long, env = "EXTRA_SANITY_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Targets
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

/// Settings for a single run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub use_color: bool,
    pub pull: bool,
    /// Absolute working directory, also the container's workdir
    pub cwd: PathBuf,
    /// Absolute directory holding the in-container runner
    pub tools_dir: PathBuf,
    pub targets: Vec<String>,
    pub container_cli: String,
    pub image_override: Option<String>,
}

impl RunnerConfig {
    /// Build from parsed flags and the process environment
    pub fn from_env(cli: Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current working directory")?;
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        let config = Self::resolve(
            cli,
            &cwd,
            exe_dir.as_deref(),
            std::io::stdout().is_terminal(),
            |key| std::env::var(key).ok(),
        );
        config.ensure_runner_script()?;
        Ok(config)
    }

    /// Combine flags, detected terminal state and an environment lookup
    pub fn resolve(
        cli: Cli,
        cwd: &Path,
        exe_dir: Option<&Path>,
        stdout_is_tty: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let cwd = paths::normalize(cwd);
        let tools_dir = cli
            .tools_dir
            .as_deref()
            .or(exe_dir)
            .unwrap_or_else(|| Path::new("."));
        let tools_dir = paths::absolutize(tools_dir, &cwd);

        let container_cli = env("EXTRA_SANITY_DOCKER")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTAINER_CLI.to_string());
        let image_override = env("EXTRA_SANITY_IMAGE").filter(|value| !value.trim().is_empty());

        Self {
            use_color: cli.color || stdout_is_tty,
            pull: !cli.docker_no_pull,
            cwd,
            tools_dir,
            targets: cli.targets,
            container_cli,
            image_override,
        }
    }

    /// Subtree copied into the container so relative paths match the host
    pub fn copy_root(&self) -> PathBuf {
        paths::common_ancestor(&self.cwd, &self.tools_dir)
    }

    /// Absolute path of the runner script on the host
    pub fn runner_script(&self) -> PathBuf {
        self.tools_dir.join(RUNNER_SCRIPT)
    }

    /// Runner script path as seen from the working directory
    pub fn runner_path(&self) -> PathBuf {
        paths::relative_to(&self.runner_script(), &self.cwd)
    }

    /// Fail unless the tools directory actually holds the runner
    pub fn ensure_runner_script(&self) -> Result<()> {
        let script = self.runner_script();
        if !script.is_file() {
            bail!(
                "{} not found in {}; pass --tools-dir or set EXTRA_SANITY_TOOLS_DIR",
                RUNNER_SCRIPT,
                self.tools_dir.display()
            );
        }
        Ok(())
    }
}
