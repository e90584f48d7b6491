/// Container Run Sequence
///
/// **Responsibility:**
/// Drive one container through its lifecycle and return the raw result file.
///
/// **Sequence:**
/// 1. Start a detached container kept alive by `sleep`
/// 2. Copy the common-ancestor tree into it
/// 3. Execute the runner against the requested targets
/// 4. Read the result file back with `cat`
/// 5. Remove the container, always, exactly once
///
/// Only the image pull is retried. Exit codes of the steps are logged but not
/// checked; a step that cannot be launched aborts the sequence and falls
/// through to cleanup.
use crate::config::RunnerConfig;
use crate::console::{Color, Console};
use crate::docker::{CommandRunner, DockerCli};
use crate::paths;
use anyhow::{bail, Result};
use extra_sanity_common::config::{KEEP_ALIVE_COMMAND, PULL_ATTEMPTS, RUNNER_INTERPRETER};
use extra_sanity_common::names::RunNames;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Pull `image`, retrying up to `PULL_ATTEMPTS` times without delay
///
/// Returns an error once every attempt has failed; the caller treats that as fatal.
pub async fn pull_with_retry<R: CommandRunner>(
    docker: &DockerCli<'_, R>,
    image: &str,
    console: &Console,
) -> Result<()> {
    for attempt in 1..=PULL_ATTEMPTS {
        match docker.pull(image).await {
            Ok(Some(0)) => {
                info!(image = %image, attempt, "Image pulled");
                return Ok(());
            }
            Ok(code) => warn!(image = %image, attempt, exit_code = ?code, "Image pull failed"),
            Err(e) => warn!(image = %image, attempt, error = %e, "Image pull could not be started"),
        }
        console.print("WARNING: pulling docker image failed, retrying...", Color::Red);
    }

    console.print("FATAL ERROR while pulling docker image", Color::Red);
    bail!("failed to pull {} after {} attempts", image, PULL_ATTEMPTS)
}

/// Everything needed to run the sequence once
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub container: String,
    pub output_file: String,
    pub image: String,
    pub workdir: PathBuf,
    pub copy_root: PathBuf,
    pub runner_path: PathBuf,
    pub use_color: bool,
    pub targets: Vec<String>,
}

impl RunPlan {
    pub fn new(config: &RunnerConfig, names: RunNames, image: String) -> Self {
        Self {
            container: names.container,
            output_file: names.output_file,
            image,
            workdir: config.cwd.clone(),
            copy_root: config.copy_root(),
            runner_path: config.runner_path(),
            use_color: config.use_color,
            targets: config.targets.clone(),
        }
    }

    /// Command executed inside the container
    pub fn runner_command(&self) -> Vec<String> {
        let mut command = vec![
            RUNNER_INTERPRETER.to_string(),
            self.runner_path.display().to_string(),
            "--cleanup".to_string(),
            "--install-requirements".to_string(),
            "--output".to_string(),
            self.output_file.clone(),
        ];
        if self.use_color {
            command.push("--color".to_string());
        }
        command.extend(self.targets.iter().cloned());
        command
    }
}

/// Run the sequence and tear the container down
///
/// Returns the bytes of the result file, or `None` when a step failed before
/// the file could be read. Errors are reported on the console, never returned.
pub async fn run_in_container<R: CommandRunner>(
    docker: &DockerCli<'_, R>,
    plan: &RunPlan,
    console: &Console,
) -> Option<Vec<u8>> {
    debug!(
        container = %plan.container,
        output_file = %plan.output_file,
        copy_root = %plan.copy_root.display(),
        "Starting run"
    );

    let result = match execute_steps(docker, plan, console).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            console.print(format!("FATAL ERROR during execution: {:#}", e), Color::Emph);
            None
        }
    };

    match docker.remove_force(&plan.container).await {
        Ok(Some(0)) => debug!(container = %plan.container, "Container removed"),
        Ok(code) => warn!(container = %plan.container, exit_code = ?code, "Container removal reported failure"),
        Err(e) => console.print(removal_warning(&e), Color::Emph),
    }

    result
}

async fn execute_steps<R: CommandRunner>(
    docker: &DockerCli<'_, R>,
    plan: &RunPlan,
    console: &Console,
) -> Result<Vec<u8>> {
    docker
        .run_detached(&plan.container, &plan.workdir, &plan.image, &KEEP_ALIVE_COMMAND)
        .await?;

    docker
        .copy_into(&plan.container, &plan.copy_root, &paths::copy_destination(&plan.copy_root))
        .await?;

    docker.exec(&plan.container, &plan.runner_command()).await?;

    let cat = vec!["cat".to_string(), plan.output_file.clone()];
    let output = docker.exec_capture(&plan.container, &cat).await?;
    if let Some(warning) = capture_warning(&output.stderr) {
        console.print(warning, Color::Emph);
    }

    Ok(output.stdout)
}

/// Warning for stderr produced while reading the result file back
pub fn capture_warning(stderr: &[u8]) -> Option<String> {
    if stderr.is_empty() {
        return None;
    }
    Some(format!("WARNING: {}", String::from_utf8_lossy(stderr).trim()))
}

/// Warning for a container that could not be removed
pub fn removal_warning(error: &anyhow::Error) -> String {
    format!("WARNING: error while removing docker container: {:#}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_capture_warning_trims_stderr() {
        assert_eq!(
            capture_warning(b"cat: output-1.json: No such file or directory\n"),
            Some("WARNING: cat: output-1.json: No such file or directory".to_string())
        );
    }

    #[test]
    fn test_capture_warning_skips_empty_stderr() {
        assert_eq!(capture_warning(b""), None);
    }

    #[test]
    fn test_removal_warning_keeps_error_chain() {
        let error = anyhow!("No such file or directory (os error 2)").context("Failed to execute `docker`");
        assert_eq!(
            removal_warning(&error),
            "WARNING: error while removing docker container: Failed to execute `docker`: No such file or directory (os error 2)"
        );
    }
}
