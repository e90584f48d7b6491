// Default image resolution via ansible-test
use crate::console::{Color, Console};
use crate::docker::CommandRunner;
use anyhow::{bail, Context, Result};
use extra_sanity_common::config::DEFAULT_IMAGE;
use tracing::{debug, info};

const HELPER_INTERPRETER: &str = "python3";

/// Asks the host's ansible-test for its qualified "default" image
const HELPER_SCRIPT: &str = r#"
try:
    from ansible_test._internal.util_common import docker_qualify_image
except ImportError:
    from ansible_test._internal.util import docker_qualify_image
print(docker_qualify_image('default') or '')
"#;

const WARNING_PREFIX: &str = "WARNING: cannot load default docker container version from ansible-test";

/// Pick the image to run: explicit override, then ansible-test's default,
/// then the hardcoded fallback. Lookup failures only produce a warning.
pub async fn resolve_image<R: CommandRunner>(
    runner: &R,
    image_override: Option<&str>,
    console: &Console,
) -> String {
    if let Some(image) = image_override {
        info!(image = %image, "Using configured image");
        return image.to_string();
    }

    match query_default_image(runner).await {
        Ok(Some(image)) => {
            info!(image = %image, "Resolved default image from ansible-test");
            image
        }
        Ok(None) => {
            console.print(format!("{}: default image not known", WARNING_PREFIX), Color::Red);
            DEFAULT_IMAGE.to_string()
        }
        Err(e) => {
            console.print(format!("{}: {:#}", WARNING_PREFIX, e), Color::Red);
            DEFAULT_IMAGE.to_string()
        }
    }
}

async fn query_default_image<R: CommandRunner>(runner: &R) -> Result<Option<String>> {
    let argv = vec![
        HELPER_INTERPRETER.to_string(),
        "-c".to_string(),
        HELPER_SCRIPT.to_string(),
    ];
    let output = runner
        .output(&argv)
        .await
        .context("ansible-test lookup could not be started")?;

    if !output.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(exit_code = ?output.code, stderr = %stderr.trim(), "ansible-test lookup failed");
        // Last line carries the exception, e.g. "ModuleNotFoundError: ..."
        match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
            Some(line) => bail!("{}", line.trim()),
            None => bail!("lookup exited with code {:?}", output.code),
        }
    }

    let image = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!image.is_empty()).then_some(image))
}
