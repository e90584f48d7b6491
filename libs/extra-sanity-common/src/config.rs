// Fixed defaults shared by the runner

/// Image used when the ansible-test lookup does not produce one
pub const DEFAULT_IMAGE: &str = "quay.io/ansible/default-test-container:1.14";

/// Container CLI invoked when `EXTRA_SANITY_DOCKER` is not set
pub const DEFAULT_CONTAINER_CLI: &str = "docker";

/// Number of `docker pull` attempts before giving up
pub const PULL_ATTEMPTS: usize = 3;

/// Entrypoint that keeps the detached container alive for `docker exec`
pub const KEEP_ALIVE_COMMAND: [&str; 3] = ["/bin/sh", "-c", "sleep 50m"];

/// Interpreter available inside the test image
pub const RUNNER_INTERPRETER: &str = "python3.7";

/// Script name of the in-container runner, relative to the tools directory
pub const RUNNER_SCRIPT: &str = "runner.py";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = -1;
