/// Run Executor - High-Level Orchestration
///
/// Glue between image resolution, the container run sequence and the
/// evaluator. Knows nothing about how commands are spawned (the runner's job)
/// or how results are scored (the evaluator's job).
use crate::config::RunnerConfig;
use crate::console::Console;
use crate::docker::{CommandRunner, DockerCli};
use crate::engine::{self, RunPlan};
use crate::evaluator;
use crate::image;
use extra_sanity_common::config::EXIT_FAILURE;
use extra_sanity_common::names::RunNames;
use std::time::Instant;
use tracing::{error, info};

/// Execute one full run and return the process exit code
pub async fn execute<R: CommandRunner>(config: &RunnerConfig, runner: &R) -> i32 {
    let start = Instant::now();
    let console = Console::new(config.use_color);
    let names = RunNames::generate();

    info!(
        container = %names.container,
        output_file = %names.output_file,
        targets = config.targets.len(),
        "Starting sanity run"
    );

    let image = image::resolve_image(runner, config.image_override.as_deref(), &console).await;
    let docker = DockerCli::new(runner, config.container_cli.as_str(), console);

    if config.pull {
        if let Err(e) = engine::pull_with_retry(&docker, &image, &console).await {
            error!(error = %e, "Giving up on image pull");
            return EXIT_FAILURE;
        }
    }

    let plan = RunPlan::new(config, names, image);
    let output = engine::run_in_container(&docker, &plan, &console).await;
    let code = evaluator::interpret(output.as_deref(), &console);

    info!(exit_code = code, elapsed_ms = start.elapsed().as_millis() as u64, "Sanity run finished");
    code
}
