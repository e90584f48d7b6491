/// Run sequence tests
///
/// These drive the whole pipeline through a scripted `CommandRunner` that
/// records every command line, so no Docker daemon is required:
/// 1. Command order and argument shapes
/// 2. Pull retry behaviour
/// 3. Cleanup on success and on failure
/// 4. Exit codes for each result outcome

#[cfg(test)]
mod run_sequence_tests {
    use crate::config::RunnerConfig;
    use crate::console::Console;
    use crate::docker::{CommandOutput, CommandRunner, DockerCli};
    use crate::engine::pull_with_retry;
    use crate::executor::execute;
    use anyhow::{bail, Result};
    use extra_sanity_common::config::DEFAULT_IMAGE;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    /// Fake runner answering each command according to a script
    struct ScriptedRunner {
        calls: RefCell<Vec<Vec<String>>>,
        helper_image: Option<String>,
        pull_failures: Cell<usize>,
        unlaunchable: Option<&'static str>,
        cat_output: CommandOutput,
    }

    impl ScriptedRunner {
        fn new(result_json: &str) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                helper_image: Some("quay.io/ansible/default-test-container:3.1.0".to_string()),
                pull_failures: Cell::new(0),
                unlaunchable: None,
                cat_output: CommandOutput {
                    code: Some(0),
                    stdout: result_json.as_bytes().to_vec(),
                    stderr: Vec::new(),
                },
            }
        }

        fn failing_pulls(self, count: usize) -> Self {
            self.pull_failures.set(count);
            self
        }

        fn unlaunchable(mut self, subcommand: &'static str) -> Self {
            self.unlaunchable = Some(subcommand);
            self
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }

        /// Docker subcommands in invocation order
        fn docker_steps(&self) -> Vec<String> {
            self.calls()
                .iter()
                .filter(|argv| argv[0] == "docker")
                .map(|argv| argv[1].clone())
                .collect()
        }

        fn count(&self, subcommand: &str) -> usize {
            self.docker_steps().iter().filter(|s| *s == subcommand).count()
        }

        fn find(&self, subcommand: &str) -> Vec<String> {
            self.calls()
                .into_iter()
                .find(|argv| argv[0] == "docker" && argv[1] == subcommand)
                .expect("command was not invoked")
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn status(&self, argv: &[String]) -> Result<Option<i32>> {
            self.calls.borrow_mut().push(argv.to_vec());
            let subcommand = argv[1].as_str();

            if self.unlaunchable == Some(subcommand) {
                bail!("Failed to execute `docker`: No such file or directory (os error 2)");
            }
            if subcommand == "pull" && self.pull_failures.get() > 0 {
                self.pull_failures.set(self.pull_failures.get() - 1);
                return Ok(Some(1));
            }
            Ok(Some(0))
        }

        async fn output(&self, argv: &[String]) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(argv.to_vec());

            if argv[0] == "python3" {
                return match &self.helper_image {
                    Some(image) => Ok(CommandOutput {
                        code: Some(0),
                        stdout: format!("{}\n", image).into_bytes(),
                        stderr: Vec::new(),
                    }),
                    None => bail!("No such file or directory (os error 2)"),
                };
            }
            if self.unlaunchable == Some("cat") {
                bail!("Failed to execute `docker`: connection reset");
            }
            Ok(self.cat_output.clone())
        }
    }

    fn config() -> RunnerConfig {
        RunnerConfig {
            use_color: false,
            pull: true,
            cwd: PathBuf::from("/src/ansible_collections/community/general"),
            tools_dir: PathBuf::from("/src/ansible_collections/community/internal_test_tools/tools"),
            targets: vec!["tests/unit".to_string(), "plugins/modules/foo.py".to_string()],
            container_cli: "docker".to_string(),
            image_override: None,
        }
    }

    const PASSING: &str = r#"{"t1": {"success": true}}"#;

    #[tokio::test]
    async fn test_full_run_command_sequence() {
        let runner = ScriptedRunner::new(PASSING);

        let code = execute(&config(), &runner).await;
        assert_eq!(code, 0);

        let calls = runner.calls();
        assert_eq!(calls[0][0], "python3");
        assert_eq!(runner.docker_steps(), vec!["pull", "run", "cp", "exec", "exec", "rm"]);

        let image = "quay.io/ansible/default-test-container:3.1.0";
        assert_eq!(runner.find("pull"), vec!["docker", "pull", image]);

        let run = runner.find("run");
        let container = run[6].clone();
        assert!(container.starts_with("ansible-test-"));
        assert_eq!(
            run,
            vec![
                "docker",
                "run",
                "--detach",
                "--workdir",
                "/src/ansible_collections/community/general",
                "--name",
                container.as_str(),
                image,
                "/bin/sh",
                "-c",
                "sleep 50m",
            ]
        );

        assert_eq!(
            runner.find("cp"),
            vec![
                "docker".to_string(),
                "cp".to_string(),
                "/src/ansible_collections/community".to_string(),
                format!("{}:/src/ansible_collections", container),
            ]
        );

        let runner_exec = &calls[4];
        assert_eq!(&runner_exec[..3], &["docker", "exec", container.as_str()]);
        assert_eq!(runner_exec[3], "python3.7");
        assert_eq!(runner_exec[4], "../internal_test_tools/tools/runner.py");
        assert_eq!(&runner_exec[5..8], &["--cleanup", "--install-requirements", "--output"]);
        let output_file = runner_exec[8].clone();
        assert!(output_file.starts_with("output-") && output_file.ends_with(".json"));
        assert_eq!(&runner_exec[9..], &["tests/unit", "plugins/modules/foo.py"]);
        assert!(!runner_exec.contains(&"--color".to_string()));

        assert_eq!(calls[5], vec!["docker", "exec", container.as_str(), "cat", output_file.as_str()]);
        assert_eq!(calls[6], vec!["docker", "rm", "-f", container.as_str()]);
    }

    #[tokio::test]
    async fn test_color_is_forwarded_to_runner() {
        let runner = ScriptedRunner::new(PASSING);
        let mut config = config();
        config.use_color = true;

        execute(&config, &runner).await;

        let runner_exec = &runner.calls()[4];
        assert_eq!(runner_exec[9], "--color");
        assert_eq!(&runner_exec[10..], &["tests/unit", "plugins/modules/foo.py"]);
    }

    #[tokio::test]
    async fn test_pull_succeeds_on_third_attempt() {
        let runner = ScriptedRunner::new(PASSING).failing_pulls(2);

        let code = execute(&config(), &runner).await;

        assert_eq!(code, 0);
        assert_eq!(runner.count("pull"), 3);
        assert_eq!(runner.count("run"), 1);
    }

    #[tokio::test]
    async fn test_pull_exhausted_stops_run() {
        let runner = ScriptedRunner::new(PASSING).failing_pulls(3);

        let code = execute(&config(), &runner).await;

        assert_eq!(code, -1);
        assert_eq!(runner.docker_steps(), vec!["pull", "pull", "pull"]);
    }

    #[tokio::test]
    async fn test_pull_with_retry_direct() {
        let console = Console::new(false);

        let runner = ScriptedRunner::new(PASSING).failing_pulls(2);
        let docker = DockerCli::new(&runner, "docker", console);
        assert!(pull_with_retry(&docker, "img:1", &console).await.is_ok());
        assert_eq!(runner.count("pull"), 3);

        let runner = ScriptedRunner::new(PASSING).failing_pulls(5);
        let docker = DockerCli::new(&runner, "docker", console);
        assert!(pull_with_retry(&docker, "img:1", &console).await.is_err());
        assert_eq!(runner.count("pull"), 3);
    }

    #[tokio::test]
    async fn test_unlaunchable_pull_counts_as_failed_attempt() {
        let runner = ScriptedRunner::new(PASSING).unlaunchable("pull");

        let code = execute(&config(), &runner).await;

        assert_eq!(code, -1);
        assert_eq!(runner.count("pull"), 3);
        assert_eq!(runner.count("run"), 0);
    }

    #[tokio::test]
    async fn test_no_pull_skips_pull() {
        let runner = ScriptedRunner::new(PASSING);
        let mut config = config();
        config.pull = false;

        let code = execute(&config, &runner).await;

        assert_eq!(code, 0);
        assert_eq!(runner.docker_steps(), vec!["run", "cp", "exec", "exec", "rm"]);
    }

    #[tokio::test]
    async fn test_failed_step_still_removes_container_once() {
        let runner = ScriptedRunner::new(PASSING).unlaunchable("cp");

        let code = execute(&config(), &runner).await;

        assert_eq!(code, -1);
        assert_eq!(runner.docker_steps(), vec!["pull", "run", "cp", "rm"]);
        assert_eq!(runner.count("rm"), 1);
    }

    #[tokio::test]
    async fn test_failed_capture_still_removes_container_once() {
        let runner = ScriptedRunner::new(PASSING).unlaunchable("cat");

        let code = execute(&config(), &runner).await;

        assert_eq!(code, -1);
        assert_eq!(runner.count("rm"), 1);
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_change_exit_code() {
        let runner = ScriptedRunner::new(PASSING).unlaunchable("rm");

        let code = execute(&config(), &runner).await;

        assert_eq!(code, 0);
        assert_eq!(runner.count("rm"), 1);
    }

    #[tokio::test]
    async fn test_failing_tests_exit_nonzero() {
        let runner = ScriptedRunner::new(
            r#"{"t1": {"success": true}, "t2": {"success": false, "errors": ["e1", "e2"]}, "t3": {"skipped": true}}"#,
        );

        assert_eq!(execute(&config(), &runner).await, -1);
        assert_eq!(runner.count("rm"), 1);
    }

    #[tokio::test]
    async fn test_invalid_result_exit_nonzero() {
        let runner = ScriptedRunner::new("Traceback (most recent call last):");

        assert_eq!(execute(&config(), &runner).await, -1);
        assert_eq!(runner.count("rm"), 1);
    }

    #[tokio::test]
    async fn test_stderr_from_capture_is_not_fatal() {
        let mut runner = ScriptedRunner::new(PASSING);
        runner.cat_output.stderr = b"cat: warning\n".to_vec();

        assert_eq!(execute(&config(), &runner).await, 0);
    }

    #[tokio::test]
    async fn test_missing_helper_uses_fallback_image() {
        let mut runner = ScriptedRunner::new(PASSING);
        runner.helper_image = None;

        assert_eq!(execute(&config(), &runner).await, 0);
        assert_eq!(runner.find("pull"), vec!["docker", "pull", DEFAULT_IMAGE]);
    }

    #[tokio::test]
    async fn test_image_override_and_alternate_cli() {
        let runner = ScriptedRunner::new(PASSING);
        let mut config = config();
        config.image_override = Some("localhost/sanity:dev".to_string());
        config.container_cli = "podman".to_string();

        assert_eq!(execute(&config, &runner).await, 0);

        let calls = runner.calls();
        assert!(calls.iter().all(|argv| argv[0] == "podman"));
        assert_eq!(calls[0], vec!["podman", "pull", "localhost/sanity:dev"]);
    }
}
