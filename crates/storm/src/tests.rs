//! End-to-end tests of the `storm` runtime over temporary projects.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use storm_config::Config;
use tempfile::TempDir;

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::run_with_loader;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn loader(&self) -> StaticConfigLoader {
        StaticConfigLoader {
            config: Config {
                commands_dir: self.root.join("src/commands"),
                artifacts_dir: self.root.join(".storm/cli"),
                cache_dir: self.root.join(".storm/cache"),
                name: "acme".to_owned(),
                log_filter: "warn".to_owned(),
                ..Config::default()
            },
        }
    }

    fn write_command(&self, relative: &str, contents: &str) {
        let path = self.root.join("src/commands").join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create command dir");
        }
        fs::write(path, contents).expect("write command");
    }

    fn artifact(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(".storm/cli").join(relative)
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let argv = std::iter::once("storm")
            .chain(args.iter().copied())
            .map(OsString::from);
        let exit = run_with_loader(argv, &mut stdout, &mut stderr, &self.loader());
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("utf8 stdout"),
            stderr: String::from_utf8(stderr).expect("utf8 stderr"),
        }
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

#[fixture]
fn project() -> Project {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8Path::from_path(dir.path())
        .expect("utf8 temp dir")
        .to_owned();
    Project { _dir: dir, root }
}

#[fixture]
fn deploy_project(project: Project) -> Project {
    project.write_command(
        "deploy.ts",
        "/** Deploy the application. */\n\
         export default function deploy(request: { target: string; force?: boolean }): void {}\n",
    );
    project.write_command(
        "deploy/status.ts",
        "export default function status(request: {}): void {}\n",
    );
    project
}

#[rstest]
fn prepare_writes_the_application(deploy_project: Project) {
    let outcome = deploy_project.run(&["prepare"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.contains("Prepared 2 commands"), "{}", outcome.stdout);
    assert!(outcome.stdout.contains("fresh reflection"));
    assert!(deploy_project.artifact("bin.ts").exists());
    assert!(deploy_project.artifact("deploy/usage.ts").exists());
    assert!(deploy_project.artifact("deploy/status/index.ts").exists());
}

#[rstest]
fn second_prepare_reuses_the_cache(deploy_project: Project) {
    let first = deploy_project.run(&["prepare"]);
    assert_eq!(first.exit, ExitCode::SUCCESS, "{}", first.stderr);

    let second = deploy_project.run(&["prepare"]);
    let forced = deploy_project.run(&["prepare", "--force"]);

    assert!(second.stdout.contains("reflection cache"), "{}", second.stdout);
    assert!(forced.stdout.contains("fresh reflection"), "{}", forced.stdout);
}

#[rstest]
fn tree_prints_an_indented_outline(deploy_project: Project) {
    let outcome = deploy_project.run(&["tree"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.starts_with("acme "), "{}", outcome.stdout);
    assert!(outcome.stdout.contains("\n  deploy  Deploy the application."), "{}", outcome.stdout);
    assert!(outcome.stdout.contains("\n    status"), "{}", outcome.stdout);
    assert!(!deploy_project.artifact("bin.ts").exists());
}

#[rstest]
fn clean_removes_generated_state(deploy_project: Project) {
    deploy_project.run(&["prepare"]);

    let cleaned = deploy_project.run(&["clean"]);
    let again = deploy_project.run(&["clean"]);

    assert_eq!(cleaned.exit, ExitCode::SUCCESS);
    assert!(cleaned.stdout.contains("Removed generated sources"), "{}", cleaned.stdout);
    assert!(!deploy_project.artifact("bin.ts").exists());
    assert_eq!(again.stdout, "Nothing to clean\n");
}

#[rstest]
fn invalid_handlers_fail_with_the_path(project: Project) {
    project.write_command("deploy.ts", "export default function deploy(target: string) {}\n");

    let outcome = project.run(&["prepare"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("must be of type objectLiteral or class"),
        "{}",
        outcome.stderr
    );
    assert!(outcome.stderr.contains("deploy.ts"));
}

#[rstest]
#[case(&[])]
#[case(&["publish"])]
fn unknown_or_missing_commands_fail(project: Project, #[case] args: &[&str]) {
    let outcome = project.run(args);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(!outcome.stderr.is_empty());
}

#[rstest]
fn help_goes_to_stdout(project: Project) {
    let outcome = project.run(&["--help"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("prepare"), "{}", outcome.stdout);
    assert!(outcome.stderr.is_empty());
}
