// tests/config_resolution.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use war::config::{
    absolutize, load_and_validate, parse_str, resolve_policy, resolve_root, CliOverrides,
    ConfigFile, RunSpec, DEFAULT_CANCEL_LAST, DEFAULT_DELAY, DEFAULT_TERM_TIMEOUT,
};
use war::errors::WarError;
use war::fs::mock::MockFileSystem;
use war::types::Verbosity;
use war::watch::IgnoreMatcher;

type TestResult = Result<(), Box<dyn Error>>;

const CWD: &str = "/home/dev/project";

fn no_env(_: &str) -> Option<String> {
    None
}

fn cwd() -> PathBuf {
    PathBuf::from(CWD)
}

fn fs_with_config(path: &str, toml: &str) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir(CWD);
    fs.add_file(path, toml);
    fs
}

fn with_config(path: &str) -> CliOverrides {
    CliOverrides {
        config: Some(PathBuf::from(path)),
        ..CliOverrides::default()
    }
}

#[test]
fn run_accepts_string_or_list() -> TestResult {
    let one = parse_str(r#"run = "make test""#)?;
    assert_eq!(one.run, RunSpec::One("make test".into()));

    let many = parse_str(r#"run = ["make", "make test"]"#)?;
    assert_eq!(many.run.into_vec(), vec!["make", "make test"]);
    Ok(())
}

#[test]
fn durations_use_go_style_syntax() -> TestResult {
    let raw = parse_str(
        r#"
delay = "1m30s"
term_timeout = "250ms"
"#,
    )?;
    assert_eq!(raw.delay, Some(Duration::from_secs(90)));
    assert_eq!(raw.term_timeout, Some(Duration::from_millis(250)));
    Ok(())
}

#[test]
fn bad_duration_is_a_toml_error() {
    let result = parse_str(r#"delay = "soon""#);
    assert!(matches!(result, Err(WarError::TomlError(_))));
}

#[test]
fn validation_normalizes_extensions_and_rejects_blanks() -> TestResult {
    let cfg = ConfigFile::try_from(parse_str(r#"include_exts = [".go", "rs"]"#)?)?;
    assert_eq!(cfg.include_exts, vec!["go", "rs"]);

    let blank_ext = ConfigFile::try_from(parse_str(r#"include_exts = ["."]"#)?);
    assert!(matches!(blank_ext, Err(WarError::ConfigError(_))));

    let blank_run = ConfigFile::try_from(parse_str(r#"run = ["make", "  "]"#)?);
    assert!(matches!(blank_run, Err(WarError::ConfigError(_))));
    Ok(())
}

#[test]
fn bundled_example_config_is_valid() -> TestResult {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/example.war.toml");
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.root, "cfg:.");
    assert!(!cfg.run.is_empty());
    assert_eq!(cfg.delay, Some(Duration::from_secs(1)));
    assert_eq!(cfg.term_timeout, Some(Duration::from_secs(3)));
    assert_eq!(cfg.cancel_last, Some(true));
    Ok(())
}

#[test]
fn root_conventions() {
    let cwd = cwd();
    let cfg_dir = Path::new("/etc/war");
    let env = |name: &str| (name == "PROJECT_ROOT").then(|| "/srv/app".to_string());

    assert_eq!(resolve_root("", &cwd, Some(cfg_dir), &env), cwd);
    assert_eq!(resolve_root("/abs/dir", &cwd, Some(cfg_dir), &env), PathBuf::from("/abs/dir"));
    assert_eq!(resolve_root("wd:sub", &cwd, Some(cfg_dir), &env), cwd.join("sub"));
    assert_eq!(resolve_root("cfg:..", &cwd, Some(cfg_dir), &env), PathBuf::from("/etc"));
    assert_eq!(resolve_root("cfg:src", &cwd, Some(cfg_dir), &env), PathBuf::from("/etc/war/src"));
    assert_eq!(resolve_root("env:PROJECT_ROOT", &cwd, Some(cfg_dir), &env), PathBuf::from("/srv/app"));
    assert_eq!(resolve_root("env:UNSET", &cwd, Some(cfg_dir), &env), cwd);
    assert_eq!(resolve_root("rel/dir", &cwd, Some(cfg_dir), &env), cwd.join("rel/dir"));
}

#[test]
fn absolutize_folds_dot_segments() {
    assert_eq!(
        absolutize(Path::new("/a/b"), Path::new("./c/../d")),
        PathBuf::from("/a/b/d")
    );
    assert_eq!(absolutize(Path::new("/a/b"), Path::new("/x/./y")), PathBuf::from("/x/y"));
}

#[test]
fn no_config_uses_cwd_and_cli_run() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir(CWD);
    let overrides = CliOverrides {
        run: vec!["make test".into()],
        ..CliOverrides::default()
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;

    assert_eq!(policy.root, cwd());
    assert_eq!(policy.cfg_dir, None);
    assert_eq!(policy.run, vec!["make test"]);
    assert_eq!(policy.delay, DEFAULT_DELAY);
    assert_eq!(policy.cancel_last, DEFAULT_CANCEL_LAST);
    assert_eq!(policy.term_timeout, DEFAULT_TERM_TIMEOUT);
    Ok(())
}

#[test]
fn empty_run_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_dir(CWD);

    let result = resolve_policy(&CliOverrides::default(), &cwd(), &fs, no_env);

    match result {
        Err(WarError::ConfigError(msg)) => {
            assert_eq!(msg, "run is empty, use -r to specify the run command")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn config_file_sets_cfg_dir_root_and_env() -> TestResult {
    let fs = fs_with_config(
        "/home/dev/project/conf/war.toml",
        r#"
root = "cfg:.."
run = "go test ./..."
include_exts = ["go"]

[env]
GOFLAGS = "-race"
"#,
    );

    let policy = resolve_policy(&with_config("conf/war.toml"), &cwd(), &fs, no_env)?;

    assert_eq!(policy.cfg_dir, Some(PathBuf::from("/home/dev/project/conf")));
    assert_eq!(policy.root, cwd());
    assert_eq!(policy.run, vec!["go test ./..."]);
    assert!(policy.include_exts.contains("go"));
    assert_eq!(policy.env.get("GOFLAGS").map(String::as_str), Some("-race"));
    Ok(())
}

#[test]
fn cli_root_wins_over_config_root() -> TestResult {
    let fs = fs_with_config("/home/dev/project/war.toml", "root = \"/elsewhere\"\nrun = \"true\"");
    let overrides = CliOverrides {
        root: Some(PathBuf::from("sub")),
        ..with_config("war.toml")
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;

    assert_eq!(policy.root, cwd().join("sub"));
    Ok(())
}

#[test]
fn cli_overrides_beat_config_values() -> TestResult {
    let fs = fs_with_config(
        "/home/dev/project/war.toml",
        r#"
run = "true"
delay = "5s"
cancel_last = false
term_timeout = "10s"
"#,
    );

    let from_file = resolve_policy(&with_config("war.toml"), &cwd(), &fs, no_env)?;
    assert_eq!(from_file.delay, Duration::from_secs(5));
    assert!(!from_file.cancel_last);
    assert_eq!(from_file.term_timeout, Duration::from_secs(10));

    let overrides = CliOverrides {
        delay: Some(Duration::from_millis(100)),
        cancel_last: Some(true),
        term_timeout: Some(Duration::ZERO),
        verbosity: Verbosity::ALL,
        ..with_config("war.toml")
    };
    let from_cli = resolve_policy(&overrides, &cwd(), &fs, no_env)?;
    assert_eq!(from_cli.delay, Duration::from_millis(100));
    assert!(from_cli.cancel_last);
    assert_eq!(from_cli.term_timeout, Duration::ZERO);
    assert_eq!(from_cli.verbosity, Verbosity::ALL);
    Ok(())
}

#[test]
fn cli_run_values_naming_files_become_absolute() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/home/dev/project/scripts/check.sh", "#!/bin/sh");
    let overrides = CliOverrides {
        run: vec!["scripts/check.sh".into(), "echo hi".into(), "/usr/bin/true".into()],
        ..CliOverrides::default()
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;

    assert_eq!(
        policy.run,
        vec!["/home/dev/project/scripts/check.sh", "echo hi", "/usr/bin/true"]
    );
    Ok(())
}

#[test]
fn config_run_comes_before_cli_run() -> TestResult {
    let fs = fs_with_config("/home/dev/project/war.toml", r#"run = ["a", "b"]"#);
    let overrides = CliOverrides {
        run: vec!["c".into()],
        ..with_config("war.toml")
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;

    assert_eq!(policy.run, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn ignore_lines_are_collected_in_order() -> TestResult {
    let fs = fs_with_config(
        "/home/dev/project/war.toml",
        r#"
run = "true"
ignore_file = "ignore.txt"
ignore_rules = ["*.tmp"]
"#,
    );
    fs.add_file("/home/dev/project/ignore.txt", "# generated\nbuild/\n");
    fs.add_file("/home/dev/project/.gitignore", "target/\n!keep.tmp\n");
    let overrides = CliOverrides {
        auto: true,
        ignore: vec!["*.bak".into()],
        ..with_config("war.toml")
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;

    assert_eq!(
        policy.ignore_rules,
        vec!["build/", "*.tmp", "target/", "!keep.tmp", "*.bak"]
    );
    assert!(policy.ignore.matches("a/b.tmp"));
    assert!(!policy.ignore.matches("keep.tmp"));
    assert!(policy.ignore.matches("x.bak"));
    Ok(())
}

#[test]
fn missing_ignore_file_is_an_error() {
    let fs = fs_with_config(
        "/home/dev/project/war.toml",
        "run = \"true\"\nignore_file = \"nope.txt\"",
    );

    let result = resolve_policy(&with_config("war.toml"), &cwd(), &fs, no_env);
    assert!(matches!(result, Err(WarError::ConfigError(_))));
}

#[test]
fn auto_mode_prefers_war_run_script() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/home/dev/project/war_run.sh", "#!/bin/sh");
    fs.add_file("/home/dev/project/run.sh", "#!/bin/sh");
    let overrides = CliOverrides {
        auto: true,
        ..CliOverrides::default()
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;
    assert_eq!(policy.run, vec!["/home/dev/project/war_run.sh"]);
    Ok(())
}

#[test]
fn auto_mode_falls_back_to_run_script() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/home/dev/project/run.sh", "#!/bin/sh");
    let overrides = CliOverrides {
        auto: true,
        ..CliOverrides::default()
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;
    assert_eq!(policy.run, vec!["/home/dev/project/run.sh"]);
    Ok(())
}

#[test]
fn auto_mode_keeps_explicit_run() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/home/dev/project/run.sh", "#!/bin/sh");
    let overrides = CliOverrides {
        auto: true,
        run: vec!["make".into()],
        ..CliOverrides::default()
    };

    let policy = resolve_policy(&overrides, &cwd(), &fs, no_env)?;
    assert_eq!(policy.run, vec!["make"]);
    Ok(())
}

#[test]
fn missing_config_file_is_reported() {
    let fs = MockFileSystem::new();
    let result = resolve_policy(&with_config("missing.toml"), &cwd(), &fs, no_env);
    assert!(matches!(result, Err(WarError::ConfigError(_))));
}
