use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use incidens_console::config::Config;
use std::{collections::HashSet, io::Write, path::PathBuf, sync::Mutex};

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn parses_console_yaml_sections() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
api:
  baseUrl: http://incidens.local:9000/
  timeoutMs: 2500
console:
  pageSize: 10
  stateDir: /tmp/incidens-state
log:
  level: debug
"#
    )
    .expect("write");

    let cfg = Config::from_yaml_file(file.path().to_path_buf()).expect("parse");
    assert_eq!(cfg.api_base_url, "http://incidens.local:9000");
    assert_eq!(cfg.request_timeout_ms, 2500);
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.state_dir, PathBuf::from("/tmp/incidens-state"));
    assert_eq!(cfg.log_level, "debug");
    assert!(cfg.session_file().ends_with("session.json"));
}

#[test]
fn missing_yaml_sections_fall_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
api:
  baseUrl: http://incidens.local:9000
"#
    )
    .expect("write");

    let cfg = Config::from_yaml_file(file.path().to_path_buf()).expect("parse");
    assert_eq!(cfg.api_base_url, "http://incidens.local:9000");
    assert_eq!(cfg.request_timeout_ms, 5_000);
    assert_eq!(cfg.page_size, 6);
    assert_eq!(cfg.state_dir, PathBuf::from(".incidens-console"));
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn from_env_with_config_file_loads_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
api:
  baseUrl: http://cli.local:8100
console:
  pageSize: 4
"#
    )
    .expect("write");

    without_config_env(|| {
        let cfg = Config::from_env_with_config_file(file.path().to_path_buf()).expect("parse");
        assert_eq!(cfg.api_base_url, "http://cli.local:8100");
        assert_eq!(cfg.page_size, 4);
    });
}

#[test]
fn from_env_with_config_file_errors_for_missing_path() {
    without_config_env(|| {
        let missing = std::env::temp_dir().join("incidens-does-not-exist.yml");
        let err = Config::from_env_with_config_file(missing).expect_err("missing file");
        assert!(err.contains("failed to read"));
    });
}

#[test]
fn from_env_errors_when_incidens_config_path_is_invalid() {
    with_env_vars(
        &[
            ("INCIDENS_CONFIG", Some("/definitely/missing/incidens.yml")),
            ("INCIDENS_CONFIG_BASE64", None),
        ],
        || {
            let err = Config::from_env().expect_err("invalid env config");
            assert!(err.contains("failed to load INCIDENS_CONFIG"));
        },
    );
}

#[test]
fn from_env_loads_incidens_config_base64() {
    let yaml = r#"
api:
  baseUrl: http://base64.local:8200
log:
  level: trace
"#;
    let encoded = B64.encode(yaml.as_bytes());

    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", Some(encoded.as_str())),
            ("INCIDENS_API_BASE_URL", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        || {
            let cfg = Config::from_env().expect("config from base64 env");
            assert_eq!(cfg.api_base_url, "http://base64.local:8200");
            assert_eq!(cfg.log_level, "trace");
        },
    );
}

#[test]
fn from_env_errors_when_incidens_config_base64_is_invalid() {
    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", Some("%%%not-base64%%%")),
        ],
        || {
            let err = Config::from_env().expect_err("invalid base64 config");
            assert!(err.contains("failed to decode INCIDENS_CONFIG_BASE64"));
        },
    );
}

#[test]
fn from_env_errors_when_both_config_sources_are_set() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "api:\n  baseUrl: http://from-path.local").expect("write");
    let yaml = "api:\n  baseUrl: http://from-base64.local";
    let encoded = B64.encode(yaml.as_bytes());

    with_env_vars(
        &[
            (
                "INCIDENS_CONFIG",
                Some(file.path().to_str().expect("utf8 path")),
            ),
            ("INCIDENS_CONFIG_BASE64", Some(encoded.as_str())),
        ],
        || {
            let err = Config::from_env().expect_err("conflicting config sources");
            assert!(err.contains("INCIDENS_CONFIG and INCIDENS_CONFIG_BASE64"));
        },
    );
}

#[test]
fn merge_precedence_defaults_then_files_then_env() {
    let mut env_file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        env_file,
        r#"
api:
  baseUrl: http://from-env-file.local
console:
  pageSize: 9
log:
  level: warn
"#
    )
    .expect("write");

    let mut cli_file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        cli_file,
        r#"
api:
  baseUrl: http://from-cli-file.local
log:
  level: error
"#
    )
    .expect("write");

    with_env_vars(
        &[
            (
                "INCIDENS_CONFIG",
                Some(env_file.path().to_str().expect("utf8 path")),
            ),
            ("INCIDENS_CONFIG_BASE64", None),
            ("INCIDENS_API_BASE_URL", None),
            ("INCIDENS_TIMEOUT_MS", None),
            ("INCIDENS_PAGE_SIZE", Some("12")),
            ("INCIDENS_STATE_DIR", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        || {
            let cfg =
                Config::from_env_with_config_file(cli_file.path().to_path_buf()).expect("load");
            assert_eq!(cfg.api_base_url, "http://from-cli-file.local");
            assert_eq!(cfg.log_level, "error");
            assert_eq!(cfg.page_size, 12);
            assert_eq!(cfg.request_timeout_ms, 5_000);
        },
    );
}

#[test]
fn env_overrides_win_over_yaml() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
api:
  baseUrl: http://from-file.local
  timeoutMs: 2000
"#
    )
    .expect("write");

    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", None),
            ("INCIDENS_API_BASE_URL", Some("http://env.local/")),
            ("INCIDENS_TIMEOUT_MS", Some("750")),
            ("INCIDENS_PAGE_SIZE", None),
            ("INCIDENS_STATE_DIR", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        || {
            let cfg = Config::from_env_with_config_file(file.path().to_path_buf()).expect("load");
            assert_eq!(cfg.api_base_url, "http://env.local");
            assert_eq!(cfg.request_timeout_ms, 750);
        },
    );
}

#[test]
fn invalid_numeric_env_values_are_ignored() {
    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", None),
            ("INCIDENS_API_BASE_URL", None),
            ("INCIDENS_TIMEOUT_MS", Some("abc")),
            ("INCIDENS_PAGE_SIZE", Some("lots")),
            ("INCIDENS_STATE_DIR", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        || {
            let cfg = Config::from_env().expect("load");
            assert_eq!(cfg.request_timeout_ms, 5_000);
            assert_eq!(cfg.page_size, 6);
        },
    );
}

#[test]
fn a_zero_page_size_is_rejected() {
    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", None),
            ("INCIDENS_API_BASE_URL", None),
            ("INCIDENS_TIMEOUT_MS", None),
            ("INCIDENS_PAGE_SIZE", Some("0")),
            ("INCIDENS_STATE_DIR", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        || {
            let err = Config::from_env().expect_err("zero page size");
            assert!(err.contains("page size must be greater than zero"));
        },
    );
}

fn with_env_vars(vars: &[(&str, Option<&str>)], run: impl FnOnce()) {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let keys = vars
        .iter()
        .map(|(key, _)| key.to_string())
        .collect::<HashSet<_>>();
    let previous = keys
        .iter()
        .map(|key| (key.clone(), std::env::var(key).ok()))
        .collect::<Vec<_>>();

    for (key, value) in vars {
        unsafe {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    let run_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(run));

    for (key, value) in previous {
        unsafe {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }

    if let Err(payload) = run_result {
        std::panic::resume_unwind(payload);
    }
}

fn without_config_env(run: impl FnOnce()) {
    with_env_vars(
        &[
            ("INCIDENS_CONFIG", None),
            ("INCIDENS_CONFIG_BASE64", None),
            ("INCIDENS_API_BASE_URL", None),
            ("INCIDENS_TIMEOUT_MS", None),
            ("INCIDENS_PAGE_SIZE", None),
            ("INCIDENS_STATE_DIR", None),
            ("INCIDENS_LOG_LEVEL", None),
        ],
        run,
    );
}
