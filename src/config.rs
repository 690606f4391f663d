use crate::constants::{DEFAULT_PAGE_SIZE, SESSION_FILE_NAME};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use config::{Config as SettingsLoader, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub page_size: usize,
    pub state_dir: PathBuf,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawEnvConfig {
    config: Option<String>,
    config_base64: Option<String>,
    api_base_url: Option<String>,
    timeout_ms: Option<String>,
    page_size: Option<String>,
    state_dir: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YamlConfig {
    api: Option<YamlApi>,
    console: Option<YamlConsole>,
    log: Option<YamlLog>,
}

#[derive(Debug, Deserialize)]
struct YamlApi {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    #[serde(rename = "timeoutMs")]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct YamlConsole {
    #[serde(rename = "pageSize")]
    page_size: Option<usize>,
    #[serde(rename = "stateDir")]
    state_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YamlLog {
    level: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let env_cfg = load_incidens_env()?;
        let mut cfg = Self::defaults();
        cfg.apply_env_config_sources_if_present(&env_cfg)?;
        cfg.apply_env_overrides(&env_cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_env_with_config_file(config_path: PathBuf) -> Result<Self, String> {
        let env_cfg = load_incidens_env()?;
        let mut cfg = Self::defaults();
        cfg.apply_env_config_sources_if_present(&env_cfg)?;
        cfg.apply_yaml_overrides(Self::from_yaml_file(config_path)?);
        cfg.apply_env_overrides(&env_cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE_NAME)
    }

    fn defaults() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 5_000,
            page_size: DEFAULT_PAGE_SIZE,
            state_dir: PathBuf::from(".incidens-console"),
            log_level: "info".to_string(),
        }
    }

    fn apply_env_config_sources_if_present(
        &mut self,
        env_cfg: &RawEnvConfig,
    ) -> Result<(), String> {
        let config_path = env_cfg
            .config
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let config_b64 = env_cfg
            .config_base64
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match (config_path, config_b64) {
            (Some(_), Some(_)) => Err(
                "INCIDENS_CONFIG and INCIDENS_CONFIG_BASE64 are both set; use only one"
                    .to_string(),
            ),
            (Some(path), None) => {
                let loaded = Self::from_yaml_file(PathBuf::from(path))
                    .map_err(|err| format!("failed to load INCIDENS_CONFIG={path}: {err}"))?;
                self.apply_yaml_overrides(loaded);
                Ok(())
            }
            (None, Some(value)) => {
                let compact = value
                    .chars()
                    .filter(|ch| !ch.is_ascii_whitespace())
                    .collect::<String>();
                let decoded = B64
                    .decode(compact)
                    .map_err(|err| format!("failed to decode INCIDENS_CONFIG_BASE64: {err}"))?;
                let yaml = String::from_utf8(decoded).map_err(|err| {
                    format!(
                        "failed to decode INCIDENS_CONFIG_BASE64: decoded bytes are not UTF-8 ({err})"
                    )
                })?;
                let loaded = Self::from_yaml_str("INCIDENS_CONFIG_BASE64", &yaml)
                    .map_err(|err| format!("failed to load INCIDENS_CONFIG_BASE64: {err}"))?;
                self.apply_yaml_overrides(loaded);
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    fn apply_env_overrides(&mut self, env_cfg: &RawEnvConfig) {
        if let Some(raw_url) = env_cfg.api_base_url.as_deref() {
            self.api_base_url = normalize_base_url(raw_url);
        }
        if let Some(parsed) = parse_env_value::<u64>(env_cfg.timeout_ms.as_deref()) {
            self.request_timeout_ms = parsed;
        }
        if let Some(parsed) = parse_env_value::<usize>(env_cfg.page_size.as_deref()) {
            self.page_size = parsed;
        }
        if let Some(raw_dir) = env_cfg.state_dir.as_deref() {
            self.state_dir = PathBuf::from(raw_dir);
        }
        if let Some(level) = env_cfg.log_level.as_deref() {
            self.log_level = level.to_string();
        }
    }

    fn apply_yaml_overrides(&mut self, loaded: Self) {
        self.api_base_url = loaded.api_base_url;
        self.request_timeout_ms = loaded.request_timeout_ms;
        self.page_size = loaded.page_size;
        self.state_dir = loaded.state_dir;
        self.log_level = loaded.log_level;
    }

    pub fn from_yaml_file(path: PathBuf) -> Result<Self, String> {
        let parsed = load_yaml_config(&path)?;
        Ok(Self::from_yaml_config(parsed))
    }

    fn from_yaml_str(source: &str, text: &str) -> Result<Self, String> {
        let parsed = load_yaml_config_from_str(source, text)?;
        Ok(Self::from_yaml_config(parsed))
    }

    fn from_yaml_config(parsed: YamlConfig) -> Self {
        let defaults = Self::defaults();
        let api_base_url = parsed
            .api
            .as_ref()
            .and_then(|api| api.base_url.as_deref())
            .map(normalize_base_url)
            .unwrap_or(defaults.api_base_url);
        let request_timeout_ms = parsed
            .api
            .as_ref()
            .and_then(|api| api.timeout_ms)
            .unwrap_or(defaults.request_timeout_ms);
        let page_size = parsed
            .console
            .as_ref()
            .and_then(|console| console.page_size)
            .unwrap_or(defaults.page_size);
        let state_dir = parsed
            .console
            .and_then(|console| console.state_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);
        let log_level = parsed
            .log
            .and_then(|log| log.level)
            .unwrap_or(defaults.log_level);

        Self {
            api_base_url,
            request_timeout_ms,
            page_size,
            state_dir,
            log_level,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.api_base_url.trim().is_empty() {
            return Err("api base url must not be empty".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request timeout must be greater than zero".to_string());
        }
        if self.page_size == 0 {
            return Err("page size must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn load_yaml_config(path: &Path) -> Result<YamlConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let source = path.display().to_string();
    load_yaml_config_from_str(&source, &text)
}

fn load_yaml_config_from_str(source: &str, text: &str) -> Result<YamlConfig, String> {
    serde_yaml::from_str::<YamlConfig>(text)
        .map_err(|err| format!("failed to parse {source}: {err}"))
}

fn load_incidens_env() -> Result<RawEnvConfig, String> {
    let settings = SettingsLoader::builder()
        .add_source(Environment::with_prefix("INCIDENS").try_parsing(false))
        .build()
        .map_err(|err| format!("failed to load INCIDENS_* environment: {err}"))?;

    Ok(RawEnvConfig {
        config: env_value_for_var(&settings, "INCIDENS_CONFIG"),
        config_base64: env_value_for_var(&settings, "INCIDENS_CONFIG_BASE64"),
        api_base_url: env_value_for_var(&settings, "INCIDENS_API_BASE_URL"),
        timeout_ms: env_value_for_var(&settings, "INCIDENS_TIMEOUT_MS"),
        page_size: env_value_for_var(&settings, "INCIDENS_PAGE_SIZE"),
        state_dir: env_value_for_var(&settings, "INCIDENS_STATE_DIR"),
        log_level: env_value_for_var(&settings, "INCIDENS_LOG_LEVEL"),
    })
}

fn env_value(settings: &SettingsLoader, key: &str) -> Option<String> {
    settings
        .get_string(key)
        .ok()
        .or_else(|| settings.get_string(&key.to_ascii_uppercase()).ok())
}

fn env_value_for_var(settings: &SettingsLoader, env_var: &str) -> Option<String> {
    let key = env_var
        .strip_prefix("INCIDENS_")
        .unwrap_or(env_var)
        .to_ascii_lowercase();
    env_value(settings, &key)
}

fn parse_env_value<T>(raw: Option<&str>) -> Option<T>
where
    T: std::str::FromStr,
{
    raw.and_then(|value| value.parse::<T>().ok())
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_whitespace_and_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://api.local:8000/"),
            "http://api.local:8000"
        );
        assert_eq!(normalize_base_url("  http://api.local "), "http://api.local");
        assert_eq!(normalize_base_url("http://api.local//"), "http://api.local");
    }

    #[test]
    fn unparsable_env_values_are_ignored() {
        assert_eq!(parse_env_value::<u64>(Some("2500")), Some(2500));
        assert_eq!(parse_env_value::<u64>(Some("soon")), None);
        assert_eq!(parse_env_value::<u64>(None), None);
    }

    #[test]
    fn session_file_lives_under_the_state_dir() {
        let mut cfg = Config::defaults();
        cfg.state_dir = PathBuf::from("/var/lib/incidens");
        assert_eq!(
            cfg.session_file(),
            PathBuf::from("/var/lib/incidens/session.json")
        );
    }
}
