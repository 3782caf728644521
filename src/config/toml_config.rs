use crate::utils::error::{RelayError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Optional `relay.toml`. Every field may also come from the environment,
/// which takes precedence.
///
/// ```toml
/// [splitwise]
/// api_key = "${SPLITWISE_API_KEY}"
/// api_base_url = "https://secure.splitwise.com/api/v3.0"
/// timeout_seconds = 30
///
/// [relay]
/// default_group_id = 123456
/// port = 8080
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub splitwise: SplitwiseSection,
    #[serde(default)]
    pub relay: RelaySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitwiseSection {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaySection {
    pub default_group_id: Option<i64>,
    pub port: Option<u16>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content, |name| std::env::var(name).ok());
        Ok(toml::from_str(&processed_content)?)
    }
}

/// 替換環境變數 (例如 ${API_KEY})；找不到的變數保持原樣
pub(crate) fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}

pub(crate) fn has_unresolved_placeholder(value: &str) -> bool {
    value.contains("${")
}

pub(crate) fn unresolved(field: &str, value: &str) -> RelayError {
    RelayError::ConfigError {
        message: format!("{} references an unset environment variable: {}", field, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[splitwise]
consumer_key = "ck"
consumer_secret = "cs"
api_key = "key-123"
api_base_url = "http://127.0.0.1:9000/api/v3.0"
timeout_seconds = 10

[relay]
default_group_id = 555
port = 9090
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.splitwise.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.splitwise.timeout_seconds, Some(10));
        assert_eq!(config.relay.default_group_id, Some(555));
        assert_eq!(config.relay.port, Some(9090));
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.splitwise.api_key.is_none());
        assert!(config.relay.port.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        let lookup = |name: &str| match name {
            "RELAY_TEST_KEY" => Some("secret".to_string()),
            _ => None,
        };

        let out = substitute_env_vars(r#"api_key = "${RELAY_TEST_KEY}""#, lookup);
        assert_eq!(out, r#"api_key = "secret""#);

        let out = substitute_env_vars(r#"api_key = "${RELAY_MISSING}""#, lookup);
        assert!(has_unresolved_placeholder(&out));
    }

    #[test]
    fn test_rejects_wrong_types() {
        let toml_content = r#"
[relay]
default_group_id = "not-a-number"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(RelayError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[relay]\ndefault_group_id = 77\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.relay.default_group_id, Some(77));
    }
}
