pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.fastly.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_CONFIG_PATH: &str = "USERMGT_CONFIG_PATH";
const ENV_API_KEY: &str = "FASTLY_API_KEY";
const ENV_BASE_URL: &str = "FASTLY_API_URL";
const ENV_FORCE_HTTP2: &str = "FASTLY_FORCE_HTTP2";
const ENV_DISPLAY_SENSITIVE: &str = "FASTLY_TF_DISPLAY_SENSITIVE_FIELDS";

/// アカウント API への接続設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// `Fastly-Key` ヘッダで送る API トークン
    pub api_key: Option<String>,

    /// API エンドポイント
    pub base_url: String,

    /// HTTP/1.1 へのフォールバックを無効化
    pub force_http2: bool,

    /// 出力で秘匿値をマスクせずに表示する
    pub display_sensitive: bool,

    /// リクエストごとのタイムアウト (秒)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            force_http2: false,
            display_sensitive: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// 設定を読み込む: デフォルト → 設定ファイル (あれば) → 環境変数
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// YAML 設定ファイルを読む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 環境変数で上書きする
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var(ENV_API_KEY)
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL)
            && !url.is_empty()
        {
            self.base_url = url;
        }
        if let Ok(value) = std::env::var(ENV_FORCE_HTTP2) {
            self.force_http2 = parse_bool(ENV_FORCE_HTTP2, &value)?;
        }
        // "true" のときだけ有効
        if let Ok(value) = std::env::var(ENV_DISPLAY_SENSITIVE) {
            self.display_sensitive = value == "true";
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 表示用のコピー。`display_sensitive` でなければ API キーはマスクされる
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !self.display_sensitive {
            copy.api_key = self.api_key.as_ref().map(|_| "(sensitive)".to_string());
        }
        copy
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 USERMGT_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: usermgt.local.yaml, usermgt.yaml
/// 3. ./.usermgt/ ディレクトリ内: 同様の順序
/// 4. ~/.config/usermgt/config.yaml (グローバル設定)
///
/// 見つからなければ `None` (デフォルト + 環境変数で動作する)
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = ["usermgt.local.yaml", "usermgt.yaml"];

    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let state_dir = current_dir.join(".usermgt");
    if state_dir.is_dir() {
        for filename in &candidates {
            let path = state_dir.join(filename);
            if path.exists() {
                return Ok(Some(path));
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("usermgt").join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const ALL_ENV: [&str; 5] = [
        ENV_CONFIG_PATH,
        ENV_API_KEY,
        ENV_BASE_URL,
        ENV_FORCE_HTTP2,
        ENV_DISPLAY_SENSITIVE,
    ];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_ENV.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "https://api.fastly.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert!(!config.display_sensitive);
    }

    #[test]
    fn test_from_file_partial() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("usermgt.yaml");
        fs::write(&path, "api_key: file-key\ntimeout_secs: 5\n").unwrap();

        let config = ProviderConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    #[serial]
    fn test_load_leaves_global_config_dir_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut vars: Vec<(&str, Option<&str>)> = cleared();
        vars.push(("XDG_CONFIG_HOME", temp_dir.path().to_str()));

        temp_env::with_vars(vars, || {
            ProviderConfig::load().unwrap();
        });
        assert!(!temp_dir.path().join("usermgt").exists());
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("usermgt.yaml");
        fs::write(&path, "timeout_secs: [not a number").unwrap();

        let err = ProviderConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("設定ファイルの解析に失敗しました"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut vars = cleared();
        vars.push((ENV_API_KEY, Some("env-key")));
        vars.push((ENV_BASE_URL, Some("http://localhost:1234")));
        vars.push((ENV_DISPLAY_SENSITIVE, Some("true")));

        temp_env::with_vars(vars, || {
            let mut config = ProviderConfig {
                api_key: Some("file-key".to_string()),
                ..Default::default()
            };
            config.apply_env().unwrap();

            assert_eq!(config.api_key.as_deref(), Some("env-key"));
            assert_eq!(config.base_url, "http://localhost:1234");
            assert!(config.display_sensitive);
        });
    }

    #[test]
    #[serial]
    fn test_display_sensitive_requires_literal_true() {
        let mut vars = cleared();
        vars.push((ENV_DISPLAY_SENSITIVE, Some("1")));

        temp_env::with_vars(vars, || {
            let mut config = ProviderConfig::default();
            config.apply_env().unwrap();
            assert!(!config.display_sensitive);
        });
    }

    #[test]
    #[serial]
    fn test_invalid_force_http2() {
        let mut vars = cleared();
        vars.push((ENV_FORCE_HTTP2, Some("maybe")));

        temp_env::with_vars(vars, || {
            let mut config = ProviderConfig::default();
            let err = config.apply_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            assert_eq!(
                err.to_string(),
                "FASTLY_FORCE_HTTP2 の値が不正です: \"maybe\" (true/false を指定してください)"
            );
        });
    }

    #[test]
    fn test_redacted_masks_api_key() {
        let config = ProviderConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_key.as_deref(), Some("(sensitive)"));

        let shown = ProviderConfig {
            display_sensitive: true,
            ..config
        };
        assert_eq!(shown.redacted().api_key.as_deref(), Some("secret"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("usermgt.yaml"), "{}").unwrap();
        fs::write(temp_dir.path().join("usermgt.local.yaml"), "{}").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_vars(cleared(), find_config_file).unwrap();
        assert!(result.unwrap().ends_with("usermgt.local.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_state_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let state_dir = temp_dir.path().join(".usermgt");
        fs::create_dir(&state_dir).unwrap();
        fs::write(state_dir.join("usermgt.yaml"), "{}").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_vars(cleared(), find_config_file).unwrap();
        assert!(result.unwrap().ends_with(".usermgt/usermgt.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "{}").unwrap();

        let mut vars: Vec<(&str, Option<&str>)> = cleared();
        vars.push((ENV_CONFIG_PATH, config_path.to_str()));

        let result = temp_env::with_vars(vars, find_config_file).unwrap();
        assert_eq!(result, Some(config_path));
    }

    #[test]
    #[serial]
    fn test_load_with_env_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let mut vars: Vec<(&str, Option<&str>)> = cleared();
        vars.push((ENV_API_KEY, Some("env-key")));
        vars.push(("XDG_CONFIG_HOME", temp_dir.path().to_str()));

        let config = temp_env::with_vars(vars, ProviderConfig::load).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        std::env::set_current_dir(original_dir).unwrap();
    }
}
