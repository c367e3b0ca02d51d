use crate::ai_provider::AiProvider;
use crate::error::{Result, TagAiError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tag_ai_common::ANALYSIS_INSTRUCTION;

/// 16 MiB（アップロード上限と同じ）
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// プロバイダ1件分の設定
///
/// APIキー本体は保存しない。`api_key_env`で指定した環境変数から読む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ProviderConfig {
    /// 環境変数からAPIキーを取得（空文字は未設定扱い）
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub primary: ProviderConfig,
    pub secondary: ProviderConfig,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub max_image_bytes: u64,
    /// 指示文の上書き
    pub instruction: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TagAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("tag-ai").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            primary: AiProvider::Xai.default_config(),
            secondary: AiProvider::OpenAi.default_config(),
            timeout_seconds: 30,
            max_tokens: 1000,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            instruction: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(TagAiError::Config("timeout_seconds は1以上にしてください".into()));
        }
        for provider in [&self.primary, &self.secondary] {
            if provider.endpoint.trim().is_empty() {
                return Err(TagAiError::Config(format!(
                    "{} のendpointが空です",
                    provider.name
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or(ANALYSIS_INSTRUCTION)
    }
}
