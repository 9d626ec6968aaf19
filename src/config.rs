use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 検証エンドポイントのデフォルト（OpenAI互換API）
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 検証エンドポイントのAPIキー（環境変数 LLM_API_KEY が優先）
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// 調査APIのベースURL（提出・アップロードURL発行）
    pub survey_api_url: String,
    /// 調査APIの内部キー（任意）
    pub internal_api_key: Option<String>,
    /// アップロード前に縮小する最大辺ピクセル
    pub max_image_size: u32,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            survey_api_url: "http://localhost:3000/api".into(),
            internal_api_key: None,
            max_image_size: 1568,
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SurveyError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("home-survey").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(SurveyError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
