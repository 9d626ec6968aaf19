//! AI検証クライアント
//!
//! OpenAI互換のchat-completionsエンドポイントへ写真と指示文を送り、
//! 応答をValidationResultへ正規化する。検証は助言であってゲートでは
//! ないため、この層の呼び出しは決して失敗しない: 通信・解釈のあらゆる
//! 障害は境界で吸収し、固定フォールバック結果として返す。

use crate::config::Config;
use crate::error::{Result, SurveyError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use home_survey_common::{build_validation_prompt, parse_validation_reply};
use home_survey_common::{PhotoType, ValidationOutcome, ValidationResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 検証呼び出しのトークン上限
const MAX_TOKENS: u32 = 500;
/// 判定を安定させるための低温度
const TEMPERATURE: f32 = 0.1;

/// chat-completionsリクエスト
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

/// chat-completionsレスポンス
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// 画像バイト列をdata URLへ変換
fn to_data_url(image_bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image_bytes))
}

/// AI検証クライアント
pub struct ValidationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    verbose: bool,
}

impl ValidationClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            verbose: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            config.timeout_seconds,
        )
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 写真を検証する（常に解決する）
    ///
    /// 通信やパースの失敗はここで吸収し、フォールバック結果を返す。
    /// 呼び出し側から見えるエラー経路は存在しない。
    pub async fn validate(&self, image_bytes: &[u8], photo_type: PhotoType) -> ValidationOutcome {
        match self.call_endpoint(image_bytes, photo_type).await {
            Ok(reply) => {
                if self.verbose {
                    println!("  [validate] レスポンス長: {} chars", reply.len());
                }
                ValidationOutcome::Validated(parse_validation_reply(&reply))
            }
            Err(e) => {
                if self.verbose {
                    eprintln!("  [validate] 検証失敗、フォールバック適用: {}", e);
                }
                ValidationOutcome::Fallback(ValidationResult::fallback())
            }
        }
    }

    /// エンドポイント呼び出し（生テキスト応答を返す）
    async fn call_endpoint(&self, image_bytes: &[u8], photo_type: PhotoType) -> Result<String> {
        let prompt = build_validation_prompt(photo_type);

        if self.verbose {
            println!("  [validate] プロンプト長: {} chars", prompt.len());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: to_data_url(image_bytes),
                            detail: "high",
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SurveyError::ApiCall(format!(
                "validation endpoint returned {}",
                response.status()
            )));
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| SurveyError::ApiParse("no content in reply".into()))
    }
}
