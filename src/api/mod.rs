//! 調査APIクライアント
//!
//! 外部コラボレータ2つへの境界:
//! - オブジェクトストレージ（署名付きURL発行とPUTアップロード）
//! - 永続化API（調査一式のアトミックな提出）

mod storage;
mod surveys;

pub use storage::PresignedUpload;
pub use surveys::{PhotoRecord, SubmitResponse, SurveySubmission};

use crate::config::Config;
use crate::error::Result;
use home_survey_common::SubmissionPayload;
use std::time::Duration;

/// 内部APIキーを載せるヘッダ名
const INTERNAL_API_KEY_HEADER: &str = "x-internal-api-key";

pub struct SurveyApi {
    http: reqwest::Client,
    base_url: String,
    internal_api_key: Option<String>,
}

impl SurveyApi {
    pub fn new(
        base_url: impl Into<String>,
        internal_api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            internal_api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.survey_api_url.clone(),
            config.internal_api_key.clone(),
            config.timeout_seconds,
        )
    }

    /// 共通ヘッダ付きでPOSTリクエストを組み立てる
    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.post(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.internal_api_key {
            builder = builder.header(INTERNAL_API_KEY_HEADER, key);
        }
        builder
    }

    /// ペイロードを提出する（アップロード → 提出の一連）
    ///
    /// 未アップロードの写真をストレージへ送ってキーを確定させたうえで
    /// 調査APIへ一括提出する。サーバ側の書き込みは全件成功か全ロール
    /// バックであり、失敗時はこの関数が1つの提出エラーとして返す。
    /// ローカルのセッション状態はここでは変更しないため再試行できる。
    pub async fn submit_payload(&self, mut payload: SubmissionPayload) -> Result<SubmitResponse> {
        self.upload_pending_photos(&mut payload).await?;
        let submission = SurveySubmission::from_payload(&payload)?;
        self.submit(&submission).await
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
