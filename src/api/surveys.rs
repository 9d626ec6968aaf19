//! 調査提出境界
//!
//! 調査APIは顧客のupsert、調査レコード、写真レコード、スキップ記録を
//! 1トランザクションで書き込む。どれか1件でも失敗すれば全体が
//! ロールバックされ、こちらには1つの提出エラーとして届く。

use super::SurveyApi;
use crate::error::{Result, SurveyError};
use home_survey_common::{ImageHandle, PhotoType, SubmissionPayload, ValidationResult};
use serde::{Deserialize, Serialize};

/// 提出ワイヤ形式
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub customer_email: String,
    pub photos: Vec<PhotoRecord>,
    pub skipped_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_disconnect_amperage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// 提出する写真レコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub photo_type: PhotoType,
    /// ストレージ上のキー（アップロード済みであること）
    pub s3_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

/// 提出成功レスポンス
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub survey_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct SubmitErrorBody {
    #[serde(default)]
    error: String,
}

impl SurveySubmission {
    /// 組み立て済みペイロードからワイヤ形式を作る
    ///
    /// 全写真がアップロード済み（Storedハンドル）である必要がある。
    pub fn from_payload(payload: &SubmissionPayload) -> Result<Self> {
        let mut photos = Vec::with_capacity(payload.photos.len());
        for entry in &payload.photos {
            let s3_key = match &entry.image {
                ImageHandle::Stored(key) => key.clone(),
                ImageHandle::Memory(_) => {
                    return Err(SurveyError::Submission(format!(
                        "photo not uploaded yet: {}",
                        entry.photo_type
                    )));
                }
            };
            photos.push(PhotoRecord {
                photo_type: entry.photo_type,
                s3_key,
                validation: entry.validation.clone(),
            });
        }

        Ok(Self {
            customer_email: payload.customer_email.clone(),
            photos,
            skipped_steps: payload.skipped_step_ids.clone(),
            main_disconnect_amperage: payload.main_disconnect_amperage,
            geolocation: payload.geolocation.clone(),
            notes: payload.notes.clone(),
        })
    }
}

impl SurveyApi {
    /// 調査一式を提出する
    ///
    /// 失敗はステータスとサーバのエラーメッセージを含む1つの
    /// 提出エラーになる。
    pub async fn submit(&self, submission: &SurveySubmission) -> Result<SubmitResponse> {
        let response = self.post("/surveys").json(submission).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<SubmitErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(SurveyError::Submission(format!(
                "survey API returned {}: {}",
                status, detail
            )));
        }

        Ok(response.json::<SubmitResponse>().await?)
    }
}
