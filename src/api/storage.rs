//! オブジェクトストレージ境界
//!
//! 写真バイト列の格納先キーは調査APIが発行する署名付きURL経由で決まる:
//! `POST /surveys/photos` で種別ごとのアップロード先を受け取り、各URLへ
//! JPEGバイト列をPUTする。キーは `survey/tmp/` 配下の一時キーで、提出時に
//! 永続化側が参照する。

use super::SurveyApi;
use crate::error::{Result, SurveyError};
use home_survey_common::{ImageHandle, PhotoType, SubmissionPayload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct PresignRequest {
    photos: Vec<PresignPhoto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignPhoto {
    photo_type: PhotoType,
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    urls: Vec<PresignedUpload>,
}

/// 発行されたアップロード先
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub photo_type: PhotoType,
    /// ストレージ上の一時キー（例: "survey/tmp/<id>_meter_closeup.jpg"）
    pub key: String,
    pub upload_url: String,
}

impl SurveyApi {
    /// 写真種別ごとの署名付きアップロードURLを発行してもらう
    pub async fn request_upload_urls(
        &self,
        photo_types: &[PhotoType],
    ) -> Result<Vec<PresignedUpload>> {
        let request = PresignRequest {
            photos: photo_types
                .iter()
                .map(|&photo_type| PresignPhoto { photo_type })
                .collect(),
        };

        let response = self.post("/surveys/photos").json(&request).send().await?;
        if !response.status().is_success() {
            return Err(SurveyError::ApiCall(format!(
                "presign request failed: {}",
                response.status()
            )));
        }

        let payload: PresignResponse = response.json().await?;
        Ok(payload.urls)
    }

    /// JPEGバイト列を署名付きURLへPUTする
    pub async fn upload_photo(&self, upload_url: &str, bytes: Vec<u8>) -> Result<()> {
        let response = self
            .http()
            .put(upload_url)
            .header("Content-Type", "image/jpeg")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SurveyError::ApiCall(format!(
                "photo upload failed: {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// ペイロード内の未アップロード写真をすべてアップロードする
    ///
    /// Memoryの画像ハンドルをアップロード済みキー（Stored）へ置き換える。
    /// アップロード済みの写真はそのまま。
    pub async fn upload_pending_photos(&self, payload: &mut SubmissionPayload) -> Result<()> {
        let pending: Vec<PhotoType> = payload
            .photos
            .iter()
            .filter(|entry| matches!(entry.image, ImageHandle::Memory(_)))
            .map(|entry| entry.photo_type)
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        let uploads = self.request_upload_urls(&pending).await?;

        for entry in payload.photos.iter_mut() {
            let ImageHandle::Memory(bytes) = &entry.image else {
                continue;
            };
            let upload = uploads
                .iter()
                .find(|u| u.photo_type == entry.photo_type)
                .ok_or_else(|| {
                    SurveyError::ApiCall(format!(
                        "no upload url issued for photo type: {}",
                        entry.photo_type
                    ))
                })?;

            self.upload_photo(&upload.upload_url, bytes.clone()).await?;
            entry.image = ImageHandle::Stored(upload.key.clone());
        }

        Ok(())
    }
}
