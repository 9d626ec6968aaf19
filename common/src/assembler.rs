//! 提出ペイロード組み立て
//!
//! セッション状態から永続化用ペイロードを導出する純粋変換。
//! 送信そのものはAPIクライアント側の責務で、ここでは副作用を持たない。

use crate::error::{Error, Result};
use crate::session::SurveySession;
use crate::steps::SURVEY_STEPS;
use crate::types::{PhotoEntry, SubmissionPayload};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// local@domain.tld の簡易形チェック
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// 顧客メールアドレスの形が妥当か
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// セッションから提出ペイロードを組み立てる
///
/// 顧客メールアドレスが未設定または不正な形なら拒否する。写真は
/// （フォールバック検証のものも含め）画像とプレビューが揃ったものを
/// カタログ順にすべて収録し、スキップ済みステップと抽出値はそのまま
/// 通す。
pub fn assemble(
    session: &SurveySession,
    geolocation: Option<String>,
    notes: Option<String>,
) -> Result<SubmissionPayload> {
    let email = session.customer_email().trim();
    if email.is_empty() {
        return Err(Error::InvalidEmail("missing customer email".into()));
    }
    if !is_valid_email(email) {
        return Err(Error::InvalidEmail(format!("malformed customer email: {}", email)));
    }

    // カタログ順に収録する
    let photos: Vec<PhotoEntry> = SURVEY_STEPS
        .iter()
        .filter_map(|step| session.photo(step.photo_type))
        .filter(|photo| photo.is_complete())
        .map(|photo| PhotoEntry {
            photo_type: photo.photo_type,
            image: photo.image.clone(),
            validation: photo.validation.clone(),
        })
        .collect();

    let skipped_step_ids: Vec<String> = SURVEY_STEPS
        .iter()
        .filter(|step| session.is_skipped(step.id))
        .map(|step| step.id.to_string())
        .collect();

    Ok(SubmissionPayload {
        customer_email: email.to_string(),
        photos,
        skipped_step_ids,
        main_disconnect_amperage: session.main_disconnect_amperage(),
        geolocation,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageHandle, PhotoType, ValidationResult};

    fn session_with_email() -> SurveySession {
        let mut session = SurveySession::new();
        session.set_customer_email("user@example.com");
        session
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.co"));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_assemble_rejects_missing_email() {
        let session = SurveySession::new();
        let result = assemble(&session, None, None);
        assert!(matches!(result, Err(Error::InvalidEmail(_))));
    }

    #[test]
    fn test_assemble_rejects_malformed_email() {
        let mut session = SurveySession::new();
        session.set_customer_email("not-an-email");
        let result = assemble(&session, None, None);
        assert!(matches!(result, Err(Error::InvalidEmail(_))));
    }

    #[test]
    fn test_assemble_collects_photos_in_catalog_order() {
        let mut session = session_with_email();
        // わざと逆順で登録
        session.add_photo(
            PhotoType::BreakerBoxArea,
            ImageHandle::Memory(vec![1]),
            "c.jpg".to_string(),
            "breaker-box-area",
        );
        session.add_photo(
            PhotoType::MeterCloseup,
            ImageHandle::Memory(vec![2]),
            "a.jpg".to_string(),
            "meter-closeup",
        );

        let payload = assemble(&session, None, None).unwrap();
        assert_eq!(payload.photos.len(), 2);
        assert_eq!(payload.photos[0].photo_type, PhotoType::MeterCloseup);
        assert_eq!(payload.photos[1].photo_type, PhotoType::BreakerBoxArea);
    }

    #[test]
    fn test_assemble_roundtrip_count_and_validation() {
        // N枚登録すればペイロードにもN件、photoType/検証結果が対で残る
        let mut session = session_with_email();
        let entries = [
            (PhotoType::MeterCloseup, "meter-closeup", 0.9),
            (PhotoType::MeterAreaWide, "meter-area", 0.8),
            (PhotoType::AcUnitLabel, "ac-unit-label", 0.7),
        ];
        for (photo_type, step_id, confidence) in entries {
            session.add_photo(
                photo_type,
                ImageHandle::Memory(vec![0xFF]),
                format!("{}.jpg", step_id),
                step_id,
            );
            session.update_validation(
                photo_type,
                ValidationResult {
                    is_valid: true,
                    confidence,
                    feedback: format!("feedback for {}", step_id),
                    extracted_data: None,
                },
            );
        }

        let payload = assemble(&session, None, None).unwrap();
        assert_eq!(payload.photos.len(), 3);
        for (entry, (photo_type, _, confidence)) in payload.photos.iter().zip(entries) {
            assert_eq!(entry.photo_type, photo_type);
            assert_eq!(entry.validation.as_ref().unwrap().confidence, confidence);
        }
    }

    #[test]
    fn test_assemble_includes_fallback_validated_photos() {
        let mut session = session_with_email();
        session.add_photo(
            PhotoType::MeterCloseup,
            ImageHandle::Memory(vec![0xFF]),
            "m.jpg".to_string(),
            "meter-closeup",
        );
        session.update_validation(PhotoType::MeterCloseup, ValidationResult::fallback());

        let payload = assemble(&session, None, None).unwrap();
        assert_eq!(payload.photos.len(), 1);
        assert!(payload.photos[0].validation.as_ref().unwrap().is_valid);
    }

    #[test]
    fn test_assemble_excludes_incomplete_photos() {
        let mut session = session_with_email();
        session.add_photo(
            PhotoType::MeterCloseup,
            ImageHandle::Memory(Vec::new()), // 画像バイトが空
            "m.jpg".to_string(),
            "meter-closeup",
        );
        let payload = assemble(&session, None, None).unwrap();
        assert!(payload.photos.is_empty());
    }

    #[test]
    fn test_assemble_passes_through_skips_and_scalars() {
        let mut session = session_with_email();
        session.skip("area-behind-fence");
        session.skip("second-ac-unit");
        session.set_main_disconnect_amperage(200).unwrap();

        let payload = assemble(
            &session,
            Some("35.6,139.7".to_string()),
            Some("gate code 1234".to_string()),
        )
        .unwrap();

        assert_eq!(
            payload.skipped_step_ids,
            vec!["area-behind-fence".to_string(), "second-ac-unit".to_string()]
        );
        assert_eq!(payload.main_disconnect_amperage, Some(200));
        assert_eq!(payload.geolocation.as_deref(), Some("35.6,139.7"));
        assert_eq!(payload.notes.as_deref(), Some("gate code 1234"));
    }
}
