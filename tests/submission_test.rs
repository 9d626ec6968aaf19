//! 提出ペイロードとワイヤ形式のテスト

use home_survey_common::{
    assemble, ImageHandle, PhotoType, SurveySession, ValidationResult, SURVEY_STEPS,
};
use home_survey_rust::api::SurveySubmission;

fn filled_session(photo_count: usize) -> SurveySession {
    let mut session = SurveySession::new();
    session.set_customer_email("customer@example.com");
    for step in SURVEY_STEPS.iter().take(photo_count) {
        session.add_photo(
            step.photo_type,
            ImageHandle::Stored(format!("survey/tmp/key_{}.jpg", step.photo_type)),
            format!("{}.jpg", step.id),
            step.id,
        );
        session.update_validation(
            step.photo_type,
            ValidationResult {
                is_valid: true,
                confidence: 0.75,
                feedback: format!("{} ok", step.id),
                extracted_data: None,
            },
        );
    }
    session
}

/// 往復性質: N枚の完了写真はペイロードにN件、photoTypeと検証結果が対で残る
#[test]
fn test_payload_photo_count_roundtrip() {
    for n in [1, 5, 11] {
        let session = filled_session(n);
        let payload = assemble(&session, None, None).unwrap();

        assert_eq!(payload.photos.len(), n);
        for (entry, step) in payload.photos.iter().zip(SURVEY_STEPS.iter()) {
            assert_eq!(entry.photo_type, step.photo_type);
            let validation = entry.validation.as_ref().expect("検証結果が欠落");
            assert_eq!(validation.feedback, format!("{} ok", step.id));
        }
    }
}

/// ペイロード→ワイヤ形式→JSONの一連
#[test]
fn test_submission_wire_shape() {
    let mut session = filled_session(3);
    session.skip("area-behind-fence");
    session.set_main_disconnect_amperage(200).unwrap();

    let payload = assemble(&session, None, Some("side gate unlocked".to_string())).unwrap();
    let submission = SurveySubmission::from_payload(&payload).unwrap();
    let json = serde_json::to_value(&submission).unwrap();

    assert_eq!(json["customerEmail"], "customer@example.com");
    assert_eq!(json["photos"].as_array().unwrap().len(), 3);
    assert_eq!(json["photos"][0]["photoType"], "meter_closeup");
    assert!(json["photos"][0]["s3Key"]
        .as_str()
        .unwrap()
        .starts_with("survey/tmp/"));
    assert_eq!(json["photos"][0]["validation"]["isValid"], true);
    assert_eq!(json["skippedSteps"][0], "area-behind-fence");
    assert_eq!(json["mainDisconnectAmperage"], 200);
    assert_eq!(json["notes"], "side gate unlocked");
    // 未設定の位置情報は送らない
    assert!(json.get("geolocation").is_none());
}

/// 顧客メール未設定・不正はワイヤ変換の前に拒否される
#[test]
fn test_submission_requires_valid_email() {
    let mut session = filled_session(11);
    session.set_customer_email("");
    assert!(assemble(&session, None, None).is_err());

    session.set_customer_email("nope@nodomain");
    assert!(assemble(&session, None, None).is_err());

    session.set_customer_email("ok@example.com");
    assert!(assemble(&session, None, None).is_ok());
}

/// ワイヤ形式はデシリアライズでも往復する
#[test]
fn test_submission_json_roundtrip() {
    let session = filled_session(2);
    let payload = assemble(&session, None, None).unwrap();
    let submission = SurveySubmission::from_payload(&payload).unwrap();

    let json = serde_json::to_string(&submission).unwrap();
    let restored: SurveySubmission = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, submission);
}
