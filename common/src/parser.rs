//! 検証レスポンスパーサー
//!
//! AIエンドポイントの自由形式テキストからJSONを抽出し、ValidationResultへ
//! 正規化する。このモジュールのパースは全域的で、どんな入力に対しても
//! 利用可能な結果を返す（呼び出し元へエラーを伝播しない）。
//!
//! 解釈の優先順位:
//! 1. ```json ... ``` / ``` ... ``` ブロック内のJSONオブジェクト
//! 2. 生の {...} オブジェクト
//! 3. ヒューリスティック: 否定キーワードが無ければ有効とみなす
//! 4. 解釈不能（空応答など）は固定フォールバック結果

use crate::error::{Error, Result};
use crate::types::ValidationResult;

/// ヒューリスティック判定時の固定confidence
const HEURISTIC_CONFIDENCE: f64 = 0.6;
/// ヒューリスティック時にfeedbackへ転記する最大文字数
const FEEDBACK_TRUNCATE_CHARS: usize = 200;

/// レスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. ``` ... ``` ブロック
/// 3. 生の {...} オブジェクト
///
/// # Arguments
/// * `response` - APIレスポンス文字列
///
/// # Returns
/// * `Ok(&str)` - 抽出されたJSON文字列
/// * `Err` - JSONが見つからない場合
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 言語指定なしの ``` ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```") {
        let start = start_marker + 3;
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 検証レスポンスをパース（全域的）
///
/// 構造化パースに失敗してもヒューリスティックへ退避し、それも成立しない
/// 入力（空応答など）は固定フォールバック結果を返す。confidenceは常に
/// [0,1]へクランプされ、feedbackは常に非空。
///
/// # Arguments
/// * `reply` - AIエンドポイントの生テキスト応答
pub fn parse_validation_reply(reply: &str) -> ValidationResult {
    if reply.trim().is_empty() {
        return ValidationResult::fallback();
    }

    match parse_structured(reply) {
        Some(mut result) => {
            result.clamp_confidence();
            result
        }
        None => heuristic_result(reply),
    }
}

/// 構造化JSONとしての解釈を試みる
///
/// isValid(bool)・confidence(number)・feedback(非空string)が揃わない
/// 応答は構造不正としてNoneを返す。
fn parse_structured(reply: &str) -> Option<ValidationResult> {
    let json_str = extract_json(reply).ok()?;
    let value: serde_json::Value = serde_json::from_str(json_str).ok()?;

    let is_valid = value.get("isValid")?.as_bool()?;
    let confidence = value.get("confidence")?.as_f64()?;
    let feedback = value.get("feedback")?.as_str()?.to_string();
    if feedback.is_empty() {
        return None;
    }

    let extracted_data = match value.get("extractedData") {
        Some(serde_json::Value::Null) | None => None,
        Some(data) => Some(data.clone()),
    };

    Some(ValidationResult {
        is_valid,
        confidence,
        feedback,
        extracted_data,
    })
}

/// テキスト走査による退避判定
///
/// 否定キーワード（invalid/fail/error）が無ければ有効とみなし、
/// 生応答の先頭200文字をfeedbackに転記する。
fn heuristic_result(reply: &str) -> ValidationResult {
    let lower = reply.to_lowercase();
    let is_valid =
        !lower.contains("invalid") && !lower.contains("fail") && !lower.contains("error");

    let feedback: String = reply.trim().chars().take(FEEDBACK_TRUNCATE_CHARS).collect();
    if feedback.is_empty() {
        return ValidationResult::fallback();
    }

    ValidationResult {
        is_valid,
        confidence: HEURISTIC_CONFIDENCE,
        feedback,
        extracted_data: None,
    }
}
