//! 調査データの型定義
//!
//! CLIと各クライアントで共有される型:
//! - PhotoType: 撮影対象の閉じた分類（11種）
//! - ValidationResult / ValidationOutcome: AI検証結果
//! - CapturedPhoto / ImageHandle: 撮影済み写真
//! - SubmissionPayload: 送信用ペイロード（アセンブラの出力）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 写真種別
///
/// 各ステップは必ず1つのPhotoTypeに対応し、検証基準との結合キーにもなる。
/// ワイヤ上はsnake_case文字列（例: "meter_closeup"）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoType {
    MeterCloseup,
    MeterAreaWide,
    MeterAreaRight,
    MeterAreaLeft,
    AdjacentWall,
    AreaBehindFence,
    AcUnitLabel,
    SecondAcUnitLabel,
    BreakerBoxInterior,
    MainDisconnectSwitch,
    BreakerBoxArea,
}

impl PhotoType {
    /// 全種別（カタログ順）
    pub const ALL: [PhotoType; 11] = [
        PhotoType::MeterCloseup,
        PhotoType::MeterAreaWide,
        PhotoType::MeterAreaRight,
        PhotoType::MeterAreaLeft,
        PhotoType::AdjacentWall,
        PhotoType::AreaBehindFence,
        PhotoType::AcUnitLabel,
        PhotoType::SecondAcUnitLabel,
        PhotoType::BreakerBoxInterior,
        PhotoType::MainDisconnectSwitch,
        PhotoType::BreakerBoxArea,
    ];

    /// ワイヤ表現（snake_case）
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::MeterCloseup => "meter_closeup",
            PhotoType::MeterAreaWide => "meter_area_wide",
            PhotoType::MeterAreaRight => "meter_area_right",
            PhotoType::MeterAreaLeft => "meter_area_left",
            PhotoType::AdjacentWall => "adjacent_wall",
            PhotoType::AreaBehindFence => "area_behind_fence",
            PhotoType::AcUnitLabel => "ac_unit_label",
            PhotoType::SecondAcUnitLabel => "second_ac_unit_label",
            PhotoType::BreakerBoxInterior => "breaker_box_interior",
            PhotoType::MainDisconnectSwitch => "main_disconnect_switch",
            PhotoType::BreakerBoxArea => "breaker_box_area",
        }
    }

    /// 構造化データ抽出の対象か（主開閉器のアンペア数のみ）
    pub fn needs_data_extraction(&self) -> bool {
        matches!(self, PhotoType::MainDisconnectSwitch)
    }
}

impl std::fmt::Display for PhotoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhotoType {
    type Err = Error;

    /// 未知の種別は外部呼び出し前に拒否する
    fn from_str(s: &str) -> Result<Self> {
        PhotoType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownPhotoType(s.to_string()))
    }
}

/// AI検証結果
///
/// confidenceは常に[0,1]（パーサー側でクランプ済み）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub confidence: f64,
    pub feedback: String,
    #[serde(default)]
    pub extracted_data: Option<serde_json::Value>,
}

impl ValidationResult {
    /// 検証サービス停止時の固定フォールバック結果
    ///
    /// 検証は助言であってゲートではないため、障害時も調査を止めない。
    pub fn fallback() -> Self {
        Self {
            is_valid: true,
            confidence: 0.5,
            feedback: "Validation service temporarily unavailable. Photo accepted for manual review."
                .to_string(),
            extracted_data: None,
        }
    }

    /// confidenceを[0,1]にクランプ
    pub fn clamp_confidence(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }

    /// extractedDataからアンペア数を取り出す
    ///
    /// AIは数値・文字列（"200" / "200A"）のどちらでも返しうるため両方受ける。
    /// 正の整数に解釈できない場合はNone。
    pub fn extracted_amperage(&self) -> Option<u32> {
        let data = self.extracted_data.as_ref()?.as_object()?;
        let value = data.get("amperage")?;

        if let Some(n) = value.as_u64() {
            return u32::try_from(n).ok().filter(|&n| n > 0);
        }
        if let Some(s) = value.as_str() {
            let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
            return digits.parse::<u32>().ok().filter(|&n| n > 0);
        }
        None
    }
}

/// 検証呼び出しの結果
///
/// 「常に解決する」契約を型で表す: 構造化レスポンスを解釈できた場合は
/// Validated、障害吸収時は同じ形のフォールバック結果を持つFallback。
/// どちらの変種も利用可能なValidationResultを運ぶ。
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Validated(ValidationResult),
    Fallback(ValidationResult),
}

impl ValidationOutcome {
    pub fn result(&self) -> &ValidationResult {
        match self {
            ValidationOutcome::Validated(r) | ValidationOutcome::Fallback(r) => r,
        }
    }

    pub fn into_result(self) -> ValidationResult {
        match self {
            ValidationOutcome::Validated(r) | ValidationOutcome::Fallback(r) => r,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ValidationOutcome::Fallback(_))
    }
}

/// 画像ハンドル
///
/// 撮影直後はメモリ上のバイト列、アップロード後はストレージキー。
/// 画像バイトはセッションの再開ファイルには保存しない。
#[derive(Debug, Clone, PartialEq)]
pub enum ImageHandle {
    /// 未アップロードのJPEGバイト列
    Memory(Vec<u8>),
    /// オブジェクトストレージ上のキー（例: "survey/tmp/..._meter_closeup.jpg"）
    Stored(String),
}

impl ImageHandle {
    pub fn is_empty(&self) -> bool {
        match self {
            ImageHandle::Memory(bytes) => bytes.is_empty(),
            ImageHandle::Stored(key) => key.is_empty(),
        }
    }
}

/// 撮影済み写真
///
/// 1調査につき同一PhotoTypeの写真は最大1枚。再撮影は置き換え。
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    pub photo_type: PhotoType,
    pub image: ImageHandle,
    /// 表示用参照（プレビューのパスやData URL）
    pub preview: String,
    /// 検証完了まではNone
    pub validation: Option<ValidationResult>,
}

impl CapturedPhoto {
    /// 画像とプレビューが揃っているか（提出可否の判定に使う）
    pub fn is_complete(&self) -> bool {
        !self.image.is_empty() && !self.preview.is_empty()
    }
}

/// 送信用ペイロードの写真エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoEntry {
    pub photo_type: PhotoType,
    pub image: ImageHandle,
    pub validation: Option<ValidationResult>,
}

/// 送信用ペイロード
///
/// アセンブラがセッションから一度だけ導出する。送信自体はAPIクライアントの仕事。
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub customer_email: String,
    /// カタログ順の写真エントリ
    pub photos: Vec<PhotoEntry>,
    pub skipped_step_ids: Vec<String>,
    pub main_disconnect_amperage: Option<u32>,
    pub geolocation: Option<String>,
    pub notes: Option<String>,
}
