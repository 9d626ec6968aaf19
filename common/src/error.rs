//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Step not found: {0}")]
    StepNotFound(String),

    #[error("Unknown photo type: {0}")]
    UnknownPhotoType(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid customer email: {0}")]
    InvalidEmail(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
