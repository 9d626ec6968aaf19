//! Home Survey Common Library
//!
//! CLIと各クライアントで共有される調査ウィザードの中核:
//! ステップカタログ、セッション状態、遷移制御、検証契約、提出ペイロード

pub mod assembler;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod session;
pub mod steps;
pub mod types;
pub mod wizard;

pub use assembler::{assemble, is_valid_email};
pub use error::{Error, Result};
pub use parser::{extract_json, parse_validation_reply};
pub use prompts::{build_validation_prompt, criteria_text};
pub use session::{ResumableSession, SurveySession};
pub use steps::{
    conditional_step_ids, index_of, next_step_id, previous_step_id, step_at, step_by_id,
    step_by_photo_type, step_count, step_progress, StepDefinition, SURVEY_STEPS,
};
pub use types::{
    CapturedPhoto, ImageHandle, PhotoEntry, PhotoType, SubmissionPayload, ValidationOutcome,
    ValidationResult,
};
pub use wizard::{WizardController, WizardStage};
