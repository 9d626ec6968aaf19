//! 対話式調査ウィザード
//!
//! ステップごとに指示と合格基準を提示し、写真の選択・AI検証・スキップ・
//! 後退・到達済みステップへの移動を受け付ける。セッションの更新はすべて
//! WizardController経由で行い、検証が解決するまで「この写真を使う」判断へ
//! 進めない。中断時は再開可能フィールドのみ保存する。

use crate::api::SurveyApi;
use crate::config::Config;
use crate::error::{Result, SurveyError};
use crate::photo_file::{self, PhotoFile};
use crate::scanner::{self, ImageInfo};
use crate::session_file::SessionFile;
use crate::validator::ValidationClient;
use dialoguer::{Confirm, Input, Select};
use home_survey_common::{
    assemble, is_valid_email, ImageHandle, StepDefinition, SurveySession, ValidationOutcome,
    ValidationResult, SURVEY_STEPS,
};
use home_survey_common::wizard::{WizardController, WizardStage};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct RunOptions {
    pub folder: PathBuf,
    pub customer: Option<String>,
    pub fresh: bool,
    pub no_validate: bool,
    pub verbose: bool,
}

/// ステップ画面での操作
enum StepAction {
    /// 写真を選択して検証にかける
    Capture,
    /// このステップをスキップ（条件付きステップのみ）
    Skip,
    /// 前のステップへ戻る
    Back,
    /// 到達済みステップへ移動
    Jump,
    /// 保存して終了
    Quit,
}

/// レビュー画面での操作
enum ReviewAction {
    Submit,
    Edit,
    Quit,
}

/// ウィザード本体
pub async fn run_survey(config: &Config, options: RunOptions) -> Result<()> {
    let images = scanner::scan_folder(&options.folder)?;
    if images.is_empty() {
        return Err(SurveyError::NoImagesFound(options.folder.display().to_string()));
    }
    println!("✔ {} photo file(s) found in {}\n", images.len(), options.folder.display());

    // 保存済みセッションの再開（画像バイトは保存されないため写真は再選択）
    let session = if options.fresh {
        SurveySession::new()
    } else {
        match SessionFile::load(&options.folder) {
            Some(saved) => {
                println!(
                    "Resuming saved session from {} (photos must be re-captured).",
                    saved.saved_at.format("%Y-%m-%d %H:%M")
                );
                SurveySession::from_resumable(saved.session)
            }
            None => SurveySession::new(),
        }
    };

    let mut controller = WizardController::new(session);

    if let Some(customer) = &options.customer {
        controller.session_mut().set_customer_email(customer);
    }

    let validator = if options.no_validate {
        None
    } else {
        Some(ValidationClient::from_config(config)?.with_verbose(options.verbose))
    };

    loop {
        match controller.stage() {
            WizardStage::Home => {
                ensure_customer_email(&mut controller)?;
                controller.begin();
            }
            WizardStage::Step(_) => {
                let quit = step_screen(&mut controller, &images, config, &validator, &options)
                    .await?;
                if quit {
                    save_and_exit(&controller, &options.folder)?;
                    return Ok(());
                }
            }
            WizardStage::Review => {
                match review_screen(&mut controller, config, &options).await? {
                    ReviewOutcome::Submitted => {
                        SessionFile::clear(&options.folder)?;
                        controller.session_mut().reset();
                        return Ok(());
                    }
                    ReviewOutcome::Quit => {
                        save_and_exit(&controller, &options.folder)?;
                        return Ok(());
                    }
                    ReviewOutcome::Continue => {}
                }
            }
            WizardStage::NotFound => {
                // 回復可能: セッションは壊れていないので保存位置へ戻る
                println!("⚠ Step not found. Returning to the survey.");
                controller.begin();
            }
        }
    }
}

fn ensure_customer_email(controller: &mut WizardController) -> Result<()> {
    if is_valid_email(controller.session().customer_email()) {
        return Ok(());
    }

    println!("🏠 home-survey - guided photo survey\n");
    loop {
        let email: String = Input::new()
            .with_prompt("Customer email")
            .interact_text()
            .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

        if is_valid_email(email.trim()) {
            controller.session_mut().set_customer_email(email.trim());
            return Ok(());
        }
        println!("⚠ Please enter a valid email address (like name@example.com).");
    }
}

/// ステップ画面。trueを返したら保存して終了。
async fn step_screen(
    controller: &mut WizardController,
    images: &[ImageInfo],
    config: &Config,
    validator: &Option<ValidationClient>,
    options: &RunOptions,
) -> Result<bool> {
    let Some(step) = controller.current_step() else {
        // カタログ範囲外の位置（壊れた保存データ）からの回復
        controller.session_mut().set_current_step_index(0);
        controller.begin();
        return Ok(false);
    };

    let (current, total) = controller.progress();
    println!("\n[{}/{}] {}", current + 1, total, step.title);
    println!("  {}", step.instruction);
    println!("  Checks:");
    for check in step.validation_checks {
        println!("    - {}", check);
    }
    if controller.session().is_completed(step.id) {
        println!("  (already captured; selecting a new photo replaces it)");
    }
    if controller.session().is_skipped(step.id) {
        println!("  (currently skipped)");
    }

    match prompt_step_action(step)? {
        StepAction::Capture => {
            let Some(photo) = pick_photo_file(images, config)? else {
                return Ok(false);
            };
            capture_and_validate(controller, step, photo, validator, options).await?;
        }
        StepAction::Skip => {
            match controller.skip_step(step.id) {
                Ok(()) => println!("  → skipped"),
                Err(e) => println!("⚠ {}", e),
            }
        }
        StepAction::Back => {
            controller.go_back(step.id)?;
        }
        StepAction::Jump => {
            prompt_jump(controller)?;
        }
        StepAction::Quit => return Ok(true),
    }

    Ok(false)
}

fn prompt_step_action(step: &StepDefinition) -> Result<StepAction> {
    let prompt = if step.is_conditional {
        "Action ([Enter]=choose photo s:skip b:back j:jump q:save & quit)"
    } else {
        "Action ([Enter]=choose photo b:back j:jump q:save & quit)"
    };

    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    match input.trim() {
        "" | "c" => Ok(StepAction::Capture),
        // 条件なしステップの "s" はコントローラ側で拒否される（黙殺しない）
        "s" => Ok(StepAction::Skip),
        "b" => Ok(StepAction::Back),
        "j" => Ok(StepAction::Jump),
        "q" | "Q" => Ok(StepAction::Quit),
        _ => Ok(StepAction::Capture),
    }
}

fn pick_photo_file(images: &[ImageInfo], config: &Config) -> Result<Option<PhotoFile>> {
    let mut items: Vec<&str> = images.iter().map(|i| i.file_name.as_str()).collect();
    items.push("(cancel)");

    let choice = Select::new()
        .with_prompt("Choose a photo file")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    if choice == images.len() {
        return Ok(None);
    }

    match photo_file::load_photo(&images[choice].path, config.max_image_size) {
        Ok(photo) => Ok(Some(photo)),
        Err(e) => {
            println!("⚠ Could not load photo: {}", e);
            Ok(None)
        }
    }
}

/// 写真を検証し、ユーザーの採否を経てセッションへ登録する
///
/// 検証が解決するまで採否の判断へは進まない。破棄された場合、検証結果は
/// どこにも適用されない。
async fn capture_and_validate(
    controller: &mut WizardController,
    step: &StepDefinition,
    photo: PhotoFile,
    validator: &Option<ValidationClient>,
    options: &RunOptions,
) -> Result<()> {
    let outcome = match validator {
        Some(client) => {
            let spinner = validation_spinner();
            let outcome = client.validate(&photo.bytes, step.photo_type).await;
            spinner.finish_and_clear();
            outcome
        }
        None => ValidationOutcome::Fallback(ValidationResult::fallback()),
    };

    show_validation(outcome.result());

    let use_photo = Confirm::new()
        .with_prompt("Use this photo?")
        .default(true)
        .interact()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    if !use_photo {
        // 撮影破棄: 検証結果も捨てる
        println!("  → discarded, choose another photo");
        return Ok(());
    }

    let preview = photo.file_name.clone();
    controller.capture_photo(step.id, ImageHandle::Memory(photo.bytes), preview)?;
    let result = outcome.into_result();

    // 主開閉器はアンペア数の確認まで行う
    if step.photo_type.needs_data_extraction() {
        confirm_amperage(controller, &result, options)?;
    }

    controller.apply_validation(step.photo_type, result);
    Ok(())
}

fn show_validation(result: &ValidationResult) {
    let mark = if result.is_valid { "✔" } else { "⚠" };
    println!(
        "  {} {} (confidence {:.0}%)",
        mark,
        result.feedback,
        result.confidence * 100.0
    );
}

fn confirm_amperage(
    controller: &mut WizardController,
    result: &ValidationResult,
    options: &RunOptions,
) -> Result<()> {
    if let Some(amperage) = result.extracted_amperage() {
        let accept = Confirm::new()
            .with_prompt(format!("Detected main disconnect amperage: {}A. Is this correct?", amperage))
            .default(true)
            .interact()
            .map_err(|e| SurveyError::CliExecution(e.to_string()))?;
        if accept {
            controller
                .session_mut()
                .set_main_disconnect_amperage(i64::from(amperage))?;
            return Ok(());
        }
    } else if options.verbose {
        println!("  [amperage] 抽出データなし、手入力へ");
    }

    loop {
        let input: String = Input::new()
            .with_prompt("Enter the amperage number (e.g. 100, 150, 200; empty to leave unset)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        match trimmed.parse::<i64>() {
            Ok(value) => match controller.session_mut().set_main_disconnect_amperage(value) {
                Ok(()) => return Ok(()),
                Err(e) => println!("⚠ {}", e),
            },
            Err(_) => println!("⚠ Please enter a whole number."),
        }
    }
}

fn prompt_jump(controller: &mut WizardController) -> Result<()> {
    let furthest = controller.session().furthest_step_index();
    let items: Vec<String> = SURVEY_STEPS
        .iter()
        .take(furthest + 1)
        .enumerate()
        .map(|(i, step)| {
            let status = if controller.session().is_completed(step.id) {
                "✔"
            } else if controller.session().is_skipped(step.id) {
                "skip"
            } else {
                " "
            };
            format!("[{}] {} {}", i + 1, step.title, status)
        })
        .collect();

    let choice = Select::new()
        .with_prompt("Jump to step")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    controller.jump_to(choice);
    Ok(())
}

enum ReviewOutcome {
    Submitted,
    Quit,
    Continue,
}

/// レビュー・提出画面
async fn review_screen(
    controller: &mut WizardController,
    config: &Config,
    options: &RunOptions,
) -> Result<ReviewOutcome> {
    let session = controller.session();
    println!("\n📋 Review Survey Data");
    println!("  Customer: {}", session.customer_email());
    println!(
        "  Photos captured: {} / {} required",
        session.complete_photo_count(),
        controller.required_photo_count()
    );

    for step in SURVEY_STEPS {
        if let Some(photo) = session.photo(step.photo_type) {
            let status = match &photo.validation {
                Some(v) if v.is_valid => format!("✔ {:.0}%", v.confidence * 100.0),
                Some(v) => format!("⚠ {:.0}% {}", v.confidence * 100.0, v.feedback),
                None => "(not validated)".to_string(),
            };
            println!("    {}: {} {}", step.title, photo.preview, status);
        } else if session.is_skipped(step.id) {
            println!("    {}: skipped", step.title);
        } else {
            println!("    {}: missing", step.title);
        }
    }
    if let Some(amperage) = session.main_disconnect_amperage() {
        println!("  Main disconnect amperage: {}A", amperage);
    }

    if !controller.submission_ready() {
        println!(
            "⚠ {} more photo(s) needed before submission.",
            controller
                .required_photo_count()
                .saturating_sub(session.complete_photo_count())
        );
    }

    match prompt_review_action(controller.submission_ready())? {
        ReviewAction::Submit => {
            if submit_survey(controller, config, options).await? {
                Ok(ReviewOutcome::Submitted)
            } else {
                Ok(ReviewOutcome::Continue)
            }
        }
        ReviewAction::Edit => {
            prompt_edit(controller)?;
            Ok(ReviewOutcome::Continue)
        }
        ReviewAction::Quit => Ok(ReviewOutcome::Quit),
    }
}

fn prompt_review_action(ready: bool) -> Result<ReviewAction> {
    let prompt = if ready {
        "Action ([Enter]=submit e:edit a step q:save & quit)"
    } else {
        "Action (e:edit a step q:save & quit)"
    };

    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    match input.trim() {
        "" if ready => Ok(ReviewAction::Submit),
        "e" => Ok(ReviewAction::Edit),
        "q" | "Q" => Ok(ReviewAction::Quit),
        _ => Ok(ReviewAction::Edit),
    }
}

fn prompt_edit(controller: &mut WizardController) -> Result<()> {
    let items: Vec<&str> = SURVEY_STEPS.iter().map(|step| step.title).collect();
    let choice = Select::new()
        .with_prompt("Edit which step?")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;

    controller.begin_editing(SURVEY_STEPS[choice].id)?;
    Ok(())
}

/// 提出フロー。成功したらtrue。
///
/// 失敗してもセッションは保持され、もう一度提出を試せる。
async fn submit_survey(
    controller: &mut WizardController,
    config: &Config,
    options: &RunOptions,
) -> Result<bool> {
    let notes: String = Input::new()
        .with_prompt("Notes for the office (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| SurveyError::CliExecution(e.to_string()))?;
    let notes = if notes.trim().is_empty() {
        None
    } else {
        Some(notes.trim().to_string())
    };

    let payload = match assemble(controller.session(), None, notes) {
        Ok(payload) => payload,
        Err(e) => {
            println!("⚠ {}", e);
            return Ok(false);
        }
    };

    let api = SurveyApi::from_config(config)?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Uploading photos and submitting survey...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    match api.submit_payload(payload).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("✅ Survey submitted. ID: {}", response.survey_id);
            Ok(true)
        }
        Err(e) => {
            spinner.finish_and_clear();
            // 1つの提出エラーとして報告し、ローカル状態は保持する
            println!("⚠ Submission failed: {}", e);
            println!("  Your captured data is kept; you can retry.");
            if options.verbose {
                eprintln!("  [submit] {:?}", e);
            }
            Ok(false)
        }
    }
}

fn validation_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Validating photo...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn save_and_exit(controller: &WizardController, folder: &Path) -> Result<()> {
    SessionFile::save(folder, &controller.session().to_resumable())?;
    println!("\n✓ Session saved. Run the same command to resume.");
    Ok(())
}
