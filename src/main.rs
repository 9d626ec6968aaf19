use clap::Parser;
use home_survey_rust::{cli, config, error, photo_file, runner, session_file, validator};

use cli::{Cli, Commands};
use config::Config;
use error::Result;
use home_survey_common::PhotoType;
use runner::RunOptions;
use session_file::SessionFile;
use std::str::FromStr;
use validator::ValidationClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run { folder, customer, fresh, no_validate } => {
            println!("📸 home-survey - guided photo survey\n");
            runner::run_survey(
                &config,
                RunOptions {
                    folder,
                    customer,
                    fresh,
                    no_validate,
                    verbose: cli.verbose,
                },
            )
            .await?;
        }

        Commands::Validate { image, photo_type } => {
            // 未知の写真種別は外部呼び出しの前に拒否する
            let photo_type = PhotoType::from_str(&photo_type)?;

            println!("🔍 home-survey - single photo validation\n");
            let photo = photo_file::load_photo(&image, config.max_image_size)?;
            if cli.verbose {
                println!("  画像サイズ: {} bytes", photo.bytes.len());
            }

            let client = ValidationClient::from_config(&config)?.with_verbose(cli.verbose);
            let outcome = client.validate(&photo.bytes, photo_type).await;

            if outcome.is_fallback() {
                println!("⚠ validation service unavailable, fallback result:\n");
            }
            println!("{}", serde_json::to_string_pretty(outcome.result())?);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  検証エンドポイント: {}", config.base_url);
                println!("  モデル: {}", config.model);
                println!("  調査API: {}", config.survey_api_url);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Session { folder, clear } => {
            let target = folder.unwrap_or_else(|| std::path::PathBuf::from("."));

            if clear {
                match SessionFile::clear(&target) {
                    Ok(true) => println!("✔ セッションを削除しました"),
                    Ok(false) => println!("保存済みセッションはありません"),
                    Err(e) => println!("セッション削除エラー: {}", e),
                }
            } else {
                match SessionFile::load(&target) {
                    Some(saved) => {
                        println!("保存済みセッション:");
                        println!("  保存時刻: {}", saved.saved_at.format("%Y-%m-%d %H:%M:%S"));
                        println!("  顧客: {}", saved.session.customer_email);
                        println!(
                            "  位置: {} / 到達済み: {}",
                            saved.session.current_step_index, saved.session.furthest_step_index
                        );
                        println!("  完了: {}件", saved.session.completed_step_ids.len());
                        println!("  スキップ: {}件", saved.session.skipped_step_ids.len());
                    }
                    None => println!("保存済みセッションはありません: {}", target.display()),
                }
            }
        }
    }

    Ok(())
}
