use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "home-survey")]
#[command(about = "住宅エネルギー調査向けガイド付き写真撮影・AI検証ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話ウィザードで調査を実施する
    Run {
        /// 撮影済み写真が入ったフォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 顧客メールアドレス（省略時は対話で入力）
        #[arg(short, long)]
        customer: Option<String>,

        /// 保存済みセッションがあっても無視して最初から始める
        #[arg(long)]
        fresh: bool,

        /// AI検証を行わずに写真を受け付ける（オフライン動作確認用）
        #[arg(long)]
        no_validate: bool,
    },

    /// 写真1枚を検証する
    Validate {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 写真種別（例: meter_closeup, main_disconnect_switch）
        #[arg(short, long, required = true)]
        photo_type: String,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 保存済みセッションの確認・削除
    Session {
        /// セッションフォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// 保存済みセッションを削除
        #[arg(long)]
        clear: bool,
    },
}
