//! セッション再開ファイル
//!
//! 再開可能フィールドのみを調査フォルダ直下のJSONへ保存する。画像バイトは
//! 保存しないため、リロード後は未提出写真の再撮影が必要になる。
//! 提出成功時または明示的なクリアで削除する。

use crate::error::Result;
use chrono::{DateTime, Utc};
use home_survey_common::ResumableSession;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const SESSION_FILE_NAME: &str = ".survey-session.json";

/// セッションファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 保存時刻
    pub saved_at: DateTime<Utc>,
    pub session: ResumableSession,
}

impl SessionFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn session_path(folder: &Path) -> PathBuf {
        folder.join(SESSION_FILE_NAME)
    }

    /// 保存済みセッションを読み込む
    ///
    /// ファイルが無い・読めない・バージョンが合わない場合はNone。
    /// 破損した保存データで調査を止めない。
    pub fn load(folder: &Path) -> Option<Self> {
        let path = Self::session_path(folder);
        if !path.exists() {
            return None;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return None,
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, SessionFile>(reader) {
            Ok(saved) => {
                if saved.version != Self::CURRENT_VERSION {
                    eprintln!("セッションファイルのバージョン不一致、無視します");
                    return None;
                }
                Some(saved)
            }
            Err(_) => {
                eprintln!("セッションファイルを読めません、無視します");
                None
            }
        }
    }

    /// セッションを保存する
    pub fn save(folder: &Path, session: &ResumableSession) -> Result<()> {
        let path = Self::session_path(folder);
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let saved = SessionFile {
            version: Self::CURRENT_VERSION,
            saved_at: Utc::now(),
            session: session.clone(),
        };
        serde_json::to_writer_pretty(writer, &saved)?;
        Ok(())
    }

    /// 保存済みセッションを削除する
    ///
    /// 削除したらtrue、存在しなければfalse。
    pub fn clear(folder: &Path) -> Result<bool> {
        let path = Self::session_path(folder);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_session() -> ResumableSession {
        ResumableSession {
            current_step_index: 3,
            furthest_step_index: 5,
            customer_email: "user@example.com".to_string(),
            skipped_step_ids: vec!["area-behind-fence".to_string()],
            completed_step_ids: vec!["meter-closeup".to_string(), "meter-area".to_string()],
            editing_step_id: None,
            main_disconnect_amperage: Some(150),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(SessionFile::load(dir.path()).is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let session = sample_session();
        SessionFile::save(dir.path(), &session).unwrap();

        let loaded = SessionFile::load(dir.path()).expect("読み込み失敗");
        assert_eq!(loaded.session, session);
    }

    #[test]
    fn test_load_ignores_wrong_version() {
        let dir = tempdir().unwrap();
        let json = r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "session": {}}"#;
        std::fs::write(SessionFile::session_path(dir.path()), json).unwrap();
        assert!(SessionFile::load(dir.path()).is_none());
    }

    #[test]
    fn test_load_ignores_corrupt_file() {
        let dir = tempdir().unwrap();
        std::fs::write(SessionFile::session_path(dir.path()), "{ broken").unwrap();
        assert!(SessionFile::load(dir.path()).is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        assert!(!SessionFile::clear(dir.path()).unwrap());

        SessionFile::save(dir.path(), &sample_session()).unwrap();
        assert!(SessionFile::clear(dir.path()).unwrap());
        assert!(SessionFile::load(dir.path()).is_none());
    }
}
