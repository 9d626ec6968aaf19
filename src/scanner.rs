//! 写真フォルダスキャン
//!
//! 調査対象フォルダ直下から画像ファイルを列挙する。

use crate::error::{Result, SurveyError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(SurveyError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // ファイル名順で安定させる
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_nonexistent_folder() {
        let result = scan_folder(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(SurveyError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_empty_folder() {
        let dir = tempdir().expect("tempdir作成失敗");
        let result = scan_folder(dir.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_filters_non_images() {
        let dir = tempdir().expect("tempdir作成失敗");
        std::fs::write(dir.path().join("meter.jpg"), b"fake").unwrap();
        std::fs::write(dir.path().join("panel.PNG"), b"fake").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let images = scan_folder(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        // ファイル名順
        assert_eq!(images[0].file_name, "meter.jpg");
        assert_eq!(images[1].file_name, "panel.PNG");
    }

    #[test]
    fn test_scan_ignores_subfolders() {
        let dir = tempdir().expect("tempdir作成失敗");
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("deep.jpg"), b"fake").unwrap();
        std::fs::write(dir.path().join("top.jpg"), b"fake").unwrap();

        let images = scan_folder(dir.path()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name, "top.jpg");
    }
}
