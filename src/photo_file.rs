//! 写真ファイル読み込み
//!
//! 選択されたファイルを読み込み、検証・アップロードに使うJPEGバイト列へ
//! 整える。長辺が設定値を超える画像は縮小してから再エンコードする。

use crate::error::{Result, SurveyError};
use image::imageops::FilterType;
use std::io::Cursor;
use std::path::Path;

/// JPEG再エンコード品質
const JPEG_QUALITY: u8 = 80;

/// 読み込み済み写真
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    /// JPEGエンコード済みバイト列
    pub bytes: Vec<u8>,
}

/// 写真ファイルを読み込んでJPEGバイト列にする
///
/// # Arguments
/// * `path` - 画像ファイルのパス
/// * `max_dimension` - 長辺の最大ピクセル（超過時は縮小）
pub fn load_photo(path: &Path, max_dimension: u32) -> Result<PhotoFile> {
    if !path.exists() {
        return Err(SurveyError::FileNotFound(path.display().to_string()));
    }

    let img = image::open(path)
        .map_err(|e| SurveyError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        img
    };

    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    // アルファ付きPNGなどもJPEGにできるようRGB8へ落とす
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| SurveyError::ImageLoad(format!("JPEG encode failed: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(PhotoFile { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::tempdir;

    fn write_test_png(path: &Path, width: u32, height: u32) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        img.save(path).expect("テスト画像の保存失敗");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_photo(Path::new("/no/such/photo.jpg"), 1568);
        assert!(matches!(result, Err(SurveyError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let result = load_photo(&path, 1568);
        assert!(matches!(result, Err(SurveyError::ImageLoad(_))));
    }

    #[test]
    fn test_load_reencodes_to_jpeg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.png");
        write_test_png(&path, 64, 48);

        let photo = load_photo(&path, 1568).unwrap();
        assert_eq!(photo.file_name, "small.png");
        // JPEGマジックナンバー
        assert_eq!(&photo.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_load_downscales_large_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.png");
        write_test_png(&path, 800, 400);

        let photo = load_photo(&path, 200).unwrap();
        let decoded = image::load_from_memory(&photo.bytes).unwrap();
        // アスペクト比を保って長辺200以下
        assert!(decoded.width() <= 200);
        assert!(decoded.height() <= 200);
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 100);
    }
}
