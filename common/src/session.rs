//! 調査セッション状態
//!
//! ウィザードの単一の真実源。フィールドは非公開にし、すべての更新を
//! 操作メソッド経由にすることで「スキップ済みと完了済みは同一ステップIDに
//! ついて常に排他」という不変条件を構成的に保つ。
//!
//! 再開可能フィールド（ResumableSession）とセッション限定フィールド
//! （撮影済み画像バイト）は明示的に分離する。リロード後は未提出写真の
//! 再撮影が必要になる。

use crate::error::{Error, Result};
use crate::types::{CapturedPhoto, ImageHandle, PhotoType, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 調査セッション
///
/// デバイスごとに1つだけ生成され、単一の書き手が操作する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveySession {
    current_step_index: usize,
    /// 到達済み最大ステップ位置（単調非減少）
    furthest_step_index: usize,
    customer_email: String,
    /// PhotoTypeごとに最大1枚
    photos: BTreeMap<PhotoType, CapturedPhoto>,
    skipped_step_ids: BTreeSet<String>,
    completed_step_ids: BTreeSet<String>,
    /// レビュー画面からの再編集中に設定される
    editing_step_id: Option<String>,
    main_disconnect_amperage: Option<u32>,
}

impl SurveySession {
    pub fn new() -> Self {
        Self::default()
    }

    // =============================================
    // 参照
    // =============================================

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn furthest_step_index(&self) -> usize {
        self.furthest_step_index
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn photos(&self) -> &BTreeMap<PhotoType, CapturedPhoto> {
        &self.photos
    }

    pub fn photo(&self, photo_type: PhotoType) -> Option<&CapturedPhoto> {
        self.photos.get(&photo_type)
    }

    /// 画像とプレビューが揃った写真の数（提出可否の判定に使う）
    pub fn complete_photo_count(&self) -> usize {
        self.photos.values().filter(|p| p.is_complete()).count()
    }

    pub fn skipped_step_ids(&self) -> &BTreeSet<String> {
        &self.skipped_step_ids
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<String> {
        &self.completed_step_ids
    }

    pub fn is_skipped(&self, step_id: &str) -> bool {
        self.skipped_step_ids.contains(step_id)
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_step_ids.contains(step_id)
    }

    pub fn editing_step_id(&self) -> Option<&str> {
        self.editing_step_id.as_deref()
    }

    pub fn main_disconnect_amperage(&self) -> Option<u32> {
        self.main_disconnect_amperage
    }

    // =============================================
    // 遷移操作
    // =============================================

    pub fn set_customer_email(&mut self, email: &str) {
        self.customer_email = email.to_string();
    }

    pub fn set_current_step_index(&mut self, index: usize) {
        self.current_step_index = index;
    }

    /// 写真を登録する
    ///
    /// 同一PhotoTypeの既存写真は置き換え。ステップは完了扱いになり、
    /// 以前のスキップは取り消される（撮影はスキップに優先する）。
    pub fn add_photo(
        &mut self,
        photo_type: PhotoType,
        image: ImageHandle,
        preview: String,
        step_id: &str,
    ) {
        self.photos.insert(
            photo_type,
            CapturedPhoto {
                photo_type,
                image,
                preview,
                validation: None,
            },
        );
        self.mark_completed(step_id);
    }

    /// 検証結果を既存写真に添付する
    ///
    /// 対応する写真が無ければ何もしない（撮影破棄後に届いた
    /// 遅延結果は捨てる）。適用されたかどうかを返す。
    pub fn update_validation(&mut self, photo_type: PhotoType, result: ValidationResult) -> bool {
        match self.photos.get_mut(&photo_type) {
            Some(photo) => {
                photo.validation = Some(result);
                true
            }
            None => false,
        }
    }

    /// ステップをスキップ済みにする（冪等）
    ///
    /// 完了済み集合からは取り除く。条件付きステップかどうかの確認は
    /// コントローラ側の責務。
    pub fn skip(&mut self, step_id: &str) {
        self.completed_step_ids.remove(step_id);
        self.skipped_step_ids.insert(step_id.to_string());
    }

    /// ステップを完了済みにする（冪等）
    pub fn mark_completed(&mut self, step_id: &str) {
        self.skipped_step_ids.remove(step_id);
        self.completed_step_ids.insert(step_id.to_string());
    }

    pub fn set_editing_step(&mut self, step_id: Option<&str>) {
        self.editing_step_id = step_id.map(|s| s.to_string());
    }

    /// 主開閉器のアンペア数を設定する
    ///
    /// 正の整数のみ受け付ける。
    pub fn set_main_disconnect_amperage(&mut self, amperage: i64) -> Result<()> {
        if amperage <= 0 {
            return Err(Error::InvalidValue(format!(
                "amperage must be a positive integer, got {}",
                amperage
            )));
        }
        let amperage = u32::try_from(amperage)
            .map_err(|_| Error::InvalidValue(format!("amperage out of range: {}", amperage)))?;
        self.main_disconnect_amperage = Some(amperage);
        Ok(())
    }

    /// 到達済み最大位置を更新する（単調、後退しない）
    pub fn advance_furthest(&mut self, index: usize) {
        self.furthest_step_index = self.furthest_step_index.max(index);
    }

    /// 初期状態へ戻す（提出成功後または明示的なクリア）
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // =============================================
    // 再開用スナップショット
    // =============================================

    /// 再開可能フィールドのスナップショットを取り出す
    ///
    /// 画像バイトは含まれない。
    pub fn to_resumable(&self) -> ResumableSession {
        ResumableSession {
            current_step_index: self.current_step_index,
            furthest_step_index: self.furthest_step_index,
            customer_email: self.customer_email.clone(),
            skipped_step_ids: self.skipped_step_ids.iter().cloned().collect(),
            completed_step_ids: self.completed_step_ids.iter().cloned().collect(),
            editing_step_id: self.editing_step_id.clone(),
            main_disconnect_amperage: self.main_disconnect_amperage,
        }
    }

    /// スナップショットからセッションを復元する
    ///
    /// 写真マップは空で始まる（リロード後は再撮影が必要）。保存データが
    /// 両集合に同じIDを含んでいた場合は完了を優先して排他性を回復する。
    pub fn from_resumable(resumable: ResumableSession) -> Self {
        let completed: BTreeSet<String> = resumable.completed_step_ids.into_iter().collect();
        let skipped: BTreeSet<String> = resumable
            .skipped_step_ids
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect();

        Self {
            current_step_index: resumable.current_step_index,
            furthest_step_index: resumable
                .furthest_step_index
                .max(resumable.current_step_index),
            customer_email: resumable.customer_email,
            photos: BTreeMap::new(),
            skipped_step_ids: skipped,
            completed_step_ids: completed,
            editing_step_id: resumable.editing_step_id,
            main_disconnect_amperage: resumable.main_disconnect_amperage,
        }
    }
}

/// 再開可能なセッションフィールド
///
/// リロードを跨いで保存される部分。画像バイトは意図的に含めない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumableSession {
    pub current_step_index: usize,
    pub furthest_step_index: usize,
    pub customer_email: String,
    pub skipped_step_ids: Vec<String>,
    pub completed_step_ids: Vec<String>,
    pub editing_step_id: Option<String>,
    pub main_disconnect_amperage: Option<u32>,
}
