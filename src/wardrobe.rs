//! ワードローブ永続化の境界
//!
//! - ClothingRecord: 保存する衣類レコード（候補アイテムから導出）
//! - WardrobeStore: 外部ストアへのシーム。保存の付随処理（背景除去・分類）の
//!   完了状況と軽微な失敗は、コールバックではなくSaveReportとして返す。

use ai_closet_common::CandidateItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 永続化される衣類レコード
///
/// 候補アイテム1件から保存時に1件だけ導出される。保存呼び出し以降の
/// 所有権は外部ストアにある。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingRecord {
    /// 新規採番されるid（候補アイテムのidとは独立）
    pub id: String,
    pub image_uri: String,
    pub category: String,
    pub subcategory: String,
    pub color: String,
    pub season: String,
    pub occasion: String,
    /// 候補アイテムのdescriptionをそのまま引き継ぐ
    pub notes: String,
    /// [色, 季節, 場面]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub wear_history: Vec<DateTime<Utc>>,
    pub favorite: bool,
}

impl ClothingRecord {
    /// ベースラインのレコードを生成する純粋コンストラクタ
    ///
    /// id・タイムスタンプは呼び出し側が供給する（共有テンプレートを持たない）。
    pub fn new(id: String, image_uri: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            image_uri,
            category: String::new(),
            subcategory: String::new(),
            color: String::new(),
            season: String::new(),
            occasion: String::new(),
            notes: String::new(),
            tags: Vec::new(),
            created_at,
            wear_history: Vec::new(),
            favorite: false,
        }
    }

    /// 候補アイテムの分類フィールドをマージしたレコードを生成する
    pub fn from_candidate(
        candidate: &CandidateItem,
        image_uri: &str,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::new(id, image_uri.to_string(), created_at);
        record.category = candidate.category.clone();
        record.subcategory = candidate.subcategory.clone();
        record.color = candidate.color.clone();
        record.season = candidate.season.clone();
        record.occasion = candidate.occasion.clone();
        record.notes = candidate.description.clone();
        record.tags = vec![
            candidate.color.clone(),
            candidate.season.clone(),
            candidate.occasion.clone(),
        ];
        record
    }
}

/// 保存1件の付随処理の結果
///
/// `warnings` はストアが報告した軽微な失敗。保存自体は成立しており、
/// 呼び出し側はログに残すだけでよい。
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    pub background_removed: bool,
    pub categorized: bool,
    pub warnings: Vec<String>,
}

/// ストア側のハードエラー（保存不成立）
#[derive(Error, Debug)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// 外部ワードローブストアへのシーム
///
/// 永続化形式・トランスポートはストア実装が所有する。
#[async_trait]
pub trait WardrobeStore: Send + Sync {
    /// 画像とレコードを1件保存する
    ///
    /// # Returns
    /// * `Ok(SaveReport)` - 保存成立（warningsを含みうる）
    /// * `Err(StoreError)` - 保存不成立
    async fn add_item_from_image(
        &self,
        image_uri: &str,
        record: ClothingRecord,
    ) -> std::result::Result<SaveReport, StoreError>;
}
