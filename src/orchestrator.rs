//! 永続化オーケストレーター
//!
//! 選択済みの候補アイテムをClothingRecordへ変換し、外部ストアへの保存を
//! 並行に発行して結果を集約する。
//!
//! 完了ポリシー: 全件の決着を待つ（先行の失敗で中断しない）。
//! - SaveReportのwarnings（軽微な失敗）はログに残すだけで致命にしない
//! - 保存自体のErr・タイムアウトはハードエラーで、全件決着後に
//!   Persistenceエラーとして未確定レコードの一覧を返す
//! - 確定済みの保存はロールバックしない

use crate::error::{ClosetError, Result};
use crate::wardrobe::{ClothingRecord, SaveReport, WardrobeStore};
use ai_closet_common::CandidateItem;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 保存1件の決着結果
#[derive(Debug)]
pub enum SaveStatus {
    /// 保存成立（warningsを含みうる）
    Saved { report: SaveReport },
    /// 保存不成立（ストアのエラーまたはタイムアウト）
    Failed { error: String },
}

/// レコード1件分の結果
#[derive(Debug)]
pub struct ItemResult {
    pub record_id: String,
    pub notes: String,
    pub status: SaveStatus,
}

impl ItemResult {
    pub fn is_saved(&self) -> bool {
        matches!(self.status, SaveStatus::Saved { .. })
    }
}

/// バッチ全体の結果（全件保存成立時のみ返る）
#[derive(Debug)]
pub struct PersistenceOutcome {
    pub items: Vec<ItemResult>,
}

impl PersistenceOutcome {
    pub fn saved_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_saved()).count()
    }
}

pub struct PersistenceOrchestrator {
    store: Arc<dyn WardrobeStore>,
    save_timeout: Duration,
}

impl PersistenceOrchestrator {
    pub fn new(store: Arc<dyn WardrobeStore>, save_timeout: Duration) -> Self {
        Self {
            store,
            save_timeout,
        }
    }

    /// 選択された候補を並行保存する
    ///
    /// # Arguments
    /// * `candidates` - 直近のセグメンテーション結果
    /// * `selection` - 保存対象の候補id集合
    /// * `image_uri` - 元写真のURI
    ///
    /// # Returns
    /// * `Ok(PersistenceOutcome)` - 全件の保存が成立
    /// * `Err(EmptySelection)` - 対象が空（ストアは呼ばれない）
    /// * `Err(Persistence)` - 1件以上が不成立（未確定レコードidを保持）
    pub async fn persist_selected(
        &self,
        candidates: &[CandidateItem],
        selection: &HashSet<String>,
        image_uri: &str,
    ) -> Result<PersistenceOutcome> {
        let chosen: Vec<&CandidateItem> = candidates
            .iter()
            .filter(|c| selection.contains(&c.id))
            .collect();

        if chosen.is_empty() {
            return Err(ClosetError::EmptySelection);
        }

        let now = Utc::now();
        let records: Vec<ClothingRecord> = chosen
            .iter()
            .map(|c| {
                ClothingRecord::from_candidate(c, image_uri, Uuid::new_v4().to_string(), now)
            })
            .collect();

        tracing::debug!(count = records.len(), "保存バッチ開始");

        // 全件を並行発行し、先行の失敗があっても全ての決着を待つ
        let saves = records
            .into_iter()
            .map(|record| self.save_one(image_uri, record));
        let items = join_all(saves).await;

        let failed: Vec<String> = items
            .iter()
            .filter(|i| !i.is_saved())
            .map(|i| i.record_id.clone())
            .collect();

        if !failed.is_empty() {
            tracing::warn!(
                failed = failed.len(),
                total = items.len(),
                "保存バッチに未確定レコードあり"
            );
            return Err(ClosetError::Persistence { failed });
        }

        tracing::debug!(count = items.len(), "保存バッチ完了");
        Ok(PersistenceOutcome { items })
    }

    /// 1件保存し、結果を決着値に変換する（panicさせない）
    async fn save_one(&self, image_uri: &str, record: ClothingRecord) -> ItemResult {
        let record_id = record.id.clone();
        let notes = record.notes.clone();

        let save = self.store.add_item_from_image(image_uri, record);
        let status = match tokio::time::timeout(self.save_timeout, save).await {
            Ok(Ok(report)) => {
                if report.background_removed {
                    tracing::debug!(record_id = %record_id, "背景除去完了");
                }
                if report.categorized {
                    tracing::debug!(record_id = %record_id, "分類完了");
                }
                for warning in &report.warnings {
                    tracing::warn!(record_id = %record_id, warning = %warning, "保存時の軽微なエラー");
                }
                SaveStatus::Saved { report }
            }
            Ok(Err(e)) => {
                tracing::warn!(record_id = %record_id, error = %e, "保存失敗");
                SaveStatus::Failed {
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::warn!(record_id = %record_id, "保存タイムアウト");
                SaveStatus::Failed {
                    error: format!("timeout after {:?}", self.save_timeout),
                }
            }
        };

        ItemResult {
            record_id,
            notes,
            status,
        }
    }
}
