//! AI Closet Core Library
//!
//! 服装写真のセグメンテーションからワードローブ登録までのパイプライン:
//! 1. SegmentationClient: 写真 → 候補アイテム列
//! 2. SelectionState: 保存対象の選択
//! 3. PersistenceOrchestrator: 選択済み候補の並行保存
//!
//! カメラ・画面描画・ストアの永続化形式は外部コラボレーターが所有する。

pub mod config;
pub mod error;
pub mod inference;
pub mod orchestrator;
pub mod selection;
pub mod session;
pub mod wardrobe;

pub use ai_closet_common as common;

pub use config::Config;
pub use error::{ClosetError, Result};
pub use inference::{CategorizationClient, SegmentationClient, Segmenter};
pub use orchestrator::{ItemResult, PersistenceOrchestrator, PersistenceOutcome, SaveStatus};
pub use selection::SelectionState;
pub use session::{OotdSession, SessionPhase};
pub use wardrobe::{ClothingRecord, SaveReport, StoreError, WardrobeStore};
