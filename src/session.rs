//! OOTD記録セッション
//!
//! 写真1枚のパイプライン実行を状態機械として管理する:
//!
//! `Idle → AwaitingInference → CandidatesReady → Selecting → Persisting → Idle`
//!
//! 推論エラーはIdleへ、永続化エラーはCandidatesReadyへ戻る
//! （推論をやり直さずに選択・保存を再試行できる）。
//! 状態を跨いで変化するのはSelectionStateのみで、await間の操作は
//! 単一タスクの対話ループからしか行われない。

use crate::error::{ClosetError, Result};
use crate::inference::Segmenter;
use crate::orchestrator::{PersistenceOrchestrator, PersistenceOutcome};
use crate::selection::SelectionState;
use ai_closet_common::CandidateItem;

/// パイプラインの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingInference,
    CandidatesReady,
    Selecting,
    Persisting,
}

pub struct OotdSession {
    segmenter: Box<dyn Segmenter>,
    orchestrator: PersistenceOrchestrator,
    selection: SelectionState,
    image_uri: Option<String>,
    phase: SessionPhase,
}

impl OotdSession {
    pub fn new(segmenter: Box<dyn Segmenter>, orchestrator: PersistenceOrchestrator) -> Self {
        Self {
            segmenter,
            orchestrator,
            selection: SelectionState::new(),
            image_uri: None,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn candidates(&self) -> &[CandidateItem] {
        self.selection.candidates()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// 写真を解析して候補を得る
    ///
    /// 成功すると全候補が選択された状態でCandidatesReadyになる。
    /// 失敗（推論・パース）はIdleへ戻してそのまま返す。
    pub async fn process_image(
        &mut self,
        image_uri: &str,
        image_bytes: &[u8],
    ) -> Result<&[CandidateItem]> {
        self.phase = SessionPhase::AwaitingInference;

        match self.segmenter.segment(image_bytes).await {
            Ok(items) => {
                self.selection.initialize_from(items);
                self.image_uri = Some(image_uri.to_string());
                self.phase = SessionPhase::CandidatesReady;
                Ok(self.selection.candidates())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// 候補の選択状態を反転する
    pub fn toggle(&mut self, id: &str) {
        if matches!(
            self.phase,
            SessionPhase::CandidatesReady | SessionPhase::Selecting
        ) {
            self.selection.toggle(id);
            self.phase = SessionPhase::Selecting;
        }
    }

    /// 選択中の候補をワードローブへ保存する
    ///
    /// 成功するとセッションはリセットされIdleへ戻る。
    /// 失敗（EmptySelection・Persistence）はCandidatesReadyへ戻り、
    /// 候補と選択はそのまま残る。
    pub async fn save_selected(&mut self) -> Result<PersistenceOutcome> {
        let image_uri = match &self.image_uri {
            Some(uri) => uri.clone(),
            None => return Err(ClosetError::NoPhoto),
        };

        self.phase = SessionPhase::Persisting;

        let result = self
            .orchestrator
            .persist_selected(
                self.selection.candidates(),
                self.selection.current_selection(),
                &image_uri,
            )
            .await;

        match result {
            Ok(outcome) => {
                self.reset();
                Ok(outcome)
            }
            Err(e) => {
                self.phase = SessionPhase::CandidatesReady;
                Err(e)
            }
        }
    }

    /// 候補・選択・写真をすべて破棄してIdleへ戻す
    pub fn reset(&mut self) {
        self.selection.reset();
        self.image_uri = None;
        self.phase = SessionPhase::Idle;
    }
}
