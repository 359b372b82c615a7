//! 候補アイテムの選択状態
//!
//! 直近のセグメンテーション結果と、そのうちユーザーが保存したいidの集合を
//! 保持する。選択集合は常に保持中の候補id集合の部分集合になる（構造上の不変条件）。

use ai_closet_common::CandidateItem;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    candidates: Vec<CandidateItem>,
    selected: HashSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 候補を差し替え、全選択状態で初期化する
    pub fn initialize_from(&mut self, candidates: Vec<CandidateItem>) {
        self.selected = candidates.iter().map(|c| c.id.clone()).collect();
        self.candidates = candidates;
    }

    /// idの選択状態を反転する
    ///
    /// 保持中の候補にないidは無視する（エラーにしない）。
    pub fn toggle(&mut self, id: &str) {
        if !self.candidates.iter().any(|c| c.id == id) {
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// 現在選択中のid集合
    pub fn current_selection(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// 保持中の候補一覧
    pub fn candidates(&self) -> &[CandidateItem] {
        &self.candidates
    }

    /// 選択中の候補だけを順序を保って返す
    pub fn selected_candidates(&self) -> Vec<&CandidateItem> {
        self.candidates
            .iter()
            .filter(|c| self.selected.contains(&c.id))
            .collect()
    }

    /// 候補と選択の両方をクリアする
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.selected.clear();
    }
}
