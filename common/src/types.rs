//! 解析結果の型定義
//!
//! セグメンテーション／分類で共有される型:
//! - RawDetectedItem: AIレスポンス1要素のワイヤ形式（欠損フィールド許容）
//! - CandidateItem: 検証・補完済みの候補アイテム
//! - CandidateAttributes: 単品分類の結果（属性のみ）

use serde::{Deserialize, Serialize};

/// 画像内のおおよその位置（任意）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// AIレスポンスの1要素をそのまま受けるワイヤ型
///
/// すべてのフィールドが欠損しうるため全項目 `default`。
/// 検証ポリシー適用後に `CandidateItem` へ変換される。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDetectedItem {
    pub id: String,
    pub category: String,
    pub subcategory: String,
    pub color: String,
    pub season: String,
    pub occasion: String,
    pub description: String,
    pub bounding_box: Option<BoundingBox>,
}

/// 検出された服装候補1件
///
/// 1回のセグメンテーションレスポンスのパースでのみ生成され、以後不変。
/// idはレスポンス内で一意。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub id: String,
    pub category: String,
    pub subcategory: String,
    pub color: String,
    pub season: String,
    pub occasion: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// 単品分類の結果（id・説明・位置なし）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAttributes {
    pub category: String,
    pub subcategory: String,
    pub color: String,
    pub season: String,
    pub occasion: String,
}
