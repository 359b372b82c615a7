//! プロンプト生成モジュール
//!
//! セグメンテーション／単品分類で使用するプロンプトを生成する:
//! - build_segmentation_system_prompt: 写真全体から複数の服装候補を抽出
//! - build_categorization_system_prompt: 単品画像の属性分類
//!
//! 統制語彙は構造化データ（Vocabulary）として受け取り、ここで文字列化する。
//! 語彙の列挙とJSON抽出処理を混ぜないこと。

use crate::vocab::Vocabulary;

/// セグメンテーション用のユーザープロンプト
pub const SEGMENTATION_USER_PROMPT: &str = "Identify every clothing item in this \
photo and provide detailed classification for each item. Return the result as a \
JSON array only.";

/// 単品分類用のユーザープロンプト
pub const CATEGORIZATION_USER_PROMPT: &str = "Classify this clothing item and \
output its category, subcategory, color, season and occasion. Return the result \
as a JSON object only.";

/// セグメンテーション用システムプロンプト生成
///
/// 統制語彙を埋め込み、モデルの出力空間を制約する。
///
/// # Arguments
/// * `vocab` - 統制語彙
///
/// # Returns
/// システムプロンプト文字列
pub fn build_segmentation_system_prompt(vocab: &Vocabulary) -> String {
    let categories = vocab.categories_line();
    let colors = vocab.colors_line();
    let seasons = vocab.seasons_line();
    let occasions = vocab.occasions_line();

    format!(
        r#"You are a clothing recognition assistant. Identify every clothing item in the photo. For each detected item provide:
- category and subcategory (allowed: {categories})
- color (allowed: {colors})
- season (allowed: {seasons})
- occasion (allowed: {occasions})
- a detailed description
- its approximate position in the photo (optional)

Return the result as a JSON array, one object per item:
[{{
  "id": "unique_id",
  "category": "category",
  "subcategory": "subcategory",
  "color": "color",
  "season": "season",
  "occasion": "occasion",
  "description": "detailed description",
  "boundingBox": {{ "x": 0.0, "y": 0.0, "width": 0.0, "height": 0.0 }}
}}]

Output the JSON array only, with no explanatory text."#
    )
}

/// 単品分類用システムプロンプト生成
///
/// # Arguments
/// * `vocab` - 統制語彙
///
/// # Returns
/// システムプロンプト文字列
pub fn build_categorization_system_prompt(vocab: &Vocabulary) -> String {
    let categories = vocab.categories_line();
    let colors = vocab.colors_line();
    let seasons = vocab.seasons_line();
    let occasions = vocab.occasions_line();

    format!(
        r#"You are a clothing classification assistant. Classify the clothing item in the image.
Allowed categories and subcategories: {categories}.
Allowed colors: {colors}.
Allowed seasons: {seasons}.
Allowed occasions: {occasions}.
Output the best matching category, subcategory, color, season and occasion as JSON:
{{"category": "...", "subcategory": "...", "color": "...", "season": "...", "occasion": "..."}}"#
    )
}
