//! APIレスポンスパーサー
//!
//! AIレスポンスの自由テキストからJSONを抽出し、検証ポリシーを適用して
//! 構造化された候補に変換する:
//! - extract_json_array / extract_json_object: 括弧対応を考慮した抽出
//! - parse_segmentation_response: 配列 → Vec<CandidateItem>
//! - parse_categorization_response: オブジェクト → CandidateAttributes
//!
//! 欠損フィールドの扱い（補完かエラーか）は呼び出し側がValidationPolicyで選ぶ。

use crate::error::{Error, Result};
use crate::types::{CandidateAttributes, CandidateItem, RawDetectedItem};
use std::collections::HashSet;

/// 欠損フィールドの検証ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// 欠損フィールドをデフォルト値で補完する
    Lenient,
    /// 欠損フィールドをParseエラーにする
    Strict,
}

/// Lenient時の補完値
pub const DEFAULT_CATEGORY: &str = "Tops";
pub const DEFAULT_SUBCATEGORY: &str = "T-Shirt";
pub const DEFAULT_COLOR: &str = "Unknown";
pub const DEFAULT_SEASON: &str = "All Season";
pub const DEFAULT_OCCASION: &str = "Casual";
pub const DEFAULT_DESCRIPTION: &str = "Clothing item from OOTD photo";

/// レスポンスからJSON配列部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック（中身が配列の場合）
/// 2. 最初の括弧対応が取れた `[...]` 部分
/// 3. エラー
///
/// # Arguments
/// * `response` - APIレスポンス文字列
///
/// # Returns
/// * `Ok(&str)` - 抽出されたJSON文字列
/// * `Err` - JSON配列が見つからない場合（生レスポンスを保持）
pub fn extract_json_array(response: &str) -> Result<&str> {
    extract(response, '[', ']')
        .ok_or_else(|| Error::parse("JSON配列が見つかりません", response))
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出ルールは`extract_json_array`と同じで、対象が `{...}` になる。
pub fn extract_json_object(response: &str) -> Result<&str> {
    extract(response, '{', '}')
        .ok_or_else(|| Error::parse("JSONオブジェクトが見つかりません", response))
}

fn extract(response: &str, open: char, close: char) -> Option<&str> {
    if let Some(fenced) = extract_fenced(response) {
        if fenced.starts_with(open) {
            return Some(fenced);
        }
    }
    extract_balanced(response, open, close)
}

/// ```json ... ``` ブロックの中身を取り出す
fn extract_fenced(response: &str) -> Option<&str> {
    let start_marker = response.find("```json")?;
    let start = start_marker + "```json".len();
    let end_offset = response[start..].find("```")?;
    Some(response[start..start + end_offset].trim())
}

/// 最初の開き括弧から、文字列リテラルを考慮して対応する閉じ括弧までを切り出す
fn extract_balanced(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in response[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                // closeはASCIIなので包含スライスで問題ない
                return Some(&response[start..=start + offset]);
            }
        }
    }
    None
}

/// セグメンテーションレスポンスをパース
///
/// JSON配列を抽出し、各要素をCandidateItemへ変換する。
/// idはモデル出力を信頼しない: 欠損または同一レスポンス内で重複していれば
/// `segmented_{run_id}_{index}` を合成する。
///
/// # Arguments
/// * `response` - APIレスポンス文字列
/// * `run_id` - 呼び出しごとに単調増加するカウンタ値
/// * `policy` - 欠損フィールドの検証ポリシー
///
/// # Returns
/// * `Ok(Vec<CandidateItem>)` - idがレスポンス内で一意な候補列
/// * `Err` - 配列が見つからない／パースできない／Strictで欠損がある場合
pub fn parse_segmentation_response(
    response: &str,
    run_id: u64,
    policy: ValidationPolicy,
) -> Result<Vec<CandidateItem>> {
    let json_str = extract_json_array(response)?;
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::parse(format!("JSONパースエラー: {}", e), response))?;
    let elements = value
        .as_array()
        .ok_or_else(|| Error::parse("JSON配列ではありません", response))?;

    let mut items = Vec::with_capacity(elements.len());
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, element) in elements.iter().enumerate() {
        let raw: RawDetectedItem = serde_json::from_value(element.clone())
            .map_err(|e| Error::parse(format!("要素{}が不正: {}", index, e), response))?;

        let id = if !raw.id.is_empty() && !seen_ids.contains(&raw.id) {
            raw.id
        } else {
            format!("segmented_{}_{}", run_id, index)
        };
        seen_ids.insert(id.clone());

        items.push(CandidateItem {
            id,
            category: resolve_field(raw.category, DEFAULT_CATEGORY, "category", policy, response)?,
            subcategory: resolve_field(
                raw.subcategory,
                DEFAULT_SUBCATEGORY,
                "subcategory",
                policy,
                response,
            )?,
            color: resolve_field(raw.color, DEFAULT_COLOR, "color", policy, response)?,
            season: resolve_field(raw.season, DEFAULT_SEASON, "season", policy, response)?,
            occasion: resolve_field(raw.occasion, DEFAULT_OCCASION, "occasion", policy, response)?,
            description: resolve_field(
                raw.description,
                DEFAULT_DESCRIPTION,
                "description",
                policy,
                response,
            )?,
            bounding_box: raw.bounding_box,
        });
    }

    Ok(items)
}

/// 単品分類レスポンスをパース
///
/// JSONオブジェクトを抽出し、CandidateAttributesへ変換する。
///
/// # Arguments
/// * `response` - APIレスポンス文字列
/// * `policy` - 欠損フィールドの検証ポリシー
///
/// # Returns
/// * `Ok(CandidateAttributes)` - 分類属性
/// * `Err` - オブジェクトが見つからない／パースできない／Strictで欠損がある場合
pub fn parse_categorization_response(
    response: &str,
    policy: ValidationPolicy,
) -> Result<CandidateAttributes> {
    let json_str = extract_json_object(response)?;
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::parse(format!("JSONパースエラー: {}", e), response))?;
    if !value.is_object() {
        return Err(Error::parse("JSONオブジェクトではありません", response));
    }

    let raw: RawDetectedItem = serde_json::from_value(value)
        .map_err(|e| Error::parse(format!("オブジェクトが不正: {}", e), response))?;

    Ok(CandidateAttributes {
        category: resolve_field(raw.category, DEFAULT_CATEGORY, "category", policy, response)?,
        subcategory: resolve_field(
            raw.subcategory,
            DEFAULT_SUBCATEGORY,
            "subcategory",
            policy,
            response,
        )?,
        color: resolve_field(raw.color, DEFAULT_COLOR, "color", policy, response)?,
        season: resolve_field(raw.season, DEFAULT_SEASON, "season", policy, response)?,
        occasion: resolve_field(raw.occasion, DEFAULT_OCCASION, "occasion", policy, response)?,
    })
}

/// ポリシーに従って欠損フィールドを解決する
fn resolve_field(
    value: String,
    default: &str,
    field: &'static str,
    policy: ValidationPolicy,
    response: &str,
) -> Result<String> {
    if !value.is_empty() {
        return Ok(value);
    }
    match policy {
        ValidationPolicy::Lenient => Ok(default.to_string()),
        ValidationPolicy::Strict => Err(Error::parse(
            format!("フィールドがありません: {}", field),
            response,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json_array テスト
    // =============================================

    #[test]
    fn test_extract_array_raw() {
        let response = r#"[{"category": "Tops"}]"#;
        let json = extract_json_array(response).unwrap();
        assert_eq!(json, r#"[{"category": "Tops"}]"#);
    }

    #[test]
    fn test_extract_array_with_surrounding_text() {
        let response = r#"Here is the result: [{"category": "Tops"}] and some more text."#;
        let json = extract_json_array(response).unwrap();
        assert_eq!(json, r#"[{"category": "Tops"}]"#);
    }

    #[test]
    fn test_extract_array_with_json_block() {
        let response = "Sure!\n```json\n[\n  {\"category\": \"Tops\"}\n]\n```\nLet me know.";
        let json = extract_json_array(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("Tops"));
    }

    #[test]
    fn test_extract_array_nested_structures() {
        let response = r#"[{"tags": ["a", "b"], "boundingBox": {"x": 1}}] trailing ] noise"#;
        let json = extract_json_array(response).unwrap();
        assert_eq!(json, r#"[{"tags": ["a", "b"], "boundingBox": {"x": 1}}]"#);
    }

    #[test]
    fn test_extract_array_brackets_inside_strings() {
        // 文字列中の括弧は対応判定に含めない
        let response = r#"[{"description": "sleeve [rolled up]"}]"#;
        let json = extract_json_array(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_array_error_keeps_response() {
        let response = "No JSON here, just plain text.";
        let err = extract_json_array(response).unwrap_err();
        match err {
            Error::Parse { response: raw, .. } => assert_eq!(raw, response),
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_extract_array_unbalanced() {
        let response = r#"broken: [{"category": "Tops""#;
        assert!(extract_json_array(response).is_err());
    }

    // =============================================
    // extract_json_object テスト
    // =============================================

    #[test]
    fn test_extract_object_with_surrounding_text() {
        let response = r#"The item is {"category": "Tops", "color": "Red"} as requested."#;
        let json = extract_json_object(response).unwrap();
        assert_eq!(json, r#"{"category": "Tops", "color": "Red"}"#);
    }

    #[test]
    fn test_extract_object_error() {
        assert!(extract_json_object("no braces at all").is_err());
    }

    // =============================================
    // parse_segmentation_response テスト
    // =============================================

    #[test]
    fn test_parse_segmentation_applies_defaults() {
        let response = r#"Here are items: [{"category":"Tops","color":"Red"}] thanks"#;

        let items = parse_segmentation_response(response, 1, ValidationPolicy::Lenient).unwrap();
        assert_eq!(items.len(), 1);
        // 指定されたフィールドはそのまま
        assert_eq!(items[0].category, "Tops");
        assert_eq!(items[0].color, "Red");
        // 欠損フィールドは補完
        assert_eq!(items[0].subcategory, "T-Shirt");
        assert_eq!(items[0].season, "All Season");
        assert_eq!(items[0].occasion, "Casual");
        assert_eq!(items[0].description, DEFAULT_DESCRIPTION);
        assert!(items[0].bounding_box.is_none());
    }

    #[test]
    fn test_parse_segmentation_preserves_supplied_fields() {
        let response = r#"[{
            "id": "model_1",
            "category": "Outerwear",
            "subcategory": "Coat",
            "color": "Navy",
            "season": "Winter",
            "occasion": "Work",
            "description": "ウールのロングコート",
            "boundingBox": { "x": 0.1, "y": 0.0, "width": 0.8, "height": 0.9 }
        }]"#;

        let items = parse_segmentation_response(response, 2, ValidationPolicy::Lenient).unwrap();
        assert_eq!(items[0].id, "model_1");
        assert_eq!(items[0].category, "Outerwear");
        assert_eq!(items[0].subcategory, "Coat");
        assert_eq!(items[0].description, "ウールのロングコート");
        assert!(items[0].bounding_box.is_some());
    }

    #[test]
    fn test_parse_segmentation_synthesizes_missing_ids() {
        let response = r#"[{"category": "Tops"}, {"category": "Bottoms"}]"#;

        let items = parse_segmentation_response(response, 7, ValidationPolicy::Lenient).unwrap();
        assert_eq!(items[0].id, "segmented_7_0");
        assert_eq!(items[1].id, "segmented_7_1");
    }

    #[test]
    fn test_parse_segmentation_ids_pairwise_distinct() {
        // モデルが同じidを繰り返しても一意になること
        let response = r#"[
            {"id": "dup", "category": "Tops"},
            {"id": "dup", "category": "Bottoms"},
            {"id": "dup", "category": "Shoes"}
        ]"#;

        let items = parse_segmentation_response(response, 3, ValidationPolicy::Lenient).unwrap();
        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_parse_segmentation_no_array_is_parse_error() {
        let response = "識別できませんでした";
        let err = parse_segmentation_response(response, 0, ValidationPolicy::Lenient).unwrap_err();
        match err {
            Error::Parse { response: raw, .. } => assert_eq!(raw, response),
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_parse_segmentation_invalid_json() {
        let response = "[{category: Tops}]"; // クォートなしはJSONではない
        assert!(parse_segmentation_response(response, 0, ValidationPolicy::Lenient).is_err());
    }

    #[test]
    fn test_parse_segmentation_empty_array() {
        let items = parse_segmentation_response("[]", 0, ValidationPolicy::Lenient).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_segmentation_strict_rejects_missing_fields() {
        let response = r#"[{"category": "Tops"}]"#;
        let result = parse_segmentation_response(response, 0, ValidationPolicy::Strict);
        assert!(result.is_err());
    }

    // =============================================
    // parse_categorization_response テスト
    // =============================================

    #[test]
    fn test_parse_categorization_complete_object() {
        let response = r#"Classification: {
            "category": "Shoes",
            "subcategory": "Sneakers",
            "color": "White",
            "season": "All Season",
            "occasion": "Sports"
        } done."#;

        let attrs = parse_categorization_response(response, ValidationPolicy::Strict).unwrap();
        assert_eq!(attrs.category, "Shoes");
        assert_eq!(attrs.subcategory, "Sneakers");
        assert_eq!(attrs.color, "White");
        assert_eq!(attrs.season, "All Season");
        assert_eq!(attrs.occasion, "Sports");
    }

    #[test]
    fn test_parse_categorization_strict_rejects_missing_field() {
        // occasionが欠けている
        let response = r#"{"category": "Shoes", "subcategory": "Sneakers", "color": "White", "season": "Summer"}"#;
        let result = parse_categorization_response(response, ValidationPolicy::Strict);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_categorization_lenient_fills_missing_field() {
        let response = r#"{"category": "Shoes", "subcategory": "Sneakers", "color": "White", "season": "Summer"}"#;
        let attrs = parse_categorization_response(response, ValidationPolicy::Lenient).unwrap();
        assert_eq!(attrs.occasion, "Casual");
    }

    #[test]
    fn test_parse_categorization_no_object() {
        let response = "plain text only";
        let err = parse_categorization_response(response, ValidationPolicy::Strict).unwrap_err();
        match err {
            Error::Parse { response: raw, .. } => assert_eq!(raw, response),
            _ => panic!("Expected Parse error"),
        }
    }
}
