//! 統制語彙モジュール
//!
//! 服装分類に使用する語彙（カテゴリ→サブカテゴリ、色、季節、場面）を管理する。
//! 語彙は設定データであり、プロンプト生成時にモデルの出力空間を制約するために
//! 埋め込まれる。JSONから差し替え可能。

use serde::{Deserialize, Serialize};

/// カテゴリとそのサブカテゴリ一覧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub subcategories: Vec<String>,
}

/// 統制語彙全体
///
/// カテゴリの列挙順はプロンプトにそのまま反映されるため、
/// 順序を保持するVecで持つ（HashMapにしない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub categories: Vec<CategoryGroup>,
    pub colors: Vec<String>,
    pub seasons: Vec<String>,
    pub occasions: Vec<String>,
}

impl Vocabulary {
    /// JSON文字列から読み込み
    pub fn from_json_str(content: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// カテゴリ名の一覧を取得
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|g| g.category.as_str()).collect()
    }

    /// 指定カテゴリのサブカテゴリ一覧を取得
    pub fn subcategories(&self, category: &str) -> Vec<&str> {
        self.categories
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.subcategories.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// プロンプト用の「カテゴリ: サブカテゴリ, ...」行を生成
    ///
    /// 例: `Tops: T-Shirt, Shirt; Bottoms: Jeans, Shorts`
    pub fn categories_line(&self) -> String {
        self.categories
            .iter()
            .map(|g| format!("{}: {}", g.category, g.subcategories.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn colors_line(&self) -> String {
        self.colors.join(", ")
    }

    pub fn seasons_line(&self) -> String {
        self.seasons.join(", ")
    }

    pub fn occasions_line(&self) -> String {
        self.occasions.join(", ")
    }
}

impl Default for Vocabulary {
    /// アプリ標準の語彙
    fn default() -> Self {
        let group = |category: &str, subs: &[&str]| CategoryGroup {
            category: category.to_string(),
            subcategories: subs.iter().map(|s| s.to_string()).collect(),
        };
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Vocabulary {
            categories: vec![
                group("Tops", &["T-Shirt", "Shirt", "Blouse", "Sweater", "Hoodie", "Tank Top"]),
                group("Bottoms", &["Jeans", "Trousers", "Shorts", "Skirt", "Leggings"]),
                group("Dresses", &["Casual Dress", "Formal Dress", "Maxi Dress"]),
                group("Outerwear", &["Jacket", "Coat", "Blazer", "Cardigan"]),
                group("Shoes", &["Sneakers", "Boots", "Sandals", "Heels", "Flats"]),
                group("Bags", &["Handbag", "Backpack", "Tote", "Crossbody"]),
                group("Accessories", &["Hat", "Scarf", "Belt", "Jewelry", "Sunglasses"]),
            ],
            colors: list(&[
                "Black", "White", "Gray", "Red", "Orange", "Yellow", "Green", "Blue",
                "Purple", "Pink", "Brown", "Beige", "Navy", "Khaki", "Multicolor",
                "Unknown",
            ]),
            seasons: list(&["Spring", "Summer", "Fall", "Winter", "All Season"]),
            occasions: list(&["Casual", "Work", "Formal", "Party", "Sports", "Home", "Travel"]),
        }
    }
}
