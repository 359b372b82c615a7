//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// レスポンステキストから期待するJSONを解釈できなかった
    ///
    /// `response` には受信した生テキスト全体を保持する（呼び出し側での
    /// デバッグ・再解析用）
    #[error("Parse error: {reason}")]
    Parse { reason: String, response: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Parseエラーを生成するヘルパー
    pub fn parse(reason: impl Into<String>, response: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
            response: response.into(),
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
