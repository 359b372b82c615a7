use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClosetError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 DASHSCOPE_API_KEY か設定ファイルで指定してください")]
    MissingApiKey,

    #[error("推論API呼び出しエラー: {0}")]
    Inference(String),

    #[error("レスポンスのパースに失敗: {0}")]
    Parse(#[from] ai_closet_common::Error),

    #[error("保存する衣類が選択されていません")]
    EmptySelection,

    #[error("処理対象の写真がありません")]
    NoPhoto,

    /// 保存バッチ中に1件以上のハードエラーが発生した
    ///
    /// `failed` は保存が確定しなかったレコードid。確定済みの保存は
    /// ロールバックされない。
    #[error("衣類の保存に失敗しました: {count}件が未確定", count = .failed.len())]
    Persistence { failed: Vec<String> },

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClosetError>;
