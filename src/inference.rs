//! 推論APIクライアント
//!
//! OpenAI互換のchat completionsエンドポイントへ画像付きリクエストを1回送り、
//! レスポンステキストを共通パーサーで構造化する:
//! - SegmentationClient: 写真全体 → 候補アイテムの列（Lenient）
//! - CategorizationClient: 単品画像 → 分類属性（Strict）
//!
//! リトライ・結果キャッシュは行わない。失敗はそのまま呼び出し側へ返す。

use crate::config::Config;
use crate::error::{ClosetError, Result};
use ai_closet_common::{
    build_categorization_system_prompt, build_segmentation_system_prompt,
    parse_categorization_response, parse_segmentation_response, CandidateAttributes,
    CandidateItem, ValidationPolicy, Vocabulary, CATEGORIZATION_USER_PROMPT,
    SEGMENTATION_USER_PROMPT,
};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// id合成用のプロセス全体で単調増加するカウンタ
static RUN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// セグメンテーション能力のシーム（テストでモック差し替え可能にする）
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, image_bytes: &[u8]) -> Result<Vec<CandidateItem>>;
}

/// chat completionsリクエスト
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<Part>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

/// chat completionsレスポンス
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// リクエスト送信の共通部分
struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl InferenceClient {
    fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClosetError::Inference(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// システム＋ユーザー（画像付き）の2メッセージで1回だけ問い合わせる
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_bytes: &[u8],
    ) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let data_url = format!("data:image/jpeg;base64,{}", encoded);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: vec![Part::Text {
                        text: system_prompt.to_string(),
                    }],
                },
                Message {
                    role: "user",
                    content: vec![
                        Part::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                        Part::Text {
                            text: user_prompt.to_string(),
                        },
                    ],
                },
            ],
        };

        tracing::debug!(model = %self.model, image_bytes = image_bytes.len(), "推論リクエスト送信");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClosetError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClosetError::Inference(format!(
                "status {}: {}",
                status, body
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClosetError::Inference(e.to_string()))?;

        let content = payload
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ClosetError::Inference("レスポンスにcontentがありません".into()))?;

        tracing::debug!(chars = content.len(), "推論レスポンス受信");
        Ok(content)
    }
}

/// 写真1枚を候補アイテム列に分解するクライアント
pub struct SegmentationClient {
    inner: InferenceClient,
    vocab: Vocabulary,
    policy: ValidationPolicy,
}

impl SegmentationClient {
    pub fn new(config: &Config, vocab: Vocabulary) -> Result<Self> {
        Ok(Self {
            inner: InferenceClient::new(config)?,
            vocab,
            policy: ValidationPolicy::Lenient,
        })
    }

    /// 検証ポリシーを差し替える（既定はLenient）
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn segment(&self, image_bytes: &[u8]) -> Result<Vec<CandidateItem>> {
        let system_prompt = build_segmentation_system_prompt(&self.vocab);
        let response = self
            .inner
            .complete(&system_prompt, SEGMENTATION_USER_PROMPT, image_bytes)
            .await?;

        let run_id = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        let items = parse_segmentation_response(&response, run_id, self.policy)?;

        tracing::debug!(count = items.len(), "セグメンテーション完了");
        Ok(items)
    }
}

#[async_trait]
impl Segmenter for SegmentationClient {
    async fn segment(&self, image_bytes: &[u8]) -> Result<Vec<CandidateItem>> {
        SegmentationClient::segment(self, image_bytes).await
    }
}

/// 切り出し済みの単品画像を分類するクライアント
pub struct CategorizationClient {
    inner: InferenceClient,
    vocab: Vocabulary,
    policy: ValidationPolicy,
}

impl CategorizationClient {
    pub fn new(config: &Config, vocab: Vocabulary) -> Result<Self> {
        Ok(Self {
            inner: InferenceClient::new(config)?,
            vocab,
            policy: ValidationPolicy::Strict,
        })
    }

    /// 検証ポリシーを差し替える（既定はStrict）
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn categorize(&self, image_bytes: &[u8]) -> Result<CandidateAttributes> {
        let system_prompt = build_categorization_system_prompt(&self.vocab);
        let response = self
            .inner
            .complete(&system_prompt, CATEGORIZATION_USER_PROMPT, image_bytes)
            .await?;

        let attrs = parse_categorization_response(&response, self.policy)?;

        tracing::debug!(category = %attrs.category, "単品分類完了");
        Ok(attrs)
    }
}
