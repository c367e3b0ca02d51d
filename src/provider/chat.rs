//! Chat Completions互換エンドポイントのクライアント
//!
//! xAI・OpenAIともに同じリクエスト形式:
//! - Authorization: Bearer <key>
//! - messages[0].content = [テキスト指示, image_url(Data URL)]
//! - レスポンスは choices[0].message.content

use super::VisionProvider;
use crate::config::{Config, ProviderConfig};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tag_ai_common::{
    extract_error_message, parse_chat_completion, EncodedImage, ErrorKind, ProviderOutcome,
};

/// プロバイダ呼び出しのトレースターゲット
pub const TRACING_TARGET: &str = "tag_ai::provider";

/// ログ・診断メッセージに載せるレスポンス本文の最大文字数
const BODY_PREVIEW_CHARS: usize = 500;

/// クライアント構築時に注入する設定
#[derive(Clone)]
pub struct ProviderSettings {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ProviderSettings {
    /// 設定ファイルの値と環境変数のAPIキーから組み立てる
    ///
    /// 環境変数はここで一度だけ読む。以降クライアントはプロセス環境を参照しない。
    pub fn from_config(provider: &ProviderConfig, config: &Config) -> Self {
        Self {
            name: provider.name.clone(),
            endpoint: provider.endpoint.clone(),
            model: provider.model.clone(),
            api_key: provider.api_key(),
            timeout: config.timeout(),
            max_tokens: config.max_tokens,
            user_agent: provider.user_agent.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

pub struct ChatCompletionsClient {
    http: Client,
    settings: ProviderSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsClient {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            provider = %settings.name,
            endpoint = %settings.endpoint,
            timeout_ms = settings.timeout.as_millis() as u64,
            has_key = settings.api_key.is_some(),
            "Creating provider client"
        );

        let mut builder = Client::builder().timeout(settings.timeout);
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            http: builder.build()?,
            settings,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn build_request<'a>(&'a self, image: &EncodedImage, instruction: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ],
            }],
            max_tokens: self.settings.max_tokens,
        }
    }

    /// 送信・受信段階のエラーを分類
    fn classify_transport_error(&self, err: &reqwest::Error) -> ProviderOutcome {
        let name = &self.settings.name;
        if err.is_timeout() {
            ProviderOutcome::failure(
                ErrorKind::Timeout,
                format!(
                    "{} request timed out after {}s",
                    name,
                    self.settings.timeout.as_secs_f32()
                ),
            )
        } else if err.is_connect() || err.is_request() {
            ProviderOutcome::failure(
                ErrorKind::NetworkError,
                format!("{} network error: {}", name, error_chain(err)),
            )
        } else {
            ProviderOutcome::failure(
                ErrorKind::Unknown,
                format!("{} unexpected error: {}", name, error_chain(err)),
            )
        }
    }
}

#[async_trait]
impl VisionProvider for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> ProviderOutcome {
        let name = &self.settings.name;

        // キー未設定なら通信しない
        let Some(api_key) = self.settings.api_key.as_deref() else {
            tracing::warn!(target: TRACING_TARGET, provider = %name, "API key not configured");
            return ProviderOutcome::failure(
                ErrorKind::AuthError,
                format!("{} API key is not configured", name),
            );
        };

        let request = self.build_request(image, instruction);
        tracing::debug!(
            target: TRACING_TARGET,
            provider = %name,
            model = %self.settings.model,
            image_chars = image.data.len(),
            "Sending analysis request"
        );

        let response = match self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return self.classify_transport_error(&err),
        };

        let status = response.status().as_u16();
        tracing::debug!(target: TRACING_TARGET, provider = %name, status, "Response received");

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return self.classify_transport_error(&err),
        };

        classify_response(name, status, &body)
    }
}

/// HTTPステータスと本文から結果を決める
pub fn classify_response(provider: &str, status: u16, body: &str) -> ProviderOutcome {
    let Some(kind) = ErrorKind::from_status(status) else {
        return match parse_chat_completion(body) {
            Ok(text) => ProviderOutcome::success(text, provider),
            Err(err) => ProviderOutcome::failure(
                ErrorKind::Unknown,
                format!(
                    "{} returned an unreadable response ({}): {}",
                    provider,
                    err,
                    preview(body)
                ),
            ),
        };
    };

    let message = preview(&extract_error_message(body));
    let label = match kind {
        ErrorKind::AuthError => format!("Invalid {} API key", provider),
        ErrorKind::PaymentRequired => format!("{} payment required", provider),
        ErrorKind::RateLimited => format!("{} rate limit exceeded", provider),
        _ => format!("{} API Error", provider),
    };

    ProviderOutcome::failure(kind, format!("{} ({}): {}", label, status, message))
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
    if text.chars().count() > BODY_PREVIEW_CHARS {
        out.push('…');
    }
    out
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
