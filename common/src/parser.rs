//! APIレスポンスパーサー
//!
//! Chat Completions形式のレスポンスから解析テキストと
//! エラーメッセージを取り出す

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `choices[0].message.content` を取り出す
///
/// # Examples
/// ```
/// use tag_ai_common::parse_chat_completion;
///
/// let body = r#"{"choices":[{"message":{"role":"assistant","content":"WWII dog tag"}}]}"#;
/// assert_eq!(parse_chat_completion(body).unwrap(), "WWII dog tag");
/// ```
pub fn parse_chat_completion(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::Parse("choices[0].message.content がありません".into()))
}

/// エラーレスポンスから診断メッセージを取り出す
///
/// 優先順位:
/// 1. `{"error": {"message": "..."}}`
/// 2. `{"error": "..."}`
/// 3. レスポンス本文そのまま
/// 4. "Unknown error"
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str() {
            return message.to_string();
        }
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}
