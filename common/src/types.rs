//! 解析の型定義
//!
//! CLIと解析コアで共有される型:
//! - AnalysisRequest: プロバイダへ渡す画像と指示文
//! - ProviderOutcome: プロバイダ1回分の呼び出し結果
//! - AnalysisResult: フォールバックチェーンの最終結果
//! - AnalysisResponse: 呼び出し元へ返すJSONエンベロープ

use serde::{Deserialize, Serialize};
use std::fmt;

/// デモ（オフライン代替）結果のプロバイダ名
pub const DEMO_PROVIDER: &str = "demo";

/// プロバイダ失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    AuthError,
    RateLimited,
    PaymentRequired,
    Timeout,
    NetworkError,
    ServerError,
    Unknown,
}

impl ErrorKind {
    /// HTTPステータスから分類する。成功（2xx）は`None`
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(ErrorKind::AuthError),
            402 => Some(ErrorKind::PaymentRequired),
            429 => Some(ErrorKind::RateLimited),
            _ => Some(ErrorKind::ServerError),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthError => "authError",
            ErrorKind::RateLimited => "rateLimited",
            ErrorKind::PaymentRequired => "paymentRequired",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkError => "networkError",
            ErrorKind::ServerError => "serverError",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64エンコード済み画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// "data:image/jpeg;base64,..." 形式のData URL
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// 解析リクエスト（構築後は不変）
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    image: EncodedImage,
    instruction: String,
    context_hint: Option<String>,
}

impl AnalysisRequest {
    pub fn new(image: EncodedImage, instruction: impl Into<String>) -> Self {
        Self {
            image,
            instruction: instruction.into(),
            context_hint: None,
        }
    }

    /// デモ生成のキーワード判定に使うヒント（通常はファイル名）
    pub fn with_context_hint(mut self, hint: impl Into<String>) -> Self {
        self.context_hint = Some(hint.into());
        self
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn context_hint(&self) -> &str {
        self.context_hint.as_deref().unwrap_or_default()
    }
}

/// プロバイダ1回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Success { text: String, provider: String },
    Failure { kind: ErrorKind, message: String },
}

impl ProviderOutcome {
    pub fn success(text: impl Into<String>, provider: impl Into<String>) -> Self {
        ProviderOutcome::Success {
            text: text.into(),
            provider: provider.into(),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ProviderOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ProviderOutcome::Success { .. } => None,
            ProviderOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// フォールバック前に失敗したプロバイダの記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// フォールバックチェーンの最終結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    pub text: String,
    /// 実プロバイダ名、またはデモ時は`DEMO_PROVIDER`
    pub provider: String,
    pub is_demo: bool,
    /// 失敗したプロバイダの診断メッセージ（試行順）
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

impl AnalysisResult {
    pub fn from_provider(
        text: impl Into<String>,
        provider: impl Into<String>,
        failures: Vec<FailureRecord>,
    ) -> Self {
        Self {
            success: true,
            text: text.into(),
            provider: provider.into(),
            is_demo: false,
            failures,
        }
    }

    /// デモ結果は常に success = true
    pub fn demo(text: impl Into<String>, failures: Vec<FailureRecord>) -> Self {
        Self {
            success: true,
            text: text.into(),
            provider: DEMO_PROVIDER.to_string(),
            is_demo: true,
            failures,
        }
    }
}

/// 呼び出し元へ返すJSONエンベロープ
///
/// `{success, result|error, provider?, demo?, filename}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    pub filename: String,
}

impl AnalysisResponse {
    pub fn from_result(result: &AnalysisResult, filename: impl Into<String>) -> Self {
        let (provider, demo) = if result.is_demo {
            (None, Some(true))
        } else {
            (Some(result.provider.clone()), None)
        };

        Self {
            success: result.success,
            result: Some(result.text.clone()),
            error: None,
            provider,
            demo,
            filename: filename.into(),
        }
    }

    pub fn failure(error: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            provider: None,
            demo: None,
            filename: filename.into(),
        }
    }
}
