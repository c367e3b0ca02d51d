//! プロバイダのフォールバックチェーン
//!
//! TryPrimary → TrySecondary → UseDemo の順に進み、最初の成功で終了する。
//! 失敗の種類による分岐はしない（401でも次へ進む）。

use crate::config::Config;
use crate::encoder;
use crate::error::Result;
use crate::provider::{ChatCompletionsClient, ProviderSettings, VisionProvider};
use std::path::Path;
use std::sync::Arc;
use tag_ai_common::{
    generate_demo_analysis, AnalysisRequest, AnalysisResult, FailureRecord, ProviderOutcome,
    ANALYSIS_INSTRUCTION,
};

/// トレースターゲット
pub const TRACING_TARGET: &str = "tag_ai::chain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    TryPrimary,
    TrySecondary,
    UseDemo,
}

impl Stage {
    fn next(self) -> Self {
        match self {
            Stage::TryPrimary => Stage::TrySecondary,
            Stage::TrySecondary | Stage::UseDemo => Stage::UseDemo,
        }
    }
}

/// 2段のプロバイダとデモ生成からなる解析チェーン
///
/// 状態を持たないのでリクエスト間で共有してよい。
#[derive(Clone)]
pub struct FallbackChain {
    primary: Arc<dyn VisionProvider>,
    secondary: Arc<dyn VisionProvider>,
    instruction: String,
    max_image_bytes: u64,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("max_image_bytes", &self.max_image_bytes)
            .finish_non_exhaustive()
    }
}

impl FallbackChain {
    pub fn new(primary: Arc<dyn VisionProvider>, secondary: Arc<dyn VisionProvider>) -> Self {
        Self {
            primary,
            secondary,
            instruction: ANALYSIS_INSTRUCTION.to_string(),
            max_image_bytes: crate::config::DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// 設定からHTTPクライアント2つを組み立てる
    pub fn from_config(config: &Config) -> Result<Self> {
        let primary = ChatCompletionsClient::new(ProviderSettings::from_config(&config.primary, config))?;
        let secondary =
            ChatCompletionsClient::new(ProviderSettings::from_config(&config.secondary, config))?;

        Ok(Self::new(Arc::new(primary), Arc::new(secondary))
            .with_instruction(config.instruction())
            .with_max_image_bytes(config.max_image_bytes))
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn provider_names(&self) -> [&str; 2] {
        [self.primary.name(), self.secondary.name()]
    }

    /// チェーンを実行する
    ///
    /// プロバイダの失敗はすべてここで吸収されるため、結果は常に`success = true`。
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisResult {
        let mut failures = Vec::new();
        let mut stage = Stage::TryPrimary;

        loop {
            let provider = match stage {
                Stage::TryPrimary => &self.primary,
                Stage::TrySecondary => &self.secondary,
                Stage::UseDemo => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        hint = request.context_hint(),
                        failed = failures.len(),
                        "All providers failed, using demo analysis"
                    );
                    let text = generate_demo_analysis(request.context_hint());
                    return AnalysisResult::demo(text, failures);
                }
            };

            tracing::info!(target: TRACING_TARGET, provider = provider.name(), ?stage, "Trying provider");

            match provider.analyze(request.image(), request.instruction()).await {
                ProviderOutcome::Success { text, provider: name } => {
                    tracing::info!(target: TRACING_TARGET, provider = %name, "Analysis successful");
                    return AnalysisResult::from_provider(text, name, failures);
                }
                ProviderOutcome::Failure { kind, message } => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        provider = provider.name(),
                        %kind,
                        %message,
                        "Provider failed, falling back"
                    );
                    failures.push(FailureRecord {
                        provider: provider.name().to_string(),
                        kind,
                        message,
                    });
                    stage = stage.next();
                }
            }
        }
    }

    /// メモリ上の画像を解析（ファイル名はデモ判定のヒントに使う）
    pub async fn analyze_bytes(&self, bytes: &[u8], file_name: &str) -> Result<AnalysisResult> {
        encoder::check_size(file_name, bytes.len() as u64, self.max_image_bytes)?;
        let image = encoder::encode_bytes(bytes, encoder::mime_type_for(file_name));
        let request =
            AnalysisRequest::new(image, self.instruction.as_str()).with_context_hint(file_name);
        Ok(self.run(&request).await)
    }

    /// 画像ファイルを解析
    ///
    /// 読み込みに失敗した場合はプロバイダを呼ばずにエラーを返す。
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisResult> {
        let image = encoder::encode_image(path, self.max_image_bytes)?;
        let hint = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let request = AnalysisRequest::new(image, self.instruction.as_str()).with_context_hint(hint);
        Ok(self.run(&request).await)
    }
}
