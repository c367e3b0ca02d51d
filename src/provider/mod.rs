//! マルチモーダル解析プロバイダ
//!
//! 1回の呼び出しで成功テキストか分類済みの失敗を返す。
//! 失敗をエラーとして投げることはなく、すべて`ProviderOutcome`で表す。

mod chat;

pub use chat::{classify_response, ChatCompletionsClient, ProviderSettings, TRACING_TARGET};

use async_trait::async_trait;
use tag_ai_common::{EncodedImage, ProviderOutcome};

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// 結果・ログに出すプロバイダ名
    fn name(&self) -> &str;

    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> ProviderOutcome;
}
