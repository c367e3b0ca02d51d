mod chain;

pub use chain::{FallbackChain, TRACING_TARGET};

use crate::scanner::ImageInfo;
use tag_ai_common::AnalysisResponse;

/// 画像を1枚ずつ順に解析する
///
/// 読み込みに失敗した画像は`success: false`のエンベロープになり、残りの処理は続ける。
pub async fn analyze_images(
    chain: &FallbackChain,
    images: &[ImageInfo],
    verbose: bool,
) -> Vec<AnalysisResponse> {
    let mut responses = Vec::with_capacity(images.len());

    for (idx, image) in images.iter().enumerate() {
        if verbose {
            println!("  [{}/{}] {}", idx + 1, images.len(), image.file_name);
        }

        let response = match chain.analyze_file(&image.path).await {
            Ok(result) => {
                if verbose {
                    for failure in &result.failures {
                        println!("    ✘ {} ({}): {}", failure.provider, failure.kind, failure.message);
                    }
                    println!("    ✔ {}", result.provider);
                }
                AnalysisResponse::from_result(&result, &image.file_name)
            }
            Err(e) => {
                tracing::error!(target: TRACING_TARGET, file = %image.path.display(), error = %e, "Failed to read image");
                AnalysisResponse::failure(format!("画像の処理に失敗しました: {}", e), &image.file_name)
            }
        };
        responses.push(response);
    }

    responses
}
