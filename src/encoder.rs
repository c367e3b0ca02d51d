//! 画像のBase64エンコード

use crate::error::{Result, TagAiError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use tag_ai_common::EncodedImage;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// 拡張子からData URL用のMIMEタイプを決める（不明ならJPEG）
pub fn mime_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    }
}

pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> EncodedImage {
    EncodedImage::new(STANDARD.encode(bytes), mime_type)
}

/// サイズ上限チェック
pub fn check_size(name: &str, size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(TagAiError::ImageTooLarge {
            path: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// 画像ファイルを読み込んでエンコード
///
/// 読み込み失敗は`TagAiError::Io`としてそのまま返す。
pub fn encode_image(path: &Path, max_bytes: u64) -> Result<EncodedImage> {
    let name = path.display().to_string();
    check_size(&name, std::fs::metadata(path)?.len(), max_bytes)?;

    let bytes = std::fs::read(path)?;
    // 実サイズでも確認
    check_size(&name, bytes.len() as u64, max_bytes)?;

    Ok(encode_bytes(&bytes, mime_type_for(&name)))
}
