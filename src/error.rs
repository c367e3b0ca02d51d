use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像サイズが上限を超えています: {path} ({size} bytes > {limit} bytes)")]
    ImageTooLarge { path: String, size: u64, limit: u64 },

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("HTTPクライアント初期化エラー: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] tag_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, TagAiError>;
