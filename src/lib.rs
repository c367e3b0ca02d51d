//! タグ画像AI解析
//!
//! 画像をBase64化して複数のマルチモーダルAIプロバイダへ順に問い合わせ、
//! 最初に成功した解析結果を返す。全プロバイダが失敗した場合はデモ解析に切り替える。

pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod provider;
pub mod scanner;
