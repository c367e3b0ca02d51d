//! Tag AI Common Library
//!
//! CLIと解析コアで共有される型とユーティリティ（I/O・HTTPなし）

pub mod types;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod demo;

pub use types::{
    AnalysisRequest, AnalysisResponse, AnalysisResult, EncodedImage, ErrorKind, FailureRecord,
    ProviderOutcome, DEMO_PROVIDER,
};
pub use error::{Error, Result};
pub use prompts::{AnalysisCategory, ANALYSIS_INSTRUCTION};
pub use parser::{extract_error_message, parse_chat_completion};
pub use demo::{generate_demo_analysis, DEMO_KEYWORD};
