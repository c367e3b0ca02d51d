//! プロンプト生成モジュール
//!
//! - AnalysisCategory: 解析の5区分
//! - ANALYSIS_INSTRUCTION: プロバイダへ渡す指示文

/// 解析区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisCategory {
    Identification,
    TextExtraction,
    Age,
    HistoricalContext,
    MarketValue,
}

impl AnalysisCategory {
    /// 出力に並ぶ順
    pub const ALL: [AnalysisCategory; 5] = [
        AnalysisCategory::Identification,
        AnalysisCategory::TextExtraction,
        AnalysisCategory::Age,
        AnalysisCategory::HistoricalContext,
        AnalysisCategory::MarketValue,
    ];

    /// 見出し
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisCategory::Identification => "Item Identification",
            AnalysisCategory::TextExtraction => "Text Extraction",
            AnalysisCategory::Age => "Age Estimation",
            AnalysisCategory::HistoricalContext => "Historical Context",
            AnalysisCategory::MarketValue => "Market Value",
        }
    }

    /// 見出しの絵文字
    pub fn icon(&self) -> &'static str {
        match self {
            AnalysisCategory::Identification => "🔍",
            AnalysisCategory::TextExtraction => "📝",
            AnalysisCategory::Age => "📅",
            AnalysisCategory::HistoricalContext => "🏛️",
            AnalysisCategory::MarketValue => "💰",
        }
    }

    /// "🔍 **Item Identification**:" 形式の見出し行
    pub fn heading(&self) -> String {
        format!("{} **{}**:", self.icon(), self.title())
    }
}

/// 既定の指示文
pub const ANALYSIS_INSTRUCTION: &str = "Analyze this image of a military or vintage tag: \
extract text, identify the item, estimate age, historical context, and current market value. \
Format your response with clear sections for each analysis.";
