use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tag-ai")]
#[command(about = "ミリタリー・ヴィンテージタグ画像AI解析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 1番目に試すプロバイダ（省略時は設定ファイルの値）
    #[arg(long, global = true)]
    pub primary: Option<AiProvider>,

    /// 1番目が失敗したときに試すプロバイダ（省略時は設定ファイルの値）
    #[arg(long, global = true)]
    pub secondary: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を解析（フォルダ指定時は直下の画像をすべて解析）
    Analyze {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 結果をJSONエンベロープで表示
        #[arg(long)]
        json: bool,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成（既存ファイルは上書き）
        #[arg(long)]
        init: bool,
    },
}
