use clap::Parser;
use tag_ai_rust::{analyzer, cli, config, error, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(provider) = cli.primary {
        config.primary = provider.default_config();
    }
    if let Some(provider) = cli.secondary {
        config.secondary = provider.default_config();
    }

    match cli.command {
        Commands::Analyze { paths, output, json } => {
            if !json {
                println!("🎯 tag-ai - タグ画像解析\n");
            }

            let images = scanner::collect_images(&paths)?;
            let chain = analyzer::FallbackChain::from_config(&config)?;
            let [primary, secondary] = chain.provider_names();

            if !json {
                println!("✔ {}枚の画像を検出", images.len());
                println!("  プロバイダ: {} → {} → demo\n", primary, secondary);
            }

            let responses = analyzer::analyze_images(&chain, &images, cli.verbose && !json).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&responses)?);
            } else {
                for response in &responses {
                    print_response(response);
                }
            }

            if let Some(output) = output {
                std::fs::write(&output, serde_json::to_string_pretty(&responses)?)?;
                if !json {
                    println!("✔ 結果を保存: {}", output.display());
                }
            }
        }

        Commands::Config { show, init } => {
            if init {
                let path = Config::default().save()?;
                println!("✔ 設定ファイルを作成しました: {}", path.display());
                config = Config::default();
            }

            if show || !init {
                println!("設定:");
                println!("  ファイル: {}", Config::config_path()?.display());
                for (label, provider) in [("1番目", &config.primary), ("2番目", &config.secondary)] {
                    println!(
                        "  {}: {} ({}, {})  APIキー[{}]: {}",
                        label,
                        provider.name,
                        provider.model,
                        provider.endpoint,
                        provider.api_key_env,
                        if provider.api_key().is_some() { "設定済み" } else { "未設定" }
                    );
                }
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  max_tokens: {}", config.max_tokens);
                println!("  画像サイズ上限: {} bytes", config.max_image_bytes);
            }
        }
    }

    Ok(())
}

fn print_response(response: &tag_ai_common::AnalysisResponse) {
    println!("==================================================");
    println!("📸 {}", response.filename);

    match (&response.result, &response.error) {
        (Some(text), _) => {
            let source = match (&response.provider, response.demo) {
                (Some(provider), _) => provider.as_str(),
                (None, Some(true)) => "demo（オフライン代替）",
                _ => "-",
            };
            println!("✅ 解析完了 [{}]\n", source);
            println!("{}\n", text);
        }
        (None, Some(error)) => println!("❌ 解析失敗: {}\n", error),
        (None, None) => println!("❌ 解析失敗\n"),
    }
}
