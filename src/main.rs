use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use sparkle::commands::{self, AskOptions};
use sparkle::logging::init_tracing;
use sparkle::service::AiService;
use sparkle::{Config, GeminiClient, Mode};

#[derive(Parser)]
#[command(name = "sparkle")]
#[command(version)]
#[command(about = "Terminal chat client for Gemini with image generation and analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send a single prompt and print the reply
    Ask {
        prompt: String,
        /// Image file to analyze along with the prompt
        #[arg(long)]
        image: Option<PathBuf>,
        /// chat or image
        #[arg(long, default_value_t = Mode::Chat)]
        mode: Mode,
        /// Where to save a generated image
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or update the configuration
    Config {
        /// Store this API key in the config file
        #[arg(long, value_name = "KEY")]
        set_api_key: Option<String>,
    },
}

fn build_service(config: &Config) -> Result<Arc<dyn AiService>> {
    if !config.has_api_key() {
        eprintln!(
            "⚠️  No API key configured; requests will fail. Run `sparkle config --set-api-key <KEY>`."
        );
    }
    let client = GeminiClient::new(config).context("Failed to build HTTP client")?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    init_tracing(&config.log_path(), &config.log_filter)?;

    let mut stdout = std::io::stdout();
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let service = build_service(&config)?;
            sparkle::ui::run(config, service).await?;
        }
        Commands::Ask {
            prompt,
            image,
            mode,
            out,
        } => {
            let service = build_service(&config)?;
            let options = AskOptions {
                prompt,
                image,
                mode,
                out,
            };
            commands::ask(&config, service.as_ref(), options, &mut stdout).await?;
        }
        Commands::Config { set_api_key } => match set_api_key {
            Some(key) => commands::set_api_key(&mut config, &key, &mut stdout)?,
            None => commands::show_config(&config, &mut stdout)?,
        },
    }

    Ok(())
}
