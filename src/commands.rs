use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::conversation::{ConversationController, Message};
use crate::events::{Mode, Sender};
use crate::image::ImagePayload;
use crate::service::AiService;

/// Arguments of a one-shot `sparkle ask`
#[derive(Debug, Clone)]
pub struct AskOptions {
    pub prompt: String,
    pub image: Option<PathBuf>,
    pub mode: Mode,
    pub out: Option<PathBuf>,
}

/// Run a single submission without the TUI and print the reply
pub async fn ask(
    config: &Config,
    service: &dyn AiService,
    options: AskOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let image = options.image.as_deref().map(ImagePayload::from_path).transpose()?;
    // an attached image is always analyzed, whatever mode was asked for
    let mode = if image.is_some() { Mode::Chat } else { options.mode };

    let mut controller = ConversationController::new(&config.ui);
    controller.set_mode(mode);
    controller.set_input(options.prompt);
    if let Some(image) = image {
        controller.attach_image(image);
    }

    if !controller.submit_and_wait(service).await {
        bail!("Nothing to send: provide a prompt or an image");
    }

    let reply = controller
        .messages()
        .last()
        .filter(|message| message.sender == Sender::Ai)
        .context("No reply was recorded")?;

    print_reply(reply, options.out.as_ref(), out)
}

fn print_reply(reply: &Message, save_to: Option<&PathBuf>, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", reply.text)?;

    let Some(image) = &reply.image else {
        return Ok(());
    };

    if image.is_placeholder() {
        bail!("Image generation failed");
    }

    match save_to {
        Some(path) => {
            let bytes = image.decode()?;
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write image to {}", path.display()))?;
            writeln!(out, "🖼  Saved {} ({} bytes)", path.display(), bytes.len())?;
        }
        None => {
            writeln!(out, "🖼  {} (use --out <path> to save it)", image.summary())?;
        }
    }
    Ok(())
}

/// Print where the configuration lives and what it resolves to
pub fn show_config(config: &Config, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "⚙️  Sparkle configuration")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "📍 Config file: {}", config.config_path().display())?;
    writeln!(out, "📝 Log file:    {}", config.log_path().display())?;
    writeln!(out, "🌐 API base:    {}", config.api_base)?;
    writeln!(out, "💬 Text model:  {}", config.text_model)?;
    writeln!(out, "🎨 Image model: {}", config.image_model)?;
    let key_status = if config.has_api_key() { "configured" } else { "missing" };
    writeln!(out, "🔑 API key:     {key_status}")?;
    if !config.has_api_key() {
        writeln!(
            out,
            "\nSet one with `sparkle config --set-api-key <KEY>` or the {} environment variable.",
            crate::config::API_KEY_ENV
        )?;
    }
    Ok(())
}

/// Store the API key in the config file
pub fn set_api_key(config: &mut Config, key: &str, out: &mut dyn Write) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key cannot be empty");
    }
    config.set_api_key(key.to_string());
    config.save()?;
    writeln!(out, "✅ API key saved to {}", config.config_path().display())?;
    Ok(())
}
