use std::str::FromStr;

use crate::conversation::MessageId;
use crate::events::Mode;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Switch between chat and image mode
    Mode,
    /// Start a new chat
    New,
    /// Edit one of your messages
    Edit,
    /// Reply to a message
    Reply,
    /// Copy a message to the clipboard
    Copy,
    /// Refine an AI message
    Refine,
    /// Attach an image for analysis
    Upload,
    /// Remove the attached image
    Detach,
    /// Use one of the suggested prompts
    Suggest,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// `/mode chat` or `/mode image`; `None` means toggle
    pub fn mode_target(&self) -> Option<Mode> {
        if self.command != SlashCommand::Mode {
            return None;
        }

        let arg = self.argument()?.trim().to_lowercase();
        match arg.as_str() {
            "c" | "chat" | "text" => Some(Mode::Chat),
            "i" | "image" | "img" => Some(Mode::Image),
            _ => None,
        }
    }

    /// Message id argument, accepting both `3` and `#3`
    pub fn message_id(&self) -> Option<MessageId> {
        let arg = self.argument()?.trim().trim_start_matches('#');
        arg.parse::<u64>().ok().map(MessageId)
    }

    /// One-based suggestion number converted to an index
    pub fn suggestion_index(&self) -> Option<usize> {
        let number = self.argument()?.trim().parse::<usize>().ok()?;
        number.checked_sub(1)
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Mode => "switch mode (/mode chat, /mode image, or /mode to toggle)",
            SlashCommand::New => "start a new chat",
            SlashCommand::Edit => "edit one of your messages (/edit <id>)",
            SlashCommand::Reply => "reply to a message (/reply <id>)",
            SlashCommand::Copy => "copy a message to the clipboard (/copy <id>)",
            SlashCommand::Refine => "refine an AI answer or image (/refine <id>)",
            SlashCommand::Upload => "attach an image for analysis (/upload <path>)",
            SlashCommand::Detach => "remove the attached image",
            SlashCommand::Suggest => "use a suggested prompt (/suggest <1-3>)",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Whether the command needs an argument to do anything
    pub fn requires_argument(self) -> bool {
        matches!(
            self,
            SlashCommand::Edit
                | SlashCommand::Reply
                | SlashCommand::Copy
                | SlashCommand::Refine
                | SlashCommand::Upload
                | SlashCommand::Suggest
        )
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter()
        .map(|c| (c.command(), c))
        .collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim_start().strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let head = parts.next()?;
    let tail = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let command = SlashCommand::from_str(&head.to_lowercase()).ok().or_else(|| {
        match head.to_lowercase().as_str() {
            "q" | "exit" | "bye" => Some(SlashCommand::Quit),
            "m" | "switch" => Some(SlashCommand::Mode),
            "clear" | "reset" => Some(SlashCommand::New),
            "attach" | "image" => Some(SlashCommand::Upload),
            "h" | "?" => Some(SlashCommand::Help),
            _ => None,
        }
    })?;

    Some(ParsedCommand {
        command,
        argument: tail.map(str::to_string),
    })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nMessage ids are shown as #<id> in each message header.");
    help.push_str("\nKeys: Enter send · Shift+Enter newline · Ctrl+T toggle mode · Ctrl+N new chat · Esc cancel edit · Ctrl+C quit");
    help.push_str("\nIn the refine menu: number keys toggle options, Enter confirms, Esc cancels.");

    help
}
