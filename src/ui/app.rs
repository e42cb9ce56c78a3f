use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::conversation::Request;
use crate::events::AppEvent;
use crate::service::{self, AiService};
use crate::ui::conversation::{ConversationAction, ConversationManager};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_millis(250);

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the interactive chat until the user quits
pub async fn run(config: Config, service: Arc<dyn AiService>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut manager = ConversationManager::new(&config);

    tracing::info!(session = %manager.controller().session_id(), "tui started");
    let result = event_loop(&mut terminal, &mut manager, service).await;

    restore_terminal(&mut terminal)?;
    tracing::info!("tui stopped");
    result
}

fn spawn_request(service: &Arc<dyn AiService>, tx: &mpsc::UnboundedSender<AppEvent>, request: Request) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = service::execute(service.as_ref(), request).await;
        // the receiver only goes away on shutdown
        let _ = tx.send(AppEvent::Completed(completion));
    });
}

async fn event_loop(
    terminal: &mut Tui,
    manager: &mut ConversationManager,
    service: Arc<dyn AiService>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        terminal.draw(|frame| manager.render(frame.size(), frame.buffer_mut()))?;

        tokio::select! {
            maybe_event = events.next() => {
                let action = match maybe_event {
                    Some(Ok(Event::Key(key))) => manager.handle_key(key),
                    Some(Ok(Event::Paste(text))) => {
                        manager.handle_paste(&text);
                        ConversationAction::None
                    }
                    Some(Ok(_)) => ConversationAction::None,
                    Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                    None => ConversationAction::Exit,
                };

                match action {
                    ConversationAction::Dispatch(request) => spawn_request(&service, &tx, request),
                    ConversationAction::Exit => {
                        let _ = tx.send(AppEvent::ExitRequest);
                    }
                    ConversationAction::None => {}
                }
            }
            Some(event) = rx.recv() => {
                match event {
                    AppEvent::Completed(completion) => manager.complete(completion),
                    AppEvent::ExitRequest => return Ok(()),
                }
            }
            _ = ticker.tick() => {
                manager.tick(chrono::Utc::now());
            }
        }
    }
}
