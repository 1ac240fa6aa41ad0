//! voice-dispatch: local voice commands for an assistant engine.
//!
//! Reads engine lifecycle events as JSON lines on stdin, runs matching local
//! commands, and writes session commands as JSON lines on stdout.

mod actions;
mod commands;
mod config;
mod ipc;
mod logging;
mod session;
mod shell;
mod tts;

#[cfg(test)]
mod testing;

use tracing::info;

use actions::ActionRunner;
use commands::dispatch::Dispatcher;
use commands::registry::builtin_table;
use config::paths::get_log_dir;
use config::read_dispatch_config;
use ipc::bridge::spawn_stdin_reader;
use session::{is_interactive, EventHandler, Flow, IpcSession, Session, Status};
use shell::SystemShell;
use tts::create_speaker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(&get_log_dir());

    let config = read_dispatch_config();
    info!(?config, "Configuration loaded");

    // Bad patterns or adapters abort startup.
    let table = builtin_table(&config)?;
    let speaker = create_speaker(&config.tts_adapter, config.tts_command.as_deref())?;
    let runner = ActionRunner::new(config, SystemShell, speaker);
    let handler = EventHandler::new(Dispatcher::new(table, runner), is_interactive());

    let session = IpcSession;
    handler.start(&session);

    let mut event_rx = spawn_stdin_reader();
    info!("Voice dispatch ready");

    // Events are handled strictly one at a time.
    while let Some(event) = event_rx.recv().await {
        if let Flow::Exit(code) = handler.handle_event(event, &session).await {
            session.set_status(Status::Stopping);
            info!(code, "Exiting on engine error");
            std::process::exit(code);
        }
    }

    // stdin closed, engine host gone
    session.set_status(Status::Stopping);
    info!("stdin closed, shutting down");
    Ok(())
}
