//! Line-oriented front end over stdin/stdout.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::commands;
use crate::events::AppEvent;
use crate::state::Session;

const PROMPT: &str = "mdedit> ";

fn prompt() {
    print!("{PROMPT}");
    let _ = std::io::stdout().flush();
}

/// Read commands until `quit` or end of input, then flush pending edits.
pub async fn run(mut session: Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = session.subscribe();

    println!("{}", session.greeting());
    if session.dark_mode() {
        println!("(dark mode)");
    }
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if matches!(line.trim(), "quit" | "exit") {
                    break;
                }

                match commands::dispatch(&mut session, &line).await {
                    Ok(out) if out.is_empty() => {}
                    Ok(out) => println!("{out}"),
                    Err(err) => println!("error: {err}"),
                }
                prompt();
            }
            event = events.recv() => match event {
                Ok(AppEvent::SaveFailed { uuid }) => {
                    println!("\n! Autosave failed for {uuid}, keep typing to retry");
                    prompt();
                }
                Ok(event) => debug!(?event, "Event"),
                Err(RecvError::Lagged(n)) => debug!(skipped = n, "Event receiver lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.shutdown().await;
    println!();
    Ok(())
}
