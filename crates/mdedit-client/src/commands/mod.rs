//! Shell command handlers.
//!
//! Each sub-module groups related commands by concern. Handlers are thin:
//! they parse arguments, call into the [`Session`], and return
//! `Result<String, String>` ready for printing.

pub mod documents;
pub mod editor;
pub mod session;
pub mod settings;

use crate::state::Session;

pub const HELP: &str = "\
Documents
  ls                      open the document drawer and list documents
  open <doc>              open a document (number, uuid or title)
  new <title>             create a document
  rename <doc> <title>    rename a document
  rm <doc>                delete a document
  search [query]          filter the list by title (empty clears)
Editor
  show                    print the current buffer
  write <text>            replace the buffer (\\n for line breaks)
  append <text>           add a line to the buffer
  preview                 render the buffer
  toggle-preview          turn the live preview on or off
  export                  render through the export service to an HTML file
Session
  login <cookie>          use an auth_session cookie value
  logout                  forget the session
  whoami                  show the signed-in user
  dark [on|off]           toggle dark mode
  dismiss                 hide the current notice
  help                    this text
  quit                    leave";

/// Run one command line against the session.
pub async fn dispatch(session: &mut Session, line: &str) -> Result<String, String> {
    let line = line.trim();
    let (cmd, args) = line
        .split_once(char::is_whitespace)
        .map(|(c, a)| (c, a.trim()))
        .unwrap_or((line, ""));

    match cmd {
        "" => Ok(String::new()),
        "help" | "?" => Ok(HELP.to_string()),
        "ls" => documents::list(session).await,
        "open" => documents::open(session, args).await,
        "new" => documents::create(session, args).await,
        "rename" => documents::rename(session, args).await,
        "rm" => documents::remove(session, args).await,
        "search" => documents::search(session, args),
        "show" => editor::show(session),
        "write" => editor::write(session, args),
        "append" => editor::append(session, args),
        "preview" => editor::preview(session),
        "toggle-preview" => editor::toggle_preview(session),
        "export" => editor::export(session).await,
        "login" => session::login(session, args).await,
        "logout" => session::logout(session),
        "whoami" => session::whoami(session),
        "dark" => settings::dark(session, args),
        "dismiss" => session::dismiss(session),
        other => Err(format!("Unknown command \"{other}\", try `help`")),
    }
}
