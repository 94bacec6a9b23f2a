//! Interactive interpreter and one-shot command runner.

use anyhow::{anyhow, bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use super::commands::{execute, parse_bool, parse_command, parse_price, Command, Step};
use crate::api::{ProductApi, ProductDraft};
use crate::app::App;

pub fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--session <file>] [--timeout <secs>] [--ephemeral] [--yes]\n  {program} -c \"<command>\" [flags]    # run one command and exit\n\nFlags:\n  --api <url>         Backend base URL (env PRODUCTDESK_API_URL, default http://127.0.0.1:3000)\n  --session <file>    Session file (env PRODUCTDESK_SESSION_FILE, default in the user config dir)\n  --timeout <secs>    Per-request timeout (env PRODUCTDESK_TIMEOUT_SECS, default 15)\n  --ephemeral         Keep the session in memory only\n  -y, --yes           Do not ask before deleting\n  -c, --command <cmd> Run a single command\n  -h, --help          Show this help\n\n{}\n\nExamples:\n  {program} -c \"login ana@example.com secret\"\n  {program} -c \"submit name=Desk type=office price=1200 description='standing desk'\"\n  {program}\n    > go /admin\n    > approve 4",
        super::commands::COMMAND_HELP
    );
}

fn print_error(e: &dyn std::fmt::Display) {
    eprintln!("\x1b[31merror: {}\x1b[0m", e);
}

/// Run one command line and print its output. Errors are returned so the caller can
/// set the exit status.
pub fn run_once<A: ProductApi>(rt: &tokio::runtime::Runtime, app: &mut App<A>, line: &str, assume_yes: bool) -> Result<()> {
    let Some(cmd) = parse_command(line)? else { return Ok(()) };
    if matches!(cmd, Command::Delete(_)) && !assume_yes {
        bail!("delete needs confirmation; pass --yes to run it as a single command");
    }
    match rt.block_on(async { execute(app, cmd).await })? {
        Step::Output(text) => println!("{}", text),
        Step::Quit => {}
    }
    Ok(())
}

fn read_field(rl: &mut DefaultEditor, label: &str) -> Result<Option<String>> {
    match rl.readline(&format!("  {}: ", label)) {
        Ok(v) => Ok(Some(v.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(anyhow!(e)),
    }
}

// Walk the submit form field by field; Ctrl-C abandons it.
fn prompt_draft(rl: &mut DefaultEditor) -> Result<Option<ProductDraft>> {
    let mut draft = ProductDraft::default();
    let Some(name) = read_field(rl, "name")? else { return Ok(None) };
    draft.name = name;
    let Some(description) = read_field(rl, "description")? else { return Ok(None) };
    draft.description = description;
    let Some(kind) = read_field(rl, "type")? else { return Ok(None) };
    draft.kind = kind;
    let Some(available) = read_field(rl, "available [yes/no, default yes]")? else { return Ok(None) };
    if !available.is_empty() {
        draft.available = parse_bool(&available).ok_or_else(|| anyhow!("available must be yes or no"))?;
    }
    let Some(price) = read_field(rl, "price")? else { return Ok(None) };
    draft.price = parse_price(&price)?;
    Ok(Some(draft))
}

fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    match rl.readline(&format!("{} [y/N] ", question)) {
        Ok(v) => Ok(parse_bool(&v).unwrap_or(false)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(e) => Err(anyhow!(e)),
    }
}

/// Interactive loop. Starts on the home view and runs until `quit` or end of input.
pub fn run_repl<A: ProductApi>(rt: &tokio::runtime::Runtime, app: &mut App<A>, assume_yes: bool) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("productdesk interpreter. Type 'help' for commands.");
    match rt.block_on(async { app.navigate("/").await }) {
        Ok(_) => println!("{}", app.render()),
        Err(e) => print_error(&e),
    }
    loop {
        let line = match rl.readline("> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(anyhow!(e)),
        };
        let line = line.trim();
        if line.is_empty() { continue; }
        let _ = rl.add_history_entry(line);

        let cmd = match parse_command(line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => { print_error(&e); continue; }
        };
        let cmd = match cmd {
            Command::Submit(None) => match prompt_draft(&mut rl) {
                Ok(Some(draft)) => Command::Submit(Some(draft)),
                Ok(None) => { println!("submit cancelled"); continue; }
                Err(e) => { print_error(&e); continue; }
            },
            Command::Delete(id) if !assume_yes => match confirm(&mut rl, &format!("delete request {}?", id)) {
                Ok(true) => Command::Delete(id),
                Ok(false) => { println!("not deleted"); continue; }
                Err(e) => { print_error(&e); continue; }
            },
            other => other,
        };
        debug!(target: "productdesk", command = cmd.name(), "run command");
        match rt.block_on(async { execute(app, cmd).await }) {
            Ok(Step::Output(text)) => println!("{}", text),
            Ok(Step::Quit) => break,
            Err(e) => print_error(&e),
        }
    }
    Ok(())
}
