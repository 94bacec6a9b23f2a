//! Shell command parsing and dispatch onto [`App`].

use tracing::debug;

use crate::api::{ProductApi, ProductDraft, ProductStatus, RegisterRequest};
use crate::app::{App, Outcome};
use crate::error::{AppError, AppResult};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(String),
    Login { email: String, password: String },
    Register(RegisterRequest),
    /// `None` when no fields were given; the interactive shell prompts for them.
    Submit(Option<ProductDraft>),
    Convert { id: i64, currency: Option<String> },
    Approve(i64),
    Reject(i64),
    Delete(i64),
    Logout,
    Refresh,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Verb for logs; never includes arguments such as passwords.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Go(_) => "go",
            Command::Login { .. } => "login",
            Command::Register(_) => "register",
            Command::Submit(_) => "submit",
            Command::Convert { .. } => "convert",
            Command::Approve(_) => "approve",
            Command::Reject(_) => "reject",
            Command::Delete(_) => "delete",
            Command::Logout => "logout",
            Command::Refresh => "refresh",
            Command::Status => "status",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Quit,
}

pub const COMMAND_HELP: &str = "Commands:
  go <path>                               open a view: /, /login, /register, /guest, /admin
  login <email> <password>                sign in; opens the dashboard for your role
  register <username> <email> <password>  create an account
  submit [name=.. type=.. price=.. available=yes|no description=..]
                                          submit a product request (prompts when no fields given)
  convert <id> [CODE]                     show a price in another currency (toggles MXN/COP)
  approve <id> | reject <id>              review a request (admin)
  delete <id>                             delete a request (admin)
  logout                                  sign out and return home
  refresh                                 reload the current view
  status                                  show the current session
  help                                    show this help
  quit | exit                             leave the shell
Quote values containing spaces: submit name=\"Standing desk\" ...";

/// Split a line on whitespace, keeping single- or double-quoted runs together.
pub fn split_args(line: &str) -> AppResult<Vec<String>> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;
    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => cur.push(ch),
            None if ch == '"' || ch == '\'' => { quote = Some(ch); in_token = true; }
            None if ch.is_whitespace() => {
                if in_token {
                    out.push(std::mem::take(&mut cur));
                    in_token = false;
                }
            }
            None => { cur.push(ch); in_token = true; }
        }
    }
    if quote.is_some() {
        return Err(AppError::user("unterminated_quote", "unterminated quote"));
    }
    if in_token { out.push(cur); }
    Ok(out)
}

fn parse_id(args: &[String], usage: &str) -> AppResult<i64> {
    let raw = args.first().ok_or_else(|| AppError::user("usage".to_string(), format!("usage: {}", usage)))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::user("invalid_id".to_string(), format!("'{}' is not a request id", raw)))
}

fn expect_args(args: &[String], n: usize, usage: &str) -> AppResult<()> {
    if args.len() != n {
        return Err(AppError::user("usage".to_string(), format!("usage: {}", usage)));
    }
    Ok(())
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "si" | "sí" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_price(raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::user("invalid_price".to_string(), format!("'{}' is not a price", raw.trim())))
}

/// Build a draft from `key=value` pairs. Unset fields keep their defaults, so
/// validation later reports what is missing.
pub fn parse_draft(pairs: &[String]) -> AppResult<ProductDraft> {
    let mut draft = ProductDraft::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::user("usage".to_string(), format!("expected key=value, got '{}'", pair)))?;
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => draft.name = value.to_string(),
            "description" | "desc" => draft.description = value.to_string(),
            "type" | "kind" => draft.kind = value.to_string(),
            "price" => draft.price = parse_price(value)?,
            "available" => {
                draft.available = parse_bool(value).ok_or_else(|| {
                    AppError::user("invalid_available".to_string(), format!("available must be yes or no, got '{}'", value))
                })?
            }
            other => return Err(AppError::user("unknown_field".to_string(), format!("unknown field '{}'", other))),
        }
    }
    Ok(draft)
}

/// Parse one shell line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> AppResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') { return Ok(None); }
    let mut args = split_args(line)?;
    if args.is_empty() { return Ok(None); }
    let verb = args.remove(0).to_ascii_lowercase();
    let cmd = match verb.as_str() {
        "go" | "open" => {
            expect_args(&args, 1, "go <path>")?;
            Command::Go(args.remove(0))
        }
        "login" | "signin" => {
            expect_args(&args, 2, "login <email> <password>")?;
            let password = args.remove(1);
            Command::Login { email: args.remove(0), password }
        }
        "register" => {
            expect_args(&args, 3, "register <username> <email> <password>")?;
            let mut it = args.into_iter();
            let (username, email, password) = match (it.next(), it.next(), it.next()) {
                (Some(u), Some(e), Some(p)) => (u, e, p),
                _ => return Err(AppError::user("usage", "usage: register <username> <email> <password>")),
            };
            Command::Register(RegisterRequest { username, email, password })
        }
        "submit" => {
            if args.is_empty() { Command::Submit(None) } else { Command::Submit(Some(parse_draft(&args)?)) }
        }
        "convert" => {
            if args.is_empty() || args.len() > 2 {
                return Err(AppError::user("usage", "usage: convert <id> [CODE]"));
            }
            let id = parse_id(&args, "convert <id> [CODE]")?;
            Command::Convert { id, currency: args.get(1).cloned() }
        }
        "approve" => { expect_args(&args, 1, "approve <id>")?; Command::Approve(parse_id(&args, "approve <id>")?) }
        "reject" => { expect_args(&args, 1, "reject <id>")?; Command::Reject(parse_id(&args, "reject <id>")?) }
        "delete" => { expect_args(&args, 1, "delete <id>")?; Command::Delete(parse_id(&args, "delete <id>")?) }
        "logout" | "signout" => Command::Logout,
        "refresh" | "reload" => Command::Refresh,
        "status" | "whoami" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(AppError::user("unknown_command".to_string(), format!("unknown command '{}', type 'help'", other))),
    };
    Ok(Some(cmd))
}

pub fn describe_session(session: &Session) -> String {
    match session {
        Session::Anonymous => "not signed in".to_string(),
        Session::Authenticated { role, .. } => format!("signed in as {}", role),
    }
}

/// Run `cmd` against `app` and return what to show. Interactive concerns
/// (prompting for fields, delete confirmation) are handled by the caller.
pub async fn execute<A: ProductApi>(app: &mut App<A>, cmd: Command) -> AppResult<Step> {
    let outcome = match cmd {
        Command::Quit => return Ok(Step::Quit),
        Command::Help => return Ok(Step::Output(COMMAND_HELP.to_string())),
        Command::Status => {
            return Ok(Step::Output(format!("{} (view {})", describe_session(&app.session()), app.current_view().path())));
        }
        Command::Go(path) => { app.navigate(&path).await?; Outcome::Performed }
        Command::Refresh => { app.refresh().await?; Outcome::Performed }
        Command::Logout => { app.sign_out().await?; Outcome::Performed }
        Command::Login { email, password } => app.sign_in(&email, &password).await?,
        Command::Register(req) => app.register(&req).await?,
        Command::Submit(None) => {
            return Err(AppError::user("missing_field", "submit needs name=, type=, price= and description= fields"));
        }
        Command::Submit(Some(draft)) => app.submit(&draft).await?,
        Command::Convert { id, currency } => app.convert(id, currency.as_deref()).await?,
        Command::Approve(id) => app.set_status(id, ProductStatus::Approved).await?,
        Command::Reject(id) => app.set_status(id, ProductStatus::Rejected).await?,
        Command::Delete(id) => app.delete(id).await?,
    };
    // The redirect notice itself is part of the render.
    if let Outcome::Redirected(nav) = &outcome {
        debug!(target: "productdesk", requested = %nav.requested, shown = nav.view.path(), "action redirected");
    }
    Ok(Step::Output(app.render()))
}
