//! Client configuration: environment defaults overridden by command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_API_URL: &str = "PRODUCTDESK_API_URL";
pub const ENV_SESSION_FILE: &str = "PRODUCTDESK_SESSION_FILE";
pub const ENV_TIMEOUT_SECS: &str = "PRODUCTDESK_TIMEOUT_SECS";

/// Where the session lives between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLocation {
    File(PathBuf),
    /// `--ephemeral`: keep the session in memory only.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session: SessionLocation,
    pub timeout: Duration,
    /// Skip the confirmation prompt before deletes.
    pub assume_yes: bool,
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    /// Run the interactive shell, or a single command when `command` is set.
    Run { config: ClientConfig, command: Option<String> },
}

pub fn default_session_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "productdesk")
        .map(|d| d.config_dir().join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".productdesk-session.json"))
}

impl ClientConfig {
    /// Defaults from the environment. `env` is a lookup so tests need not touch the
    /// process environment.
    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = env(ENV_API_URL).filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session = env(ENV_SESSION_FILE)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);
        let timeout = match env(ENV_TIMEOUT_SECS) {
            Some(v) => parse_secs(&v).with_context(|| format!("{} must be a positive number of seconds", ENV_TIMEOUT_SECS))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Ok(Self { api_url, session: SessionLocation::File(session), timeout, assume_yes: false })
    }
}

fn parse_secs(v: &str) -> Result<Duration> {
    let secs: u64 = v.trim().parse().map_err(|_| anyhow!("not a number: '{}'", v))?;
    if secs == 0 { bail!("timeout must be greater than zero"); }
    Ok(Duration::from_secs(secs))
}

fn flag_value(args: &[String], i: usize, name: &str) -> Result<String> {
    args.get(i + 1).cloned().ok_or_else(|| anyhow!("{} requires a value", name))
}

/// Parse flags (program name already removed) on top of `env` defaults.
pub fn parse_args(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Invocation> {
    let mut config = ClientConfig::from_env(env)?;
    let mut command: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => { config.api_url = flag_value(args, i, "--api")?; i += 2; }
            "--session" => { config.session = SessionLocation::File(PathBuf::from(flag_value(args, i, "--session")?)); i += 2; }
            "--timeout" => { config.timeout = parse_secs(&flag_value(args, i, "--timeout")?).context("--timeout")?; i += 2; }
            "--ephemeral" => { config.session = SessionLocation::Memory; i += 1; }
            "--yes" | "-y" => { config.assume_yes = true; i += 1; }
            "-c" | "--command" => { command = Some(flag_value(args, i, "-c")?); i += 2; }
            "-h" | "--help" => return Ok(Invocation::Help),
            unk => bail!("unrecognized argument: {}", unk),
        }
    }
    Ok(Invocation::Run { config, command })
}
