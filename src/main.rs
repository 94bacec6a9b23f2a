use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use productdesk::api::HttpApi;
use productdesk::app::App;
use productdesk::cli::shell::{print_usage, run_once, run_repl};
use productdesk::config::{parse_args, Invocation, SessionLocation};
use productdesk::session::{FileStorage, MemoryStorage, SessionStore};

fn main() -> Result<()> {
    // Init logging; the shell owns stdout so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = env::args().collect();
    let program = if args.is_empty() { "productdesk".to_string() } else { args.remove(0) };

    let (config, command) = match parse_args(&args, |k| env::var(k).ok()) {
        Ok(Invocation::Help) => {
            print_usage(&program);
            return Ok(());
        }
        Ok(Invocation::Run { config, command }) => (config, command),
        Err(e) => {
            eprintln!("{:#}", e);
            print_usage(&program);
            std::process::exit(2);
        }
    };

    let session = match &config.session {
        SessionLocation::File(path) => {
            info!(target: "productdesk", path = %path.display(), "session file");
            SessionStore::initialize(FileStorage::new(path.clone()))
        }
        SessionLocation::Memory => SessionStore::initialize(MemoryStorage::new()),
    };
    let api = HttpApi::new(&config.api_url, config.timeout)?;
    info!(target: "productdesk", api = %api.base(), "productdesk starting");
    let mut app = App::new(api, Arc::new(session));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    match command {
        Some(line) => {
            if let Err(e) = run_once(&rt, &mut app, &line, config.assume_yes) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        None => run_repl(&rt, &mut app, config.assume_yes),
    }
}
