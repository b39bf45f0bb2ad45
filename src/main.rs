use anyhow::{anyhow, Result};
use ddnsgate::auth::password;
use ddnsgate::{Config, LoggingExecutor, Shared};
use is_terminal::IsTerminal;
use std::io::BufRead;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_FILE: &str = "config.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, arg) = (
        first_args.next().unwrap_or("ddnsgate".to_string()),
        first_args.next(),
    );

    match arg.as_deref() {
        Some("hash") => hash_from_stdin(),
        Some("-h" | "--help") => Err(anyhow!(
            "usage: {program_name} [/path/to/config.json]\n       {program_name} hash < password"
        )),
        _ => serve(arg).await,
    }
}

async fn serve(config_file: Option<String>) -> Result<()> {
    let config = config_init(config_file)?;
    let executor = Arc::new(LoggingExecutor::default());

    tracing::info!("API listening on {}", &config.server.bind_addr);
    let api_server = ddnsgate::api::new(config.clone(), executor)?;
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn hash_from_stdin() -> Result<()> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let plain = line.trim_end_matches(['\r', '\n']);
    if plain.is_empty() {
        return Err(anyhow!("no password on stdin"));
    }
    println!("{}", password::hash_password(plain)?);
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ddnsgate=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<String>) -> Result<Shared> {
    let config_file = config_file.unwrap_or(DEFAULT_CONFIG_FILE.to_string());
    let config = Config::try_from_file(&config_file)?;
    tracing::debug!("loaded config from {config_file}");
    Ok(Arc::new(config))
}
