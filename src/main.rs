use color_eyre::eyre::{
    Result,
    eyre,
};

mod api;
mod client;
mod timers;
mod ui;

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_LOG_FILE: &str = "casino-tui.log";

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: casino-tui [--server-url <url>] [--log-file <path>]\n\
         \n\
         Flags:\n\
           --server-url <url> Casino portal server to connect to (default {})\n\
           --log-file <path>  Where to write the log (default {})",
        DEFAULT_SERVER_URL, DEFAULT_LOG_FILE,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<client::AppConfig> {
    let mut args = std::env::args().skip(1);
    let mut server_url: Option<String> = None;
    let mut log_file: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--server-url" => {
                let url = args
                    .next()
                    .ok_or_else(|| eyre!("--server-url requires a URL argument"))?;
                if server_url.is_some() {
                    return Err(eyre!("--server-url may only be specified once"));
                }
                server_url = Some(url);
            }
            "--log-file" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--log-file requires a path argument"))?;
                if log_file.is_some() {
                    return Err(eyre!("--log-file may only be specified once"));
                }
                log_file = Some(path);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    Ok(client::AppConfig {
        server_url: server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        log_file: log_file.unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    })
}

fn init_tracing(log_file: &str) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // The terminal belongs to ratatui, so logs go to a file.
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let app_config = parse_cli_args()?;
    let _log_guard = init_tracing(&app_config.log_file)?;
    tracing::info!(url = %app_config.server_url, "starting casino-tui client");
    client::run_app(app_config).await
}
