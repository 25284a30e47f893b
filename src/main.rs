//! moviebot - Entry Point
//!
//! Runs the Telegram bot. Configuration comes from the environment
//! (optionally a `.env` file).

use moviebot::{Config, SystemMonitor};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");
    let version_mode = args.iter().any(|a| a == "--version" || a == "-V");

    if version_mode {
        println!("moviebot v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if help_mode {
        println!("moviebot v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: moviebot [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --help, -h       Show this help");
        println!("  --version, -V    Show version");
        println!();
        println!("Environment variables:");
        println!("  TELEGRAM_BOT_TOKEN   Telegram bot token (required)");
        println!("  GEMINI_API_KEY       Gemini API key (required)");
        println!("  GEMINI_MODEL         Gemini model (default: gemini-2.0-flash)");
        println!("  GEMINI_API_URL       Gemini REST base URL");
        println!("  MOVIE_API_KEY        Movie metadata API key (required)");
        println!("  MOVIE_API_URL        Movie metadata API base URL");
        println!("  BOT_DISPLAY_NAME     Name shown in /start");
        println!("  BOT_OWNER            Credit line shown in /start");
        println!("  RUST_LOG             trace|debug|info|warn|error (default: info)");
        println!("  LOG_FORMAT           pretty|json (default: pretty)");
        return Ok(());
    }

    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("moviebot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let monitor = SystemMonitor::new()?;

    moviebot::telegram::run_telegram_bot(config, monitor).await?;

    Ok(())
}
