//! Aurelia Bot - Entry Point

use aurelia_bot::Config;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Aurelia Bot v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: aurelia-bot");
        println!();
        println!("Environment variables:");
        println!("  BOT_TOKEN                Telegram bot token (required)");
        println!("  PERCHANCE_API_URL        Text API endpoint");
        println!("  PERCHANCE_TIMEOUT_SECS   Request timeout (default: 30)");
        println!("  RUST_LOG                 Log level (default: info)");
        return Ok(());
    }

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🚀 Iniciando Aurelia Bot v{}...", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    aurelia_bot::telegram::run_telegram_bot(config).await
}
