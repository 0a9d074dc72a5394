//! Autocomplete - trigger-driven completion overlay
//!
//! Runs an interactive one-line editor in the terminal where `@` and `#`
//! tokens open a dropdown of candidates, plus non-interactive commands to
//! scan a document or replay a scripted session.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! autocomplete
//!
//! # Scripted session
//! autocomplete replay --text "hello @al" down enter
//! ```

use tracing_subscriber::EnvFilter;

use autocomplete::Result;
use autocomplete::cli::CliInterface;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Execute the selected subcommand
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.execute().await
}

/// Initialize logging system
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so they never mix with command output or the terminal editor.
///
/// # Arguments
/// * `cli` - CLI interface with the effective configuration
fn initialize_logging(cli: &CliInterface) {
    let logging = &cli.config().logging;
    let level = logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
