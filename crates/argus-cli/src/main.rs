use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use argus_client::{BingSearch, ReqwestFetcher, TelegramNotifier};
use argus_core::dispatcher::{DispatcherConfig, NotificationDispatcher};
use argus_core::engine::{DiscoveryEngine, EngineConfig};
use argus_core::error::AppError;
use argus_core::events::TracingReporter;
use argus_core::matcher::ProviderMatcher;
use argus_core::retry::{RetryPolicy, RetryingFetcher};
use argus_core::throttle::{ThrottleConfig, ThrottledFetcher};
use argus_core::traits::Fetcher;

mod sink;
use sink::FileSink;

#[derive(Parser)]
#[command(name = "argus", version, about = "Payment-provider discovery for webshops")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every keyword and record webshops matching the provider list
    Run {
        /// Keywords file, one search phrase per line
        #[arg(short, long)]
        keywords: PathBuf,

        /// Payment providers file, one provider name per line
        #[arg(short, long)]
        providers: PathBuf,

        /// Output directory (defaults to results_<timestamp>)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Telegram bot token for match notifications
        #[arg(long, env = "ARGUS_TELEGRAM_TOKEN")]
        telegram_token: Option<String>,

        /// Telegram chat id receiving the notifications
        #[arg(long, env = "ARGUS_TELEGRAM_CHAT")]
        telegram_chat: Option<String>,

        /// Pacing delay between results pages, in seconds
        #[arg(long, default_value_t = 1)]
        page_delay: u64,

        /// Pacing delay between notification sends, in seconds
        #[arg(long, default_value_t = 30)]
        send_delay: u64,

        /// Bounded retries for transient fetch failures (0 disables)
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Provider never forwarded to notifications (repeatable)
        #[arg(long = "exclude", default_values_t = [String::from("paypal")])]
        exclude: Vec<String>,
    },

    /// Fetch one URL and report which configured providers appear on it
    Probe {
        /// Page to check
        #[arg(short, long)]
        url: String,

        /// Payment providers file, one provider name per line
        #[arg(short, long)]
        providers: PathBuf,

        /// Fetch timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("argus=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            keywords,
            providers,
            out,
            telegram_token,
            telegram_chat,
            page_delay,
            send_delay,
            retries,
            exclude,
        } => {
            cmd_run(RunArgs {
                keywords,
                providers,
                out,
                telegram_token,
                telegram_chat,
                page_delay,
                send_delay,
                retries,
                exclude,
            })
            .await
        }
        Commands::Probe {
            url,
            providers,
            timeout,
        } => cmd_probe(&url, &providers, timeout).await,
    }
}

struct RunArgs {
    keywords: PathBuf,
    providers: PathBuf,
    out: Option<PathBuf>,
    telegram_token: Option<String>,
    telegram_chat: Option<String>,
    page_delay: u64,
    send_delay: u64,
    retries: u32,
    exclude: Vec<String>,
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let keywords = load_input_file(&args.keywords)?;
    let providers = load_input_file(&args.providers)?;

    let out_dir = args.out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "results_{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let results_path = out_dir.join("results.txt");
    let sink = FileSink::create(&results_path)?;

    let fetcher = ThrottledFetcher::new(
        RetryingFetcher::new(ReqwestFetcher::new()?, RetryPolicy::new(args.retries)),
        ThrottleConfig::default(),
    );
    let search = BingSearch::new()?;
    let matcher = ProviderMatcher::new(providers);
    let config = EngineConfig::default()
        .with_page_delay(Duration::from_secs(args.page_delay))
        .with_notify_exclude(args.exclude);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping at the next loop boundary");
            signal_cancel.cancel();
        }
    });

    let mut engine = DiscoveryEngine::new(fetcher, search, sink, matcher).with_config(config);

    let consumer = match (args.telegram_token.as_deref(), args.telegram_chat.as_deref()) {
        (Some(token), Some(chat)) => {
            let notifier = TelegramNotifier::new(token, chat)?;
            let (handle, task) = NotificationDispatcher::spawn(
                notifier,
                DispatcherConfig::default()
                    .with_send_delay(Duration::from_secs(args.send_delay)),
                cancel.clone(),
            );
            engine = engine.with_notifications(handle);
            Some(task)
        }
        (None, None) => None,
        _ => {
            tracing::warn!(
                "Both --telegram-token and --telegram-chat are required; notifications disabled"
            );
            None
        }
    };

    let outcome = engine.run(&keywords, &cancel, &TracingReporter).await;

    // Dropping the engine drops the dispatcher handle: the consumer drains
    // whatever is still queued, then exits.
    drop(engine);
    if let Some(task) = consumer {
        match task.await {
            Ok(delivered) => tracing::info!(%delivered, "Notifications delivered"),
            Err(e) => tracing::warn!(error = %e, "Notification consumer failed"),
        }
    }

    let summary = outcome?;
    println!(
        "Checked {} candidates across {} pages; {} matches recorded in {}",
        summary.candidates_checked,
        summary.pages_fetched,
        summary.matches,
        results_path.display()
    );

    Ok(())
}

async fn cmd_probe(url: &str, providers_path: &Path, timeout: u64) -> Result<()> {
    let providers = load_input_file(providers_path)?;
    let matcher = ProviderMatcher::new(providers);
    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(timeout))?;

    tracing::info!(%url, "Fetching");
    let body = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    let found = matcher.find_in(&body);
    if found.is_empty() {
        println!("No configured providers found on {url}");
    } else {
        println!("Payment Providers Found: {}", found.join(", "));
    }

    Ok(())
}

/// Load a non-empty line-per-entry input file, trimming blanks.
fn load_input_file(path: &Path) -> Result<Vec<String>, AppError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::InvalidInput(format!("cannot read {}: {e}", path.display())))?;

    let entries: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if entries.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} contains no entries",
            path.display()
        )));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn input_file_trims_and_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  buy shoes  \n\nbuy boots\n   \n").unwrap();

        let entries = load_input_file(file.path()).unwrap();
        assert_eq!(entries, vec!["buy shoes", "buy boots"]);
    }

    #[test]
    fn empty_input_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_input_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn missing_input_file_is_rejected() {
        let err = load_input_file(Path::new("/no/such/file.txt")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
