//! Starts telephone chains by posting quotes to a node at a fixed interval.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telephone::Envelope;

#[derive(Parser)]
#[command(name = "quote-feeder")]
#[command(about = "Feed quotes into a telephone node", long_about = None)]
struct Cli {
    /// Host of the node to feed.
    #[arg(long, env = "URL")]
    url: String,

    /// Port of the node to feed.
    #[arg(long, env = "PORT")]
    port: u16,

    /// File with one quote per line; blank lines are skipped.
    #[arg(long, default_value = "demos/quotes.txt")]
    quotes: PathBuf,

    /// Seconds between posts.
    #[arg(long, default_value_t = 15)]
    interval_secs: u64,

    /// Post every quote once, then exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_feeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let base = format!("http://{}:{}", cli.url, cli.port);
    let message_url = format!("{base}/message");
    let health_url = format!("{base}/health");

    let quotes: Vec<String> = std::fs::read_to_string(&cli.quotes)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    if quotes.is_empty() {
        return Err(format!("no quotes found in {}", cli.quotes.display()).into());
    }

    let client = reqwest::Client::new();

    let health = client
        .get(&health_url)
        .timeout(Duration::from_secs(5))
        .send()
        .await?;
    if health.status() != reqwest::StatusCode::OK {
        return Err(format!("health check failed ({}) for {health_url}", health.status()).into());
    }

    tracing::info!(
        url = %message_url,
        interval_secs = cli.interval_secs,
        quotes = quotes.len(),
        "Starting quote feeder"
    );

    let mut index = 0usize;
    loop {
        let quote = &quotes[index % quotes.len()];
        let result = client
            .post(&message_url)
            .timeout(Duration::from_secs(10))
            .json(&Envelope::first_hop(quote.as_str()))
            .send()
            .await;

        match result {
            Ok(response) => tracing::info!(
                number = index + 1,
                quote = %preview(quote),
                status = %response.status(),
                "Posted quote"
            ),
            Err(e) => tracing::error!(number = index + 1, error = %e, "Error posting quote"),
        }

        index += 1;
        if cli.once && index >= quotes.len() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(cli.interval_secs)).await;
    }

    Ok(())
}

/// First 50 characters of a quote for log lines.
fn preview(quote: &str) -> String {
    let mut short: String = quote.chars().take(50).collect();
    if short.len() < quote.len() {
        short.push_str("...");
    }
    short
}
