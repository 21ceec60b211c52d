use anyhow::Result;
use house_hunt::bot::{Assistant, Message};
use house_hunt::config::Config;
use house_hunt::format::Formatter;
use house_hunt::scrapers::HttpFetcher;
use house_hunt::store::{MemoryCache, MemoryStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Messages are read one per line as `user: text`, or plain `text`
fn parse_line(line: &str) -> Message {
    match line.split_once(": ") {
        Some((user, text)) if !user.is_empty() && !user.contains(char::is_whitespace) => {
            Message::new(user, text)
        }
        _ => Message::new("local", line),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🏠 House Hunt - send listing URLs, \"buy\", \"rent\", \"auction\" or /<listing>");

    let fetcher = HttpFetcher::with_config(config.fetch_config())?;
    let assistant = Assistant::new(
        MemoryStore::new(),
        MemoryCache::new(),
        Box::new(fetcher),
        Formatter::default(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match assistant.handle(&parse_line(&line)).await {
            Ok(reply) => println!("{}\n", reply),
            Err(e) => error!("Failed to handle message: {:#}", e),
        }
    }

    Ok(())
}
