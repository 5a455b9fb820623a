//! Development harness: search a query or resolve a product URL and print
//! the result as JSON. Proxy credentials are picked up from the environment.

use std::sync::Arc;

use anyhow::{bail, Result};

use pricewise_core::infrastructure::config::{ProxyConfig, ScraperConfig};
use pricewise_core::infrastructure::logging::init_logging;
use pricewise_core::{HttpClient, ProductResolver, SearchAggregator};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("pricewise_core=info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, argument) = match args.as_slice() {
        [command, argument] => (command.as_str(), argument.as_str()),
        _ => {
            eprintln!("usage: pricewise search <query> | pricewise resolve <url>");
            std::process::exit(2);
        }
    };

    let proxy = ProxyConfig::from_env();
    let fetcher = Arc::new(HttpClient::new(ScraperConfig::default(), proxy)?);

    match command {
        "search" => {
            let aggregator = SearchAggregator::new(fetcher)?;
            let results = aggregator.search(argument).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        "resolve" => {
            let resolver = ProductResolver::new(fetcher)?;
            match resolver.resolve(argument).await {
                Some(product) => println!("{}", serde_json::to_string_pretty(&product)?),
                None => bail!("could not resolve product, check the URL"),
            }
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}
