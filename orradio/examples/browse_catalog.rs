//! Example: Browse the Radio Browser catalog
//!
//! Run with: cargo run -p orradio --example browse_catalog [search terms]

use orcache::InMemoryApiCache;
use orradio::{ApiServiceProvider, ModelLayer, Page, RadioBrowserClient, StationDirectory, StationQuery};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let provider = ApiServiceProvider::new(
        RadioBrowserClient::new().await?,
        ModelLayer::default(),
        Arc::new(InMemoryApiCache::new()),
    );
    let page = Page::first(10);

    println!("=== Top categories ===");
    for category in provider.categories().await?.iter().take(10) {
        println!("  {:<30} {:>6} stations", category.name, category.station_count);
    }

    println!("\n=== Popular stations ===");
    for station in provider.stations(&StationQuery::Popular, page).await? {
        println!("  {} [{}]", station.name, station.media_subtitle());
    }

    let terms: Vec<String> = std::env::args().skip(1).collect();
    if !terms.is_empty() {
        let query = terms.join(" ");
        println!("\n=== Search: {} ===", query);
        for station in provider.search(&query, page).await? {
            let stream = provider.resolve_stream_url(&station).await?;
            println!("  {} -> {}", station.name, stream);
        }
    }

    Ok(())
}
