use anyhow::Result;
use clap::Args;
use airbnb_lib::{Count, Scraper, SearchParams};

use crate::output::{ensure_success, print_json, print_search_table, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    /// Location to search (e.g. "Paris" or "San Francisco, CA")
    #[arg(long)]
    pub location: Option<String>,

    /// Google Maps place id; may replace --location
    #[arg(long)]
    pub place_id: Option<String>,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    pub checkin: Option<String>,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    pub checkout: Option<String>,

    /// Number of adults (default 1)
    #[arg(long)]
    pub adults: Option<u32>,

    #[arg(long)]
    pub children: Option<u32>,

    #[arg(long)]
    pub infants: Option<u32>,

    #[arg(long)]
    pub pets: Option<u32>,

    /// Minimum nightly price
    #[arg(long)]
    pub min_price: Option<u32>,

    /// Maximum nightly price
    #[arg(long)]
    pub max_price: Option<u32>,

    /// Pagination cursor from a previous search
    #[arg(long)]
    pub cursor: Option<String>,
}

impl SearchArgs {
    pub fn to_params(&self, ignore_robots_txt: bool) -> SearchParams {
        SearchParams {
            location: self.location.clone(),
            place_id: self.place_id.clone(),
            checkin: self.checkin.clone(),
            checkout: self.checkout.clone(),
            adults: self.adults.map(Count::from),
            children: self.children.map(Count::from),
            infants: self.infants.map(Count::from),
            pets: self.pets.map(Count::from),
            min_price: self.min_price.map(Count::from),
            max_price: self.max_price.map(Count::from),
            cursor: self.cursor.clone(),
            ignore_robots_text: ignore_robots_txt,
        }
    }
}

pub async fn run(
    args: &SearchArgs,
    scraper: &Scraper,
    ignore_robots_txt: bool,
    format: &OutputFormat,
) -> Result<()> {
    let result = scraper.search(&args.to_params(ignore_robots_txt)).await;

    if let OutputFormat::Envelope = format {
        print_json(&result);
    }
    let payload = ensure_success(&result)?;

    let count = payload["searchResults"].as_array().map_or(0, |r| r.len());
    eprintln!("{} results from {}", count, payload["searchUrl"].as_str().unwrap_or(""));
    if let Some(cursor) = payload
        .pointer("/paginationInfo/nextPageCursor")
        .and_then(|c| c.as_str())
    {
        eprintln!("Next page: --cursor {}", cursor);
    }

    match format {
        OutputFormat::Table => print_search_table(&payload),
        OutputFormat::Json => print_json(&payload),
        OutputFormat::Envelope => {}
    }

    Ok(())
}
