use anyhow::Result;
use clap::Args;
use airbnb_lib::{Count, ListingParams, Scraper};

use crate::output::{ensure_success, print_json, print_listing_table, OutputFormat};

#[derive(Args)]
pub struct ListingArgs {
    /// Listing id (the number in /rooms/<id>)
    pub id: String,

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
}

impl ListingArgs {
    pub fn to_params(&self, ignore_robots_txt: bool) -> ListingParams {
        ListingParams {
            id: self.id.clone(),
            checkin: self.checkin.clone(),
            checkout: self.checkout.clone(),
            adults: self.adults.map(Count::from),
            children: self.children.map(Count::from),
            infants: self.infants.map(Count::from),
            pets: self.pets.map(Count::from),
            ignore_robots_text: ignore_robots_txt,
        }
    }
}

pub async fn run(
    args: &ListingArgs,
    scraper: &Scraper,
    ignore_robots_txt: bool,
    format: &OutputFormat,
) -> Result<()> {
    let result = scraper
        .listing_details(&args.to_params(ignore_robots_txt))
        .await;

    if let OutputFormat::Envelope = format {
        print_json(&result);
    }
    let payload = ensure_success(&result)?;

    eprintln!("Details from {}", payload["listingUrl"].as_str().unwrap_or(""));

    match format {
        OutputFormat::Table => print_listing_table(&payload),
        OutputFormat::Json => print_json(&payload),
        OutputFormat::Envelope => {}
    }

    Ok(())
}
