//! Flat parameter objects accepted by the two pipelines, with the coercion
//! and validation that turns them into URL queries.

use airbnb_api::{Guests, ListingQuery, Query, SearchQuery};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::PipelineError;

pub const MAX_TEXT_LENGTH: usize = 200;

/// A loosely typed count: integer, float or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Count {
    /// Floats truncate, negatives clamp to zero, strings are read up to the
    /// first non-digit and anything unreadable is zero.
    pub fn coerce(&self) -> u32 {
        match self {
            Self::Int(n) => (*n).clamp(0, u32::MAX as i64) as u32,
            Self::Float(f) if f.is_finite() => f.trunc().clamp(0.0, u32::MAX as f64) as u32,
            Self::Float(_) => 0,
            Self::Text(s) => leading_integer(s).clamp(0, u32::MAX as i64) as u32,
        }
    }
}

impl From<u32> for Count {
    fn from(n: u32) -> Self {
        Self::Int(n as i64)
    }
}

fn leading_integer(input: &str) -> i64 {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else {
            break;
        };
        value = value.saturating_mul(10).saturating_add(d as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

fn count_or(count: &Option<Count>, default: u32) -> u32 {
    count.as_ref().map(Count::coerce).unwrap_or(default)
}

/// Parameters of the search operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub location: Option<String>,
    pub place_id: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
    /// Defaults to 1 when absent.
    pub adults: Option<Count>,
    pub children: Option<Count>,
    pub infants: Option<Count>,
    pub pets: Option<Count>,
    pub min_price: Option<Count>,
    pub max_price: Option<Count>,
    pub cursor: Option<String>,
    pub ignore_robots_text: bool,
}

impl SearchParams {
    pub fn new(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Self::default()
        }
    }

    pub fn guests(&self) -> Guests {
        Guests {
            adults: count_or(&self.adults, 1),
            children: count_or(&self.children, 0),
            infants: count_or(&self.infants, 0),
            pets: count_or(&self.pets, 0),
        }
    }

    /// Validates the parameters and builds the page query.
    pub fn to_query(&self) -> Result<SearchQuery, PipelineError> {
        let location = optional_text(self.location.as_deref(), "location")?;
        let place_id = optional_text(self.place_id.as_deref(), "placeId")?;
        if location.is_none() && place_id.is_none() {
            return Err(PipelineError::InvalidInput(
                "location is required unless placeId is given".to_string(),
            ));
        }

        let mut query = SearchQuery::default().with_guests(self.guests());
        if let Some(location) = &location {
            query = query.with_location(location);
        }
        if let Some(place_id) = &place_id {
            query = query.with_place_id(place_id);
        }
        query = apply_dates(query, self.checkin.as_deref(), self.checkout.as_deref())?;

        let price_min = self.min_price.as_ref().map(Count::coerce);
        let price_max = self.max_price.as_ref().map(Count::coerce);
        if let (Some(min), Some(max)) = (price_min, price_max) {
            if min > max {
                return Err(PipelineError::InvalidInput(format!(
                    "minPrice ({}) is greater than maxPrice ({})",
                    min, max
                )));
            }
        }
        if let Some(min) = price_min {
            query = query.with_price_min(min);
        }
        if let Some(max) = price_max {
            query = query.with_price_max(max);
        }
        if let Some(cursor) = optional_text(self.cursor.as_deref(), "cursor")? {
            query = query.with_cursor(&cursor);
        }
        Ok(query)
    }
}

/// Parameters of the listing details operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingParams {
    pub id: String,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
    /// Defaults to 1 when absent.
    pub adults: Option<Count>,
    pub children: Option<Count>,
    pub infants: Option<Count>,
    pub pets: Option<Count>,
    pub ignore_robots_text: bool,
}

impl ListingParams {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn guests(&self) -> Guests {
        Guests {
            adults: count_or(&self.adults, 1),
            children: count_or(&self.children, 0),
            infants: count_or(&self.infants, 0),
            pets: count_or(&self.pets, 0),
        }
    }

    pub fn to_query(&self) -> Result<ListingQuery, PipelineError> {
        let id = optional_text(Some(&self.id), "id")?
            .ok_or_else(|| PipelineError::InvalidInput("id is required".to_string()))?;
        let query = ListingQuery::new(&id).with_guests(self.guests());
        apply_dates(query, self.checkin.as_deref(), self.checkout.as_deref())
    }
}

/// Strips control characters and trims; blank input counts as absent.
fn optional_text(input: Option<&str>, field: &str) -> Result<Option<String>, PipelineError> {
    let Some(input) = input else {
        return Ok(None);
    };
    if input.len() > MAX_TEXT_LENGTH {
        return Err(PipelineError::InvalidInput(format!(
            "{} exceeds maximum length of {} bytes",
            field, MAX_TEXT_LENGTH
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        Ok(None)
    } else {
        Ok(Some(sanitized))
    }
}

/// Validate a YYYY-MM-DD date string.
pub fn validate_date(input: &str, field: &str) -> Result<NaiveDate, PipelineError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        PipelineError::InvalidInput(format!(
            "invalid {} '{}'. Expected format: YYYY-MM-DD (e.g., 2025-06-01)",
            field, trimmed
        ))
    })
}

fn apply_dates<Q: Query>(
    mut query: Q,
    checkin: Option<&str>,
    checkout: Option<&str>,
) -> Result<Q, PipelineError> {
    let checkin = checkin
        .filter(|s| !s.trim().is_empty())
        .map(|s| validate_date(s, "checkin"))
        .transpose()?;
    let checkout = checkout
        .filter(|s| !s.trim().is_empty())
        .map(|s| validate_date(s, "checkout"))
        .transpose()?;
    if let (Some(checkin), Some(checkout)) = (checkin, checkout) {
        if checkout < checkin {
            return Err(PipelineError::InvalidInput(format!(
                "checkout ({}) is before checkin ({})",
                checkout, checkin
            )));
        }
    }
    if let Some(checkin) = checkin {
        query = query.with_checkin(&checkin.format("%Y-%m-%d").to_string());
    }
    if let Some(checkout) = checkout {
        query = query.with_checkout(&checkout.format("%Y-%m-%d").to_string());
    }
    Ok(query)
}
