use url::Url;

use super::{
    common::{with_path, QueryCommon},
    Query,
};

/// Search results page: `/s/{location}/homes`.
///
/// When only a place id is known the location segment is omitted and the
/// page is addressed as `/s/homes?place_id=...`.
#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    pub common: QueryCommon,
    pub location: Option<String>,
    pub place_id: Option<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub cursor: Option<String>,
}

impl Query for SearchQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn to_url(&self, base: &Url) -> Url {
        let url = match &self.location {
            Some(location) => with_path(base, &["s", location.as_str(), "homes"]),
            None => with_path(base, &["s", "homes"]),
        };
        self.add_to_url(&url)
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(place_id) = &self.place_id {
            url.query_pairs_mut().append_pair("place_id", place_id);
        };
        let mut url = self.common.add_to_url(&url);
        if let Some(price_min) = self.price_min {
            url.query_pairs_mut()
                .append_pair("price_min", &price_min.to_string());
        };
        if let Some(price_max) = self.price_max {
            url.query_pairs_mut()
                .append_pair("price_max", &price_max.to_string());
        };
        if let Some(cursor) = &self.cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        };
        url
    }
}

impl SearchQuery {
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_place_id(mut self, place_id: &str) -> Self {
        self.place_id = Some(place_id.to_string());
        self
    }

    pub fn with_price_min(mut self, price_min: u32) -> Self {
        self.price_min = Some(price_min);
        self
    }

    pub fn with_price_max(mut self, price_max: u32) -> Self {
        self.price_max = Some(price_max);
        self
    }

    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.cursor = Some(cursor.to_string());
        self
    }
}
