use url::Url;

use super::{
    common::{with_path, QueryCommon},
    Query,
};

/// Listing details page: `/rooms/{id}`.
#[derive(Clone, Debug)]
pub struct ListingQuery {
    pub common: QueryCommon,
    pub id: String,
}

impl ListingQuery {
    pub fn new(id: &str) -> Self {
        Self {
            common: QueryCommon::default(),
            id: id.to_string(),
        }
    }
}

impl Query for ListingQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn to_url(&self, base: &Url) -> Url {
        let url = with_path(base, &["rooms", self.id.as_str()]);
        self.add_to_url(&url)
    }

    fn add_to_url(&self, url: &Url) -> Url {
        self.common.add_to_url(url)
    }
}
