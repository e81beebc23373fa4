mod common;
pub use self::common::{Guests, Query, QueryCommon};

mod search;
pub use self::search::SearchQuery;

mod listing;
pub use self::listing::ListingQuery;
