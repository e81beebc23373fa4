//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields, and [`Guests`].

use url::Url;

/// Trait implemented by all page queries. Provides URL construction and
/// shared builder methods for stay dates and guest counts.
pub trait Query {
    /// Builds the full page URL on top of the given origin.
    fn to_url(&self, base: &Url) -> Url;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the check-in date (`YYYY-MM-DD`).
    fn with_checkin(mut self, checkin: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().checkin = Some(checkin.to_string());
        self
    }

    /// Sets the check-out date (`YYYY-MM-DD`).
    fn with_checkout(mut self, checkout: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().checkout = Some(checkout.to_string());
        self
    }

    /// Replaces all four guest counts at once.
    fn with_guests(mut self, guests: Guests) -> Self
    where
        Self: Sized,
    {
        self.get_common().guests = guests;
        self
    }

    fn with_adults(mut self, adults: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().guests.adults = adults;
        self
    }

    fn with_children(mut self, children: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().guests.children = children;
        self
    }

    fn with_infants(mut self, infants: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().guests.infants = infants;
        self
    }

    fn with_pets(mut self, pets: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().guests.pets = pets;
        self
    }
}

/// Party composition. Defaults to one adult.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Guests {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub pets: u32,
}

impl Default for Guests {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
            pets: 0,
        }
    }
}

impl Guests {
    /// No guests at all; such a query carries no guest parameters.
    pub fn none() -> Self {
        Self {
            adults: 0,
            children: 0,
            infants: 0,
            pets: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.adults as u64 + self.children as u64 + self.infants as u64 + self.pets as u64
    }
}

/// Fields shared by all query types: stay dates and guests.
#[derive(Clone, Debug, Default)]
pub struct QueryCommon {
    pub checkin: Option<String>,
    pub checkout: Option<String>,
    pub guests: Guests,
}

impl QueryCommon {
    /// Appends the date and guest parameters to the URL.
    ///
    /// The four guest parameters travel together: all of them when any
    /// count is non-zero, none of them otherwise.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(checkin) = &self.checkin {
            url.query_pairs_mut().append_pair("checkin", checkin);
        };
        if let Some(checkout) = &self.checkout {
            url.query_pairs_mut().append_pair("checkout", checkout);
        };
        if self.guests.total() > 0 {
            url.query_pairs_mut()
                .append_pair("adults", &self.guests.adults.to_string())
                .append_pair("children", &self.guests.children.to_string())
                .append_pair("infants", &self.guests.infants.to_string())
                .append_pair("pets", &self.guests.pets.to_string());
        }
        url
    }
}

/// Replaces the path of `base` with `segments`, dropping any query or fragment.
pub(crate) fn with_path(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guests_default_to_one_adult() {
        let guests = Guests::default();
        assert_eq!(guests.adults, 1);
        assert_eq!(guests.total(), 1);
        assert_eq!(Guests::none().total(), 0);
    }

    #[test]
    fn no_guest_params_when_empty() {
        let url = Url::parse("https://example.com/rooms/1").unwrap();
        let common = QueryCommon {
            guests: Guests::none(),
            ..QueryCommon::default()
        };
        assert_eq!(common.add_to_url(&url).query(), None);
    }

    #[test]
    fn with_path_drops_query() {
        let base = Url::parse("https://example.com/old/path?x=1#frag").unwrap();
        let url = with_path(&base, &["s", "New York", "homes"]);
        assert_eq!(url.as_str(), "https://example.com/s/New%20York/homes");
    }
}
