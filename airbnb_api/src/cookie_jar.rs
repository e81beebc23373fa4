//! Session cookie store for a single-origin client.

use std::sync::Mutex;

use reqwest::header::{HeaderMap, SET_COOKIE};

/// In-memory `name=value` cookie store.
///
/// Only the leading pair of each `Set-Cookie` entry is kept. Domain, path,
/// expiry and security attributes are ignored because the client only ever
/// talks to one origin. Entries are kept in insertion order and overwritten
/// in place when the same name is set again.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: Mutex<Vec<(String, String)>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every `Set-Cookie` header found in a response.
    pub fn record(&self, headers: &HeaderMap) {
        let values = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());
        self.record_set_cookies(values);
    }

    /// Records raw `Set-Cookie` header values.
    pub fn record_set_cookies<'a, I>(&self, values: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for raw in values {
            let Some((name, value)) = parse_set_cookie(raw) else {
                tracing::debug!("ignoring malformed Set-Cookie entry: {}", raw);
                continue;
            };
            match entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => entry.1 = value,
                None => entries.push((name, value)),
            }
        }
    }

    /// Renders the jar as a `Cookie` header value. Empty when the jar is empty.
    pub fn serialize(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `name=value; attr...` into its leading pair.
fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
