//! Address bar input handling.

use thiserror::Error;
use url::Url;

/// Default search endpoint for queries typed into the address bar.
pub const DEFAULT_SEARCH_URL: &str = "https://www.bing.com/search";

/// Errors turning address bar input into a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("invalid address {input}: {source}")]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Resolves address bar input into a URL to load.
///
/// Input with no `.` or with a space is a search query for `search_url`.
/// Anything else is treated as an address, with `https://` assumed when no
/// `http://` or `https://` scheme is given.
pub fn resolve_input(input: &str, search_url: &str) -> Result<Url, AddressError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    if is_search_query(input) {
        return Url::parse_with_params(search_url, &[("q", input)]).map_err(|source| {
            AddressError::Invalid {
                input: search_url.to_string(),
                source,
            }
        });
    }

    let lower = input.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    Url::parse(&candidate).map_err(|source| AddressError::Invalid {
        input: input.to_string(),
        source,
    })
}

fn is_search_query(input: &str) -> bool {
    !input.contains('.') || input.contains(' ')
}

/// Lower-cased host of a URL, without port or credentials.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Extracts a host from either a full URL or a bare host name.
pub fn host_from_str(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(input) {
        if let Some(host) = host_of(&url) {
            return Some(host);
        }
    }
    Url::parse(&format!("https://{input}"))
        .ok()
        .as_ref()
        .and_then(host_of)
}
