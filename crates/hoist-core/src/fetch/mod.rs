//! Artifact retrieval
//!
//! The engine only depends on the narrow [`Fetcher`] contract: copy the bytes
//! behind a source location into a destination file, or fail. Closures with
//! the same shape implement it, which keeps test doubles trivial.

pub mod http;

use std::path::Path;

pub use http::HttpFetcher;

/// Errors produced while retrieving an artifact.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid artifact location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Retrieves an artifact from `location` and writes it to `dest`.
pub trait Fetcher {
    fn fetch(&self, location: &str, dest: &Path) -> Result<(), FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str, &Path) -> Result<(), FetchError>,
{
    fn fetch(&self, location: &str, dest: &Path) -> Result<(), FetchError> {
        self(location, dest)
    }
}

/// The fetcher used when nothing else is injected.
pub fn default_fetcher() -> Result<HttpFetcher, FetchError> {
    HttpFetcher::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closures_act_as_fetchers() {
        let seen = RefCell::new(Vec::new());
        let fetcher = |location: &str, dest: &Path| -> Result<(), FetchError> {
            seen.borrow_mut()
                .push((location.to_string(), dest.to_path_buf()));
            Ok(())
        };

        fetcher
            .fetch("https://example.com/app_1.tar.gz", Path::new("/tmp/app_1"))
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "https://example.com/app_1.tar.gz");
    }
}
