//! Default fetcher: HTTP(S) downloads plus local `file://` copies.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use url::Url;

use super::{FetchError, Fetcher};

const USER_AGENT: &str = concat!("hoist/", env!("CARGO_PKG_VERSION"));

/// Downloads artifacts over HTTP(S) with a blocking client.
///
/// `file://` URLs and bare filesystem paths are copied instead, which is
/// handy for artifacts staged on local disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn download(&self, url: Url, dest: &Path) -> Result<(), FetchError> {
        tracing::debug!(url = %url, dest = %dest.display(), "Downloading artifact");

        let mut response = self.client.get(url.clone()).send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        ensure_parent(dest)?;
        let mut file = File::create(dest)?;
        let bytes = response.copy_to(&mut file)?;

        tracing::debug!(url = %url, bytes, "Downloaded artifact");
        Ok(())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, location: &str, dest: &Path) -> Result<(), FetchError> {
        match parse_location(location)? {
            Source::Remote(url) => self.download(url, dest),
            Source::Local(path) => {
                ensure_parent(dest)?;
                fs::copy(&path, dest)?;
                Ok(())
            }
        }
    }
}

fn parse_location(location: &str) -> Result<Source, FetchError> {
    let invalid = |reason: String| FetchError::InvalidLocation {
        location: location.to_string(),
        reason,
    };

    match Url::parse(location) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(Source::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Source::Local)
                .map_err(|()| invalid("not a local file path".to_string())),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Source::Local(PathBuf::from(location)))
        }
        Err(e) => Err(invalid(e.to_string())),
    }
}

fn ensure_parent(dest: &Path) -> Result<(), FetchError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
