//! Archive link discovery.
//!
//! Only `<a href="...">` tags matter. Each href is resolved against the
//! page URL and kept when the resolved path ends in `.zip`, compared
//! case-insensitively. The HTML parser recovers from malformed markup the
//! way browsers do, so parsing never fails.
//!
//! ```rust
//! use reqwest::Url;
//! use zipmirror::index::ZipLinks;
//!
//! let base = Url::parse("https://example.com/files/").unwrap();
//! let html = r#"<a href="a.zip">a</a> <a href="b.txt">b</a> <a href="/c.ZIP">c"#;
//!
//! let links = ZipLinks::parse(&base, html);
//! let urls: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
//! assert_eq!(urls, ["https://example.com/files/a.zip", "https://example.com/c.ZIP"]);
//! ```

use crate::error::{Error, Result};

use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Ordered, de-duplicated archive URLs found on an index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipLinks {
    urls: Vec<Url>,
}

impl ZipLinks {
    /// Extract archive links from `html`, resolving them against `base`.
    ///
    /// URLs are de-duplicated by exact string match and keep the order of
    /// their first appearance.
    pub fn parse(base: &Url, html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        let anchors = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name().eq_ignore_ascii_case("a"));

        for anchor in anchors {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Ignoring unresolvable href {:?}: {}", href, e);
                    continue;
                }
            };
            if !matches!(url.scheme(), "http" | "https") || !is_zip_url(&url) {
                continue;
            }
            if seen.insert(url.as_str().to_owned()) {
                urls.push(url);
            }
        }

        Self { urls }
    }

    /// The discovered URLs, in page order.
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Iterate over the URLs in page order.
    pub fn iter(&self) -> std::slice::Iter<'_, Url> {
        self.urls.iter()
    }

    /// Number of distinct archive links.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// `true` when the page links to no archive.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl IntoIterator for ZipLinks {
    type Item = Url;
    type IntoIter = std::vec::IntoIter<Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'a> IntoIterator for &'a ZipLinks {
    type Item = &'a Url;
    type IntoIter = std::slice::Iter<'a, Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

/// Check if a URL points to a ZIP file.
pub fn is_zip_url(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".zip")
}

/// Fetch the index page and decode its body.
///
/// The body is decoded with the charset declared in `Content-Type`,
/// falling back to UTF-8; undecodable bytes are replaced. Fails with
/// [`Error::Timeout`] if the page has not fully arrived within `timeout`.
pub async fn fetch_index(
    client: &ClientWithMiddleware,
    base: &Url,
    timeout: Duration,
) -> Result<String> {
    debug!("Fetching index {}", base);
    let fetch = async {
        let res = client.get(base.clone()).send().await?.error_for_status()?;
        Ok::<_, Error>(res.text().await?)
    };
    tokio::time::timeout(timeout, fetch)
        .await
        .map_err(|_| Error::Timeout(timeout))?
}

/// Fetch the index page at `base` and return its archive links.
pub async fn discover(
    client: &ClientWithMiddleware,
    base: &Url,
    timeout: Duration,
) -> Result<ZipLinks> {
    let html = fetch_index(client, base, timeout).await?;
    let links = ZipLinks::parse(base, &html);
    debug!("Found {} archive link(s) on {}", links.len(), base);
    Ok(links)
}
