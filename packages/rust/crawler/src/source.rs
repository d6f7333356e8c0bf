//! The page source seam: one stateful browsing session driven sequentially.
//!
//! The collector and the run loop only ever talk to [`PageSource`]. Session
//! setup, cookies and transport are the implementation's concern.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use jobscout_shared::{JobScoutError, Result, SourceConfig};

use crate::query::resolve_location;

// ---------------------------------------------------------------------------
// Snapshot and element types
// ---------------------------------------------------------------------------

/// A fetched document, kept as raw markup so it can cross await points.
#[derive(Debug, Clone, Default)]
pub struct DocumentSnapshot {
    /// Resolved location after redirects.
    pub location: String,
    /// Contents of `<title>`, if any.
    pub title: Option<String>,
    /// Raw HTML.
    pub html: String,
}

impl DocumentSnapshot {
    /// Build a snapshot from markup, reading `<title>` out of it.
    pub fn from_html(location: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            location: location.into(),
            title: document_title(&html),
            html,
        }
    }
}

/// Ordered list of CSS selectors; the first one that matches wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery {
    pub selectors: Vec<String>,
}

impl ElementQuery {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

/// An interactive element found on the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Selector that matched.
    pub selector: String,
    /// Link target carried by the element or its first descendant link.
    pub href: Option<String>,
    /// Visible text, whitespace-collapsed.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One logical browsing context. Never driven concurrently.
#[async_trait]
pub trait PageSource: Send {
    /// Load `url` and make it the current document.
    async fn navigate(&mut self, url: &str) -> Result<DocumentSnapshot>;

    /// Location of the current document (empty before the first navigation).
    fn current_location(&self) -> String;

    /// First element on the current document matching any selector, in order.
    async fn find_first(&mut self, query: &ElementQuery) -> Result<Option<ElementHandle>>;

    /// Activate (click/follow) an element. `Ok(false)` means the activation
    /// did not take effect and may be retried.
    async fn activate(&mut self, element: &ElementHandle) -> Result<bool>;

    /// Release session resources. Called on every run exit path.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// A [`PageSource`] over plain HTTP: activation follows the element's link.
pub struct HttpPageSource {
    client: Client,
    listing_base: Option<Url>,
    cookie: Option<String>,
    current: Option<DocumentSnapshot>,
}

impl HttpPageSource {
    /// Build the HTTP client from the source settings.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(if config.timeout.is_zero() {
                Duration::from_secs(30)
            } else {
                config.timeout
            })
            .build()
            .map_err(|e| JobScoutError::Session(format!("failed to build HTTP client: {e}")))?;

        let listing_base = match config.listing_url.trim() {
            "" => None,
            raw => Some(Url::parse(raw).map_err(|e| {
                JobScoutError::config(format!("invalid source.listing_url {raw}: {e}"))
            })?),
        };

        Ok(Self {
            client,
            listing_base,
            cookie: config.cookie.clone(),
            current: None,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<DocumentSnapshot> {
        debug!(%url, "fetching document");

        let mut request = self.client.get(url.as_str());
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| JobScoutError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let location = response.url().clone();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(JobScoutError::Session(format!("{url}: HTTP {status}")));
        }
        if is_auth_wall(&location) {
            return Err(JobScoutError::Session(format!(
                "{url}: redirected to sign-in at {location}"
            )));
        }
        if !status.is_success() {
            return Err(JobScoutError::Network(format!("{url}: HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| JobScoutError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(DocumentSnapshot::from_html(location.as_str(), html))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(skip_all, fields(url = %url))]
    async fn navigate(&mut self, url: &str) -> Result<DocumentSnapshot> {
        let parsed = resolve_location(self.listing_base.as_ref(), url)
            .map_err(|e| JobScoutError::validation(format!("invalid URL {url}: {e}")))?;
        let snapshot = self.fetch(&parsed).await?;
        self.current = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn current_location(&self) -> String {
        self.current
            .as_ref()
            .map(|doc| doc.location.clone())
            .unwrap_or_default()
    }

    async fn find_first(&mut self, query: &ElementQuery) -> Result<Option<ElementHandle>> {
        Ok(self
            .current
            .as_ref()
            .and_then(|doc| find_in_html(&doc.html, query)))
    }

    async fn activate(&mut self, element: &ElementHandle) -> Result<bool> {
        let Some(href) = element.href.as_deref() else {
            debug!(selector = %element.selector, "element carries no link");
            return Ok(false);
        };

        let base = self.current_location();
        let target = match Url::parse(&base).and_then(|b| b.join(href)) {
            Ok(target) => target,
            Err(_) => match Url::parse(href) {
                Ok(target) => target,
                Err(e) => {
                    warn!(href, error = %e, "unresolvable element link");
                    return Ok(false);
                }
            },
        };

        let snapshot = self.fetch(&target).await?;
        self.current = Some(snapshot);
        Ok(true)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether a resolved location is a sign-in interstitial.
fn is_auth_wall(url: &Url) -> bool {
    let path = url.path();
    path.starts_with("/authwall") || path.starts_with("/login") || path.starts_with("/checkpoint")
}

/// Text of the document's `<title>`, trimmed.
fn document_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Run an [`ElementQuery`] against raw markup.
pub fn find_in_html(html: &str, query: &ElementQuery) -> Option<ElementHandle> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]").ok()?;

    for selector in &query.selectors {
        let Ok(sel) = Selector::parse(selector) else {
            warn!(%selector, "skipping invalid selector");
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            let href = el
                .value()
                .attr("href")
                .or_else(|| {
                    el.select(&link_sel)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                })
                .map(str::to_string);
            let text = el.text().collect::<Vec<_>>().join(" ");
            return Some(ElementHandle {
                selector: selector.clone(),
                href,
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            });
        }
    }
    None
}
