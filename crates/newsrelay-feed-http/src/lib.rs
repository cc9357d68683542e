// # HTTP Feed Source
//
// This crate provides the HTTP-based FeedSource for newsrelay.
//
// ## Behavior
//
// - One GET per feed URL, no retry
// - Body parsed with feed-rs (RSS 0.9x/1.0/2.0, Atom, JSON Feed)
// - Every failure (connect, timeout, non-2xx, malformed body) becomes
//   `FetchOutcome::Failed`; nothing is raised to the engine
//
// ## Entry Mapping
//
// - title: entry title text, empty when absent
// - link: the alternate link (or the first link), trimmed
// - entries without a usable link are skipped, they cannot be recorded

use async_trait::async_trait;
use newsrelay_core::traits::{FeedEntry, FeedSource, FetchOutcome};
use newsrelay_core::{Error, Result};
use std::time::Duration;

/// Default HTTP timeout for feed downloads (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every feed request
const USER_AGENT: &str = concat!("newsrelay/", env!("CARGO_PKG_VERSION"));

/// HTTP feed source
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    /// HTTP client
    client: reqwest::Client,

    /// Request timeout
    timeout: Duration,
}

impl HttpFeedSource {
    /// Create a feed source with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a feed source with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    /// Request timeout in use
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download the raw feed body
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("unexpected status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(format!("failed to read response: {}", e)))?;

        Ok(body.to_vec())
    }
}

impl Default for HttpFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let body = match self.download(url).await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::failed(e.to_string()),
        };

        match parse_entries(&body) {
            Ok(entries) => {
                tracing::debug!("Parsed {} entries from {} ({} bytes)", entries.len(), url, body.len());
                FetchOutcome::Fetched(entries)
            }
            Err(e) => FetchOutcome::failed(e.to_string()),
        }
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Parse a feed document into entries, in document order
///
/// # Returns
///
/// - `Ok(Vec<FeedEntry>)`: Every entry that has a storable link
/// - `Err(Error::InvalidInput)`: The body is not a recognizable feed
pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body)
        .map_err(|e| Error::invalid_input(format!("Failed to parse feed: {}", e)))?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = select_link(&entry)?;
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            Some(FeedEntry::new(title, link))
        })
        .collect();

    Ok(entries)
}

/// Pick the article link of an entry
///
/// Prefers a link with no `rel` or `rel="alternate"`, then any non-empty
/// link. Links spanning several lines are unusable as store keys.
fn select_link(entry: &feed_rs::model::Entry) -> Option<String> {
    let usable = |href: &str| !href.is_empty() && !href.contains(['\n', '\r']);

    let alternate = entry.links.iter().find(|link| {
        let rel = link.rel.as_deref().unwrap_or("");
        (rel.is_empty() || rel.eq_ignore_ascii_case("alternate")) && usable(link.href.trim())
    });

    let link = alternate.or_else(|| entry.links.iter().find(|link| usable(link.href.trim())));

    match link {
        Some(link) => Some(link.href.trim().to_string()),
        None => {
            tracing::debug!("Skipping entry without link: {}", entry.id);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Tech</title>
    <link>https://news.example</link>
    <description>Tech news</description>
    <item>
      <title>AMD launches chip</title>
      <link>https://news.example/1</link>
    </item>
    <item>
      <title>Fórmula 1: resultado</title>
      <link>  https://news.example/2  </link>
    </item>
    <item>
      <title>No link here</title>
      <description>orphan</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Science</title>
  <id>urn:uuid:feed</id>
  <updated>2024-05-01T12:00:00Z</updated>
  <entry>
    <title>NASA update</title>
    <id>urn:uuid:1</id>
    <updated>2024-05-01T12:00:00Z</updated>
    <link rel="related" href="https://science.example/related"/>
    <link rel="alternate" href="https://science.example/nasa"/>
  </entry>
</feed>"#;

    /// Serve one canned HTTP response on a local port
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/feed", addr)
    }

    #[test]
    fn test_parse_rss() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();

        assert_eq!(
            entries,
            vec![
                FeedEntry::new("AMD launches chip", "https://news.example/1"),
                FeedEntry::new("Fórmula 1: resultado", "https://news.example/2"),
            ]
        );
    }

    #[test]
    fn test_parse_atom_prefers_alternate_link() {
        let entries = parse_entries(ATOM.as_bytes()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "NASA update");
        assert_eq!(entries[0].link, "https://science.example/nasa");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let rss = r#"<rss version="2.0"><channel><title>t</title>
            <item><link>https://news.example/untitled</link></item>
            </channel></rss>"#;

        let entries = parse_entries(rss.as_bytes()).unwrap();
        assert_eq!(entries, vec![FeedEntry::new("", "https://news.example/untitled")]);
    }

    #[test]
    fn test_malformed_body_is_invalid_input() {
        let result = parse_entries(b"<html><body>not a feed</body></html>");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_source_name() {
        assert_eq!(HttpFeedSource::new().source_name(), "http");
    }

    #[test]
    fn test_custom_timeout() {
        let source = HttpFeedSource::with_timeout(Duration::from_secs(5));
        assert_eq!(source.timeout(), Duration::from_secs(5));
        assert_eq!(HttpFeedSource::default().timeout(), DEFAULT_HTTP_TIMEOUT);
    }

    #[tokio::test]
    async fn test_fetch_parses_served_feed() {
        let url = serve_once("200 OK", RSS).await;

        let outcome = HttpFeedSource::new().fetch(&url).await;
        assert_eq!(outcome.into_entries().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_fails() {
        let url = serve_once("404 Not Found", "gone").await;

        match HttpFeedSource::new().fetch(&url).await {
            FetchOutcome::Failed { reason } => assert!(reason.contains("404")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_fails() {
        let url = serve_once("200 OK", "definitely not xml").await;

        let outcome = HttpFeedSource::new().fetch(&url).await;
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = HttpFeedSource::new()
            .fetch(&format!("http://{}/feed", addr))
            .await;
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
    }
}
