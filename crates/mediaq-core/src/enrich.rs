//! Metadata enrichment: one concurrent lookup per link that needs one.
//!
//! Directory links are resolved to the first media URI found in their
//! listing; video-host links get a publish date scraped from their page.
//! Fetches run fully parallel in a [`JoinSet`]; results come back as
//! `(index, result)` pairs and are applied to the batch sequentially after
//! the full join, so no lock is held during mutation and workers cannot
//! interleave writes. Per-task failures are logged and leave the entry
//! untouched; the batch never loses an entry.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tokio::task::JoinSet;

use crate::error::AppError;
use crate::link::{Batch, LinkKind};
use crate::traits::Fetcher;

/// First http(s) URI ending in a known media extension. Quote and angle
/// characters terminate the match so an href attribute doesn't bleed into
/// surrounding markup.
static MEDIA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+\.(?:mp3|aac|mp4|flac)"#).expect("media URI regex")
});

/// First `YYYY-MM-DD` occurrence, the format video pages carry in their
/// datePublished metadata.
static PUBLISH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("publish date regex"));

/// Scan a directory listing for the first recognizable media URI.
pub fn extract_media_uri(listing: &str, url: &str) -> Result<String, AppError> {
    MEDIA_URI_RE
        .find(listing)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::NoMediaLink(url.to_string()))
}

/// Scan a video page for the first publish-date pattern and parse it.
pub fn extract_publish_date(page: &str, url: &str) -> Result<NaiveDate, AppError> {
    let caps = PUBLISH_DATE_RE
        .captures(page)
        .ok_or_else(|| AppError::NoPublishDate(url.to_string()))?;
    let text = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    // The pattern guarantees digits, so only range errors remain.
    let year: i32 = caps[1].parse().map_err(|_| AppError::InvalidDate(text.into()))?;
    let month: u32 = caps[2].parse().map_err(|_| AppError::InvalidDate(text.into()))?;
    let day: u32 = caps[3].parse().map_err(|_| AppError::InvalidDate(text.into()))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| AppError::InvalidDate(text.into()))
}

/// What one lookup task resolved for its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Enrichment {
    /// Directory lookup: the concrete media URI to play instead of the
    /// listing itself.
    ResolvedUri(String),
    /// Video-host lookup: the page's publish date.
    Published(NaiveDate),
}

/// Counters for one enrichment pass, reported after the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Lookup tasks spawned.
    pub spawned: usize,
    /// Tasks whose result was applied to the batch.
    pub resolved: usize,
    /// Tasks that failed (entry carried forward unresolved).
    pub failed: usize,
}

/// Runs the fan-out/fan-in enrichment stage over a closed batch.
///
/// Generic over [`Fetcher`] for dependency injection; no real HTTP needed
/// in tests.
pub struct EnrichService<F: Fetcher> {
    fetcher: F,
    recurse_directories: bool,
}

impl<F: Fetcher + 'static> EnrichService<F> {
    pub fn new(fetcher: F, recurse_directories: bool) -> Self {
        Self {
            fetcher,
            recurse_directories,
        }
    }

    /// Enrich every directory and video-host entry of `batch` in place.
    ///
    /// Blocks until every spawned task has completed, successful or not;
    /// no partial results are forwarded while tasks are outstanding.
    pub async fn enrich(&self, batch: &mut Batch) -> EnrichSummary {
        let mut tasks: JoinSet<(usize, Result<Enrichment, AppError>)> = JoinSet::new();

        for (index, entry) in batch.entries.iter().enumerate() {
            match entry.kind {
                LinkKind::Directory if self.recurse_directories => {
                    let fetcher = self.fetcher.clone();
                    let url = entry.text.clone();
                    tasks.spawn(async move {
                        let result = lookup_directory(&fetcher, &url).await;
                        (index, result)
                    });
                }
                LinkKind::VideoHost => {
                    let fetcher = self.fetcher.clone();
                    let url = entry.text.clone();
                    tasks.spawn(async move {
                        let result = lookup_publish_date(&fetcher, &url).await;
                        (index, result)
                    });
                }
                _ => {}
            }
        }

        let mut summary = EnrichSummary {
            spawned: tasks.len(),
            ..Default::default()
        };

        // Full join, then apply results sequentially by index.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(enrichment))) => {
                    let entry = &mut batch.entries[index];
                    match enrichment {
                        Enrichment::ResolvedUri(uri) => {
                            tracing::debug!(index, %uri, "Resolved directory entry");
                            entry.text = uri;
                        }
                        Enrichment::Published(date) => {
                            tracing::debug!(index, %date, "Resolved publish date");
                            entry.published = Some(date);
                        }
                    }
                    summary.resolved += 1;
                }
                Ok((index, Err(e))) => {
                    tracing::warn!(index, error = %e, "Enrichment lookup failed");
                    summary.failed += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Enrichment task panicked");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

async fn lookup_directory<F: Fetcher>(fetcher: &F, url: &str) -> Result<Enrichment, AppError> {
    let listing = fetcher.fetch(url).await?;
    let uri = extract_media_uri(&listing, url)?;
    Ok(Enrichment::ResolvedUri(uri))
}

async fn lookup_publish_date<F: Fetcher>(fetcher: &F, url: &str) -> Result<Enrichment, AppError> {
    let page = fetcher.fetch(url).await?;
    let date = extract_publish_date(&page, url)?;
    Ok(Enrichment::Published(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_media_uri_first_match() {
        let listing = r#"<a href="https://host/ep2.mp3">2</a> <a href="https://host/ep1.mp3">1</a>"#;
        assert_eq!(
            extract_media_uri(listing, "http://host/dir/").unwrap(),
            "https://host/ep2.mp3"
        );
    }

    #[test]
    fn test_extract_media_uri_stops_at_quote() {
        let listing = r#"before "http://host/a.flac" after"#;
        assert_eq!(
            extract_media_uri(listing, "http://host/dir/").unwrap(),
            "http://host/a.flac"
        );
    }

    #[test]
    fn test_extract_media_uri_all_extensions() {
        for ext in ["mp3", "aac", "mp4", "flac"] {
            let listing = format!("x https://host/file.{ext} y");
            assert_eq!(
                extract_media_uri(&listing, "u").unwrap(),
                format!("https://host/file.{ext}")
            );
        }
    }

    #[test]
    fn test_extract_media_uri_none() {
        let err = extract_media_uri("<html>nothing here</html>", "http://host/dir/").unwrap_err();
        assert!(matches!(err, AppError::NoMediaLink(_)));
    }

    #[test]
    fn test_extract_publish_date() {
        let page = r#"{"datePublished":"2020-01-05"}"#;
        assert_eq!(extract_publish_date(page, "u").unwrap(), date(2020, 1, 5));
    }

    #[test]
    fn test_extract_publish_date_first_occurrence() {
        let page = "uploaded 2019-12-31, updated 2020-01-05";
        assert_eq!(extract_publish_date(page, "u").unwrap(), date(2019, 12, 31));
    }

    #[test]
    fn test_extract_publish_date_missing() {
        let err = extract_publish_date("<html>no dates</html>", "u").unwrap_err();
        assert!(matches!(err, AppError::NoPublishDate(_)));
    }

    #[test]
    fn test_extract_publish_date_out_of_range() {
        let err = extract_publish_date("published 2020-13-40", "u").unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn test_directory_entry_replaced_with_matched_uri() {
        let fetcher = MockFetcher::with_pages(vec![(
            "http://host/dir/",
            Ok(r#"<a href="http://host/dir/a.mp3">a</a>"#.to_string()),
        )]);
        let mut batch = Batch::from_links(vec!["http://host/dir/".into(), "plain".into()]);

        let summary = EnrichService::new(fetcher, true).enrich(&mut batch).await;

        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(batch.entries[0].text, "http://host/dir/a.mp3");
        assert_eq!(batch.entries[1].text, "plain");
    }

    #[tokio::test]
    async fn test_failed_directory_lookup_leaves_text_unchanged() {
        let fetcher = MockFetcher::with_pages(vec![(
            "http://host/dir/",
            Err(AppError::HttpError("HTTP 500".into())),
        )]);
        let mut batch = Batch::from_links(vec!["http://host/dir/".into()]);

        let summary = EnrichService::new(fetcher, true).enrich(&mut batch).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(batch.entries[0].text, "http://host/dir/");
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_video_host_entry_gets_publish_date() {
        let url = "https://www.youtube.com/watch?v=abc";
        let fetcher =
            MockFetcher::with_pages(vec![(url, Ok("datePublished 2019-12-31".to_string()))]);
        let mut batch = Batch::from_links(vec![url.into()]);

        EnrichService::new(fetcher, true).enrich(&mut batch).await;

        assert_eq!(batch.entries[0].published, Some(date(2019, 12, 31)));
        // The link text itself stays untouched.
        assert_eq!(batch.entries[0].text, url);
    }

    #[tokio::test]
    async fn test_undated_video_host_entry_stays_undated() {
        let url = "https://www.youtube.com/watch?v=abc";
        let fetcher = MockFetcher::with_pages(vec![(url, Ok("<html>no meta</html>".to_string()))]);
        let mut batch = Batch::from_links(vec![url.into()]);

        let summary = EnrichService::new(fetcher, true).enrich(&mut batch).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(batch.entries[0].published, None);
    }

    #[tokio::test]
    async fn test_plain_entries_never_fetched() {
        let fetcher = MockFetcher::new("anything");
        let mut batch = Batch::from_links(vec!["plain-a".into(), "plain-b".into()]);

        let summary = EnrichService::new(fetcher.clone(), true).enrich(&mut batch).await;

        assert_eq!(summary.spawned, 0);
        assert!(fetcher.fetched_urls().is_empty());
    }

    #[tokio::test]
    async fn test_recursion_disabled_skips_directory_fetch() {
        let fetcher = MockFetcher::new("<a href='http://host/a.mp3'>a</a>");
        let mut batch = Batch::from_links(vec!["http://host/dir/".into()]);

        let summary = EnrichService::new(fetcher.clone(), false).enrich(&mut batch).await;

        assert_eq!(summary.spawned, 0);
        assert!(fetcher.fetched_urls().is_empty());
        assert_eq!(batch.entries[0].text, "http://host/dir/");
    }

    #[tokio::test]
    async fn test_concurrent_enrichment_never_loses_or_duplicates() {
        let n = 32;
        let mut pages = Vec::new();
        let mut links = Vec::new();
        for i in 0..n {
            let url = format!("http://host/dir{i}/");
            pages.push((url.clone(), Ok(format!("see https://host/file{i}.mp3 here"))));
            links.push(url);
        }
        let fetcher = MockFetcher::with_pages(pages);
        let mut batch = Batch::from_links(links);

        let summary = EnrichService::new(fetcher, true).enrich(&mut batch).await;

        assert_eq!(summary.spawned, n);
        assert_eq!(summary.resolved, n);
        assert_eq!(batch.len(), n);
        for (i, entry) in batch.entries.iter().enumerate() {
            assert_eq!(entry.text, format!("https://host/file{i}.mp3"));
            assert_eq!(entry.arrival, i);
        }
    }
}
