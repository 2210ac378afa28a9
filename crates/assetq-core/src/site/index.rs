//! Listing-page indexer.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;

use super::fetch::PageSource;
use super::links::extract_ids;
use crate::config::SiteProfile;
use crate::control::StopToken;
use crate::runner::SiteIndexer;

const PAGE_PLACEHOLDER: &str = "{page}";

/// Indexes a site by fetching its listing page(s) and extracting ids.
///
/// With a `{page}` placeholder in the listing URL, pages `start_page`,
/// `start_page + 1`, ... are fetched until one yields no id that was not
/// already seen (the "load more" produced nothing new), `max_pages` pages have
/// been fetched, or a stop is requested. A fetch error on the first page is
/// fatal; on later pages it is taken as the end of the listing.
pub struct HttpIndexer<S> {
    source: S,
    listing_url: String,
    id_pattern: Regex,
    start_page: u32,
    max_pages: Option<u32>,
}

impl<S: PageSource> HttpIndexer<S> {
    pub fn new(source: S, profile: &SiteProfile) -> Result<Self> {
        let id_pattern = Regex::new(&profile.id_pattern)
            .with_context(|| format!("invalid id_pattern: {}", profile.id_pattern))?;
        Ok(Self {
            source,
            listing_url: profile.listing_url.clone(),
            id_pattern,
            start_page: profile.start_page.max(1),
            max_pages: profile.max_pages,
        })
    }

    fn fetch_ids(&self, url: &str) -> Result<Vec<String>> {
        let html = self
            .source
            .fetch(url)
            .with_context(|| format!("fetch listing {}", url))?;
        Ok(extract_ids(&html, &self.id_pattern))
    }
}

impl<S: PageSource> SiteIndexer for HttpIndexer<S> {
    fn index(&mut self, stop: &StopToken) -> Result<Vec<String>> {
        if !self.listing_url.contains(PAGE_PLACEHOLDER) {
            let ids = self.fetch_ids(&self.listing_url)?;
            tracing::info!(count = ids.len(), "indexed listing {}", self.listing_url);
            return Ok(ids);
        }

        let mut all = Vec::new();
        let mut seen = HashSet::new();
        let mut page = self.start_page;
        loop {
            if stop.is_stop_requested() {
                tracing::warn!(page, "indexing stopped by request");
                break;
            }
            if self.max_pages.is_some_and(|max| page - self.start_page >= max) {
                tracing::info!(page, "reached max_pages");
                break;
            }
            let url = self.listing_url.replace(PAGE_PLACEHOLDER, &page.to_string());
            let ids = match self.fetch_ids(&url) {
                Ok(ids) => ids,
                Err(e) if page > self.start_page => {
                    tracing::info!(page, "listing ended: {:#}", e);
                    break;
                }
                Err(e) => return Err(e),
            };
            let before = all.len();
            for id in ids {
                if seen.insert(id.clone()) {
                    all.push(id);
                }
            }
            if all.len() == before {
                tracing::info!(page, "reached end of listing");
                break;
            }
            tracing::debug!(page, new = all.len() - before, "loading more assets");
            page += 1;
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::FetchError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MapSource {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl MapSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for MapSource {
        fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Http {
                url: url.to_string(),
                code: 404,
            })
        }
    }

    fn profile(listing_url: &str) -> SiteProfile {
        SiteProfile {
            listing_url: listing_url.to_string(),
            detail_url: "http://site/view/{id}".to_string(),
            id_pattern: r#"data-id="(\w+)""#.to_string(),
            link_pattern: r#"href="(?P<url>[^"]+)""#.to_string(),
            exclude_labels: Vec::new(),
            link_delay_secs: 0.0,
            start_page: 1,
            max_pages: None,
        }
    }

    #[test]
    fn single_listing_page() {
        let source = MapSource::new(&[(
            "http://site/list",
            r#"<i data-id="a"></i><i data-id="b"></i><i data-id="a"></i>"#,
        )]);
        let mut indexer = HttpIndexer::new(&source, &profile("http://site/list")).unwrap();
        assert_eq!(indexer.index(&StopToken::new()).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn paginates_until_nothing_new() {
        let source = MapSource::new(&[
            ("http://site/list/1", r#"<i data-id="a"></i><i data-id="b"></i>"#),
            ("http://site/list/2", r#"<i data-id="b"></i><i data-id="c"></i>"#),
            ("http://site/list/3", r#"<i data-id="c"></i>"#),
            ("http://site/list/4", r#"<i data-id="d"></i>"#),
        ]);
        let mut indexer = HttpIndexer::new(&source, &profile("http://site/list/{page}")).unwrap();
        assert_eq!(indexer.index(&StopToken::new()).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(source.requested.borrow().len(), 3);
    }

    #[test]
    fn missing_later_page_ends_listing() {
        let source = MapSource::new(&[("http://site/p1", r#"<i data-id="a"></i>"#)]);
        let mut indexer = HttpIndexer::new(&source, &profile("http://site/p{page}")).unwrap();
        assert_eq!(indexer.index(&StopToken::new()).unwrap(), vec!["a"]);
    }

    #[test]
    fn missing_first_page_is_an_error() {
        let source = MapSource::new(&[]);
        let mut indexer = HttpIndexer::new(&source, &profile("http://site/p{page}")).unwrap();
        assert!(indexer.index(&StopToken::new()).is_err());
    }

    #[test]
    fn max_pages_and_stop() {
        let source = MapSource::new(&[
            ("http://site/p1", r#"<i data-id="a"></i>"#),
            ("http://site/p2", r#"<i data-id="b"></i>"#),
        ]);
        let mut p = profile("http://site/p{page}");
        p.max_pages = Some(1);
        let mut indexer = HttpIndexer::new(&source, &p).unwrap();
        assert_eq!(indexer.index(&StopToken::new()).unwrap(), vec!["a"]);

        let stop = StopToken::new();
        stop.request_stop();
        let mut indexer = HttpIndexer::new(&source, &profile("http://site/p{page}")).unwrap();
        assert!(indexer.index(&stop).unwrap().is_empty());
    }

    #[test]
    fn start_page_skips_earlier_pages() {
        let source = MapSource::new(&[
            ("http://site/p1", r#"<i data-id="a"></i>"#),
            ("http://site/p2", r#"<i data-id="b"></i>"#),
            ("http://site/p3", r#"<i data-id="c"></i>"#),
            ("http://site/p4", r#"<i data-id="d"></i>"#),
        ]);
        let mut p = profile("http://site/p{page}");
        p.start_page = 2;
        p.max_pages = Some(2);
        let mut indexer = HttpIndexer::new(&source, &p).unwrap();
        assert_eq!(indexer.index(&StopToken::new()).unwrap(), vec!["b", "c"]);
        assert_eq!(
            *source.requested.borrow(),
            vec!["http://site/p2", "http://site/p3"]
        );
    }

    #[test]
    fn missing_start_page_is_an_error() {
        let source = MapSource::new(&[("http://site/p1", r#"<i data-id="a"></i>"#)]);
        let mut p = profile("http://site/p{page}");
        p.start_page = 5;
        let mut indexer = HttpIndexer::new(&source, &p).unwrap();
        assert!(indexer.index(&StopToken::new()).is_err());
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let mut p = profile("http://site/list");
        p.id_pattern = "(".to_string();
        assert!(HttpIndexer::new(UnusedSource, &p).is_err());
    }

    struct UnusedSource;

    impl PageSource for UnusedSource {
        fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            unreachable!()
        }
    }
}
