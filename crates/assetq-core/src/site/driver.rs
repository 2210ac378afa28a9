//! Detail-page driver: find links, filter by label, trigger transfers.

use anyhow::{Context, Result};
use regex::Regex;
use std::time::Duration;

use super::fetch::PageSource;
use super::filename::filename_for_link;
use super::links::{extract_links, LabelFilter};
use super::transfer::{TransferStart, TransferStarter};
use crate::config::SiteProfile;
use crate::runner::{ItemOutcome, LinkFailure, PageDriver};

pub struct HttpPageDriver<S, T> {
    source: S,
    transfers: T,
    detail_url: String,
    link_pattern: Regex,
    filter: LabelFilter,
    link_delay: Duration,
    link_failures: Vec<LinkFailure>,
}

impl<S: PageSource, T: TransferStarter> HttpPageDriver<S, T> {
    pub fn new(source: S, transfers: T, profile: &SiteProfile) -> Result<Self> {
        let link_pattern = Regex::new(&profile.link_pattern)
            .with_context(|| format!("invalid link_pattern: {}", profile.link_pattern))?;
        Ok(Self {
            source,
            transfers,
            detail_url: profile.detail_url.clone(),
            link_pattern,
            filter: LabelFilter::new(&profile.exclude_labels),
            link_delay: profile.link_delay(),
            link_failures: Vec::new(),
        })
    }

    pub fn detail_url_for(&self, asset_id: &str) -> String {
        self.detail_url.replace("{id}", asset_id)
    }

    fn fail_link(&mut self, label: &str, reason: String) {
        tracing::warn!(label, "failed to request: {}", reason);
        self.link_failures.push(LinkFailure {
            label: label.to_string(),
            reason,
        });
    }
}

impl<S: PageSource, T: TransferStarter> PageDriver for HttpPageDriver<S, T> {
    fn process(&mut self, asset_id: &str) -> ItemOutcome {
        self.link_failures.clear();
        let url = self.detail_url_for(asset_id);
        let html = match self.source.fetch(&url) {
            Ok(html) => html,
            Err(e) => return ItemOutcome::Error(e.to_string()),
        };

        let links = extract_links(&html, &url, &self.link_pattern);
        if links.is_empty() {
            return ItemOutcome::NoLinksFound;
        }

        let mut requested = 0;
        let mut triggered = 0;
        for link in &links {
            if self.filter.excludes(&link.label) {
                tracing::debug!(label = %link.label, "skipping excluded format");
                continue;
            }
            let Some(file_name) = filename_for_link(&link.url) else {
                self.fail_link(&link.label, format!("no file name in {}", link.url));
                continue;
            };
            if triggered > 0 && !self.link_delay.is_zero() {
                std::thread::sleep(self.link_delay);
            }
            tracing::info!(label = %link.label, file = %file_name, "requesting");
            match self.transfers.start(&link.url, &file_name) {
                Ok(TransferStart::Started) => {
                    requested += 1;
                    triggered += 1;
                }
                Ok(TransferStart::AlreadyPresent) => requested += 1,
                Err(e) => self.fail_link(&link.label, format!("{:#}", e)),
            }
        }
        ItemOutcome::Success(requested)
    }

    fn take_link_failures(&mut self) -> Vec<LinkFailure> {
        std::mem::take(&mut self.link_failures)
    }
}
