//! Pattern-based extraction of asset ids and download links from page HTML.

use regex::Regex;
use std::collections::HashSet;

use super::filename::filename_for_link;

/// A download trigger found on a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Absolute URL.
    pub url: String,
    /// Visible label, or the derived file name when the page gives none.
    pub label: String,
}

/// Ids captured by the first group of `pattern`, in document order, without repeats.
pub fn extract_ids(html: &str, pattern: &Regex) -> Vec<String> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

/// Download links matched by `pattern`. The URL comes from the `url` group (or
/// group 1) and is resolved against `base_url`; the label from the optional
/// `label` group. Duplicate URLs keep their first occurrence.
pub fn extract_links(html: &str, base_url: &str, pattern: &Regex) -> Vec<LinkCandidate> {
    let base = url::Url::parse(base_url).ok();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in pattern.captures_iter(html) {
        let Some(href) = caps.name("url").or_else(|| caps.get(1)) else {
            continue;
        };
        let href = unescape(href.as_str().trim());
        let resolved = match &base {
            Some(base) => match base.join(&href) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            },
            None => href,
        };
        if !seen.insert(resolved.clone()) {
            continue;
        }
        let label = caps
            .name("label")
            .map(|m| collapse_whitespace(&unescape(m.as_str())))
            .filter(|l| !l.is_empty())
            .or_else(|| filename_for_link(&resolved))
            .unwrap_or_else(|| resolved.clone());
        out.push(LinkCandidate {
            url: resolved,
            label,
        });
    }
    out
}

fn unescape(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring exclusion on link labels (e.g. skip every `JPG` variant).
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    excluded: Vec<String>,
}

impl LabelFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn excludes(&self, label: &str) -> bool {
        let label = label.to_uppercase();
        self.excluded.iter().any(|k| label.contains(k.as_str()))
    }
}
