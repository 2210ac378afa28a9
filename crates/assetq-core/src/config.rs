use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Dispatch-loop tuning (`[runner]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Pause new dispatch while this many incomplete downloads are present.
    pub concurrent_limit: usize,
    /// Sleep between capacity checks while at the limit.
    pub capacity_poll_secs: f64,
    /// Sleep between checks while draining the last transfers.
    pub drain_poll_secs: f64,
    /// Extra wait after the last incomplete file disappears, before teardown.
    pub settle_secs: f64,
    /// Lower bound of the jittered delay between items.
    pub stagger_min_secs: f64,
    /// Upper bound of the jittered delay between items.
    pub stagger_max_secs: f64,
    /// Filename suffix marking a download that is still in flight.
    pub incomplete_suffix: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 8,
            capacity_poll_secs: 4.0,
            drain_poll_secs: 5.0,
            settle_secs: 1.0,
            stagger_min_secs: 1.5,
            stagger_max_secs: 3.5,
            incomplete_suffix: ".crdownload".to_string(),
        }
    }
}

/// How to enumerate and fetch assets from one catalog site (`[sites.<name>]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Listing page URL. A `{page}` placeholder makes the listing paginated (1, 2, ...).
    pub listing_url: String,
    /// Detail page URL with an `{id}` placeholder.
    pub detail_url: String,
    /// Regex whose first capture group is an asset identifier on the listing page.
    pub id_pattern: String,
    /// Regex matching download links on the detail page.
    /// Named groups: `url` (required), `label` (optional).
    pub link_pattern: String,
    /// Links whose label contains any of these (case-insensitive) are skipped.
    #[serde(default)]
    pub exclude_labels: Vec<String>,
    /// Wait between triggering two links of the same asset.
    #[serde(default = "default_link_delay_secs")]
    pub link_delay_secs: f64,
    /// First listing page to fetch when the listing is paginated.
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Stop paginating after this many listing pages.
    #[serde(default)]
    pub max_pages: Option<u32>,
}

fn default_link_delay_secs() -> f64 {
    1.2
}

fn default_start_page() -> u32 {
    1
}

impl SiteProfile {
    pub fn ambientcg() -> Self {
        Self {
            listing_url: "https://ambientcg.com/list?sort=popular".to_string(),
            detail_url: "https://ambientcg.com/view?id={id}".to_string(),
            id_pattern: r#"id="asset-([A-Za-z0-9_\-]+)""#.to_string(),
            link_pattern: r#"<a[^>]*href="(?P<url>[^"]*get\?file=[^"]*)"[^>]*>(?P<label>[^<]*)</a>"#
                .to_string(),
            exclude_labels: vec!["JPG".to_string()],
            link_delay_secs: default_link_delay_secs(),
            start_page: default_start_page(),
            max_pages: None,
        }
    }

    pub fn link_delay(&self) -> Duration {
        secs(self.link_delay_secs)
    }
}

/// Global configuration loaded from `~/.config/assetq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetqConfig {
    /// Profile used when `--site` is not given.
    pub default_site: String,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default = "default_sites")]
    pub sites: BTreeMap<String, SiteProfile>,
}

fn default_sites() -> BTreeMap<String, SiteProfile> {
    let mut sites = BTreeMap::new();
    sites.insert("ambientcg".to_string(), SiteProfile::ambientcg());
    sites
}

impl Default for AssetqConfig {
    fn default() -> Self {
        Self {
            default_site: "ambientcg".to_string(),
            runner: RunnerConfig::default(),
            sites: default_sites(),
        }
    }
}

impl AssetqConfig {
    /// Resolve a site profile by name, falling back to `default_site`.
    pub fn site(&self, name: Option<&str>) -> Result<(&str, &SiteProfile)> {
        let name = name.unwrap_or(&self.default_site);
        self.sites
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| anyhow::anyhow!("unknown site profile '{}'", name))
    }
}

impl RunnerConfig {
    pub fn capacity_poll(&self) -> Duration {
        secs(self.capacity_poll_secs)
    }

    pub fn drain_poll(&self) -> Duration {
        secs(self.drain_poll_secs)
    }

    pub fn settle(&self) -> Duration {
        secs(self.settle_secs)
    }

    /// Stagger bounds, ordered low to high.
    pub fn stagger(&self) -> (Duration, Duration) {
        let (a, b) = (secs(self.stagger_min_secs), secs(self.stagger_max_secs));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// State directory: `~/.local/state/assetq`.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetq")?;
    Ok(xdg_dirs.get_state_home().join("assetq"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AssetqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AssetqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AssetqConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
