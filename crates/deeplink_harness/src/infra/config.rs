//! Driver configuration: timing bounds and the remote app's UI strings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));

const CONFIG_PATH_ENV: &str = "DEEPLINK_HARNESS_CONFIG";
const TIMEOUT_ENV: &str = "DEEPLINK_HARNESS_TIMEOUT_MS";

/// Layered configuration loaded from defaults, user config, an explicit
/// file, and env overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DriverConfig {
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub labels: Labels,
}

/// Bounds for waits and gestures, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default = "Timing::default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    #[serde(default = "Timing::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "Timing::default_long_press_ms")]
    pub long_press_ms: u64,
}

impl Timing {
    fn default_wait_timeout_ms() -> u64 {
        5000
    }

    fn default_poll_interval_ms() -> u64 {
        100
    }

    // Past the host's press-and-hold threshold, not unboundedly long.
    fn default_long_press_ms() -> u64 {
        1300
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wait_timeout_ms: Self::default_wait_timeout_ms(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            long_press_ms: Self::default_long_press_ms(),
        }
    }
}

/// Localized labels and accessibility identifiers of the remote app.
/// Config-driven so a localized or re-versioned host needs no code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default = "Labels::default_browse")]
    pub browse: String,
    #[serde(default = "Labels::default_paste")]
    pub paste: String,
    #[serde(default = "Labels::default_delete")]
    pub delete: String,
    #[serde(default = "Labels::default_done")]
    pub done: String,
    #[serde(default = "Labels::default_open")]
    pub open: String,
    #[serde(default = "Labels::default_more")]
    pub more: String,
    #[serde(default = "Labels::default_top_level")]
    pub top_level: String,
    #[serde(default = "Labels::default_new_folder")]
    pub new_folder: String,
    #[serde(default = "Labels::default_rename_field_id")]
    pub rename_field_id: String,
    #[serde(default = "Labels::default_new_folder_cell_id")]
    pub new_folder_cell_id: String,
}

impl Labels {
    fn default_browse() -> String {
        "Browse".into()
    }

    fn default_paste() -> String {
        "Paste".into()
    }

    fn default_delete() -> String {
        "Delete".into()
    }

    fn default_done() -> String {
        "Done".into()
    }

    fn default_open() -> String {
        "Open".into()
    }

    fn default_more() -> String {
        "More".into()
    }

    fn default_top_level() -> String {
        "On My iPhone".into()
    }

    fn default_new_folder() -> String {
        "New Folder".into()
    }

    fn default_rename_field_id() -> String {
        "DOC.inlineRenameField".into()
    }

    fn default_new_folder_cell_id() -> String {
        "Folder".into()
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            browse: Self::default_browse(),
            paste: Self::default_paste(),
            delete: Self::default_delete(),
            done: Self::default_done(),
            open: Self::default_open(),
            more: Self::default_more(),
            top_level: Self::default_top_level(),
            new_folder: Self::default_new_folder(),
            rename_field_id: Self::default_rename_field_id(),
            new_folder_cell_id: Self::default_new_folder_cell_id(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    wait_timeout_ms: Option<u64>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        let wait_timeout_ms = env::var(TIMEOUT_ENV).ok().and_then(|raw| {
            let parsed = raw.parse().ok();
            if parsed.is_none() {
                tracing::warn!(value = %raw, "ignoring unparsable {TIMEOUT_ENV}");
            }
            parsed
        });
        Self { wait_timeout_ms }
    }

    #[cfg(test)]
    fn for_tests(wait_timeout_ms: u64) -> Self {
        Self {
            wait_timeout_ms: Some(wait_timeout_ms),
        }
    }
}

impl DriverConfig {
    /// Load configuration from defaults, the user config, the file named by
    /// `DEEPLINK_HARNESS_CONFIG`, and env overrides, in that order.
    pub fn load() -> Result<Self> {
        let env_overrides = EnvOverrides::from_env();
        let explicit = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_with_layers(user_config_path(), explicit, env_overrides)
    }

    fn load_with_layers(
        user: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<DriverConfig> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(user_path) = user.filter(|path| path.exists()) {
            layers.push(Self::from_file(&user_path)?);
        }

        if let Some(explicit_path) = explicit.filter(|path| path.exists()) {
            layers.push(Self::from_file(&explicit_path)?);
        }

        let merged = layers
            .into_iter()
            .reduce(DriverConfig::merge)
            .unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: DriverConfig =
            toml::from_str(contents).context("failed to parse TOML config")?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            timing: merge_timing(self.timing, other.timing),
            labels: merge_labels(self.labels, other.labels),
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.poll_interval_ms)
    }
}

fn merge_timing(base: Timing, overlay: Timing) -> Timing {
    Timing {
        wait_timeout_ms: choose(
            base.wait_timeout_ms,
            overlay.wait_timeout_ms,
            Timing::default_wait_timeout_ms,
        ),
        poll_interval_ms: choose(
            base.poll_interval_ms,
            overlay.poll_interval_ms,
            Timing::default_poll_interval_ms,
        ),
        long_press_ms: choose(
            base.long_press_ms,
            overlay.long_press_ms,
            Timing::default_long_press_ms,
        ),
    }
}

fn merge_labels(base: Labels, overlay: Labels) -> Labels {
    Labels {
        browse: choose(base.browse, overlay.browse, Labels::default_browse),
        paste: choose(base.paste, overlay.paste, Labels::default_paste),
        delete: choose(base.delete, overlay.delete, Labels::default_delete),
        done: choose(base.done, overlay.done, Labels::default_done),
        open: choose(base.open, overlay.open, Labels::default_open),
        more: choose(base.more, overlay.more, Labels::default_more),
        top_level: choose(base.top_level, overlay.top_level, Labels::default_top_level),
        new_folder: choose(
            base.new_folder,
            overlay.new_folder,
            Labels::default_new_folder,
        ),
        rename_field_id: choose(
            base.rename_field_id,
            overlay.rename_field_id,
            Labels::default_rename_field_id,
        ),
        new_folder_cell_id: choose(
            base.new_folder_cell_id,
            overlay.new_folder_cell_id,
            Labels::default_new_folder_cell_id,
        ),
    }
}

fn choose<T: PartialEq>(base: T, overlay: T, default_fn: fn() -> T) -> T {
    if overlay != default_fn() { overlay } else { base }
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("deeplink_harness/config.toml"))
}

fn apply_env_overrides(mut config: DriverConfig, env: EnvOverrides) -> DriverConfig {
    if let Some(wait_timeout_ms) = env.wait_timeout_ms {
        config.timing.wait_timeout_ms = wait_timeout_ms;
    }
    config
}
