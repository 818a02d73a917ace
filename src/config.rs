use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::charts::DEFAULT_POINT_ALPHA;

pub const DEFAULT_CATALOG: &str = "./data/allCf4.xml";
pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [1000.0, 700.0];

pub const ENV_CATALOG: &str = "CF4_CATALOG";
pub const ENV_POINT_ALPHA: &str = "CF4_POINT_ALPHA";
pub const ENV_WINDOW_SIZE: &str = "CF4_WINDOW_SIZE";

/// Runtime settings: built-in defaults, overridden from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub point_alpha: f32,
    pub window_size: [f32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            point_alpha: DEFAULT_POINT_ALPHA,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(path) = get(ENV_CATALOG) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_POINT_ALPHA) {
            config.point_alpha = parse_alpha(&raw).with_context(|| format!("{ENV_POINT_ALPHA}={raw}"))?;
        }
        if let Some(raw) = get(ENV_WINDOW_SIZE) {
            config.window_size =
                parse_window_size(&raw).with_context(|| format!("{ENV_WINDOW_SIZE}={raw}"))?;
        }

        Ok(config)
    }
}

fn parse_alpha(raw: &str) -> Result<f32> {
    let alpha: f32 = raw.trim().parse().context("not a number")?;
    if !(0.0..=1.0).contains(&alpha) {
        bail!("alpha must be between 0 and 1");
    }
    Ok(alpha)
}

/// `WIDTHxHEIGHT` in logical pixels, e.g. `1200x800`.
fn parse_window_size(raw: &str) -> Result<[f32; 2]> {
    let (w, h) = raw
        .trim()
        .split_once(['x', 'X'])
        .context("expected WIDTHxHEIGHT")?;
    let w: f32 = w.trim().parse().context("invalid width")?;
    let h: f32 = h.trim().parse().context("invalid height")?;
    if !(w > 0.0 && h > 0.0) {
        bail!("window size must be positive");
    }
    Ok([w, h])
}
