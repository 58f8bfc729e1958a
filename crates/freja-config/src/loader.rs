// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Candidate config locations, lowest to highest priority.  Later layers
/// override earlier ones; the explicit `--config` path overrides them all.
fn layer_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/freja/config.toml")];

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/freja/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("freja/config.toml"));
    }

    paths.push(PathBuf::from(".freja/config.toml"));
    paths.push(PathBuf::from("freja.toml"));

    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    paths
}

/// Load configuration by deep-merging every discovered TOML layer.
///
/// Auto-discovered layers that do not exist are skipped silently; an
/// explicit path that cannot be read is an error, since the user asked for
/// that exact file.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in layer_paths(explicit) {
        let required = explicit == Some(path.as_path());
        if !required && !path.is_file() {
            continue;
        }
        debug!(path = %path.display(), "loading config layer");
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let layer = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        overlay(&mut merged, layer);
    }

    Ok(merged.try_into().unwrap_or_default())
}

/// Deep-merge `top` onto `base`; `top` wins on scalar conflicts.
fn overlay(base: &mut toml::Value, top: toml::Value) {
    match (base, top) {
        (toml::Value::Table(b), toml::Value::Table(t)) => {
            for (key, value) in t {
                match b.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        b.insert(key, value);
                    }
                }
            }
        }
        (base, top) => *base = top,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
