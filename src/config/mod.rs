mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Parse, normalize and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    let config = prepare_config(config);

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mediacompat.toml",
        "~/.config/mediacompat/config.toml",
        "/etc/mediacompat/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(prepare_config(Config::default()))
}

fn prepare_config(mut config: Config) -> Config {
    config.compat = config.compat.normalized();

    config.target.container = config
        .target
        .container
        .trim()
        .trim_start_matches('.')
        .to_lowercase();

    for ext in config.scan.extensions.iter_mut() {
        *ext = ext.trim().trim_start_matches('.').to_lowercase();
    }
    config.scan.extensions.retain(|ext| !ext.is_empty());
    config.scan.extensions.sort();
    config.scan.extensions.dedup();

    config
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let target = &config.target;
    if target.container.is_empty() {
        anyhow::bail!("target.container cannot be empty");
    }
    if target.video_codec.trim().is_empty() {
        anyhow::bail!("target.video_codec cannot be empty");
    }
    if target.audio_codec.trim().is_empty() {
        anyhow::bail!("target.audio_codec cannot be empty");
    }

    if config.scan.extensions.is_empty() {
        anyhow::bail!("scan.extensions must list at least one extension");
    }
    if config.scan.new_suffix.is_empty() {
        anyhow::bail!("scan.new_suffix cannot be empty");
    }

    // Converted files should pass the table on the next run.
    let table = &config.compat;
    if !table.is_allowed(
        crate::compat::StreamType::Video,
        &target.container,
        &target.video_codec,
    ) || !table.is_allowed(
        crate::compat::StreamType::Audio,
        &target.container,
        &target.audio_codec,
    ) {
        tracing::warn!(
            "Target {}/{}/{} is not itself allowed by the compatibility table",
            target.container,
            target.video_codec,
            target.audio_codec
        );
    }

    for path in [&config.tools.ffmpeg_path, &config.tools.ffprobe_path]
        .into_iter()
        .flatten()
    {
        if !path.exists() {
            tracing::warn!("Configured tool path does not exist: {:?}", path);
        }
    }

    Ok(())
}
