//! Configuration persistence
//!
//! The harness keeps no session state on disk; only `config.json` under the
//! root directory, written atomically via a temp file and rename.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::HarnessConfig;

/// File name of the configuration inside the root directory.
pub const CONFIG_FILE: &str = "config.json";

/// Path of the configuration file under `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Create the root directory
pub fn init_storage(root: &Path) -> Result<()> {
    fs::create_dir_all(root).with_context(|| format!("Failed to create directory: {:?}", root))
}

/// Write harness configuration to `<root>/config.json`
///
/// The JSON is staged in `config.json.tmp` and renamed over the old file, so
/// a reader never sees a half-written config.
pub fn write_config(config: &HarnessConfig) -> Result<()> {
    let json = serde_json::to_vec_pretty(config).context("Failed to serialize config")?;
    let path = config_path(&config.root);
    replace_config_file(&path, &json)?;
    tracing::debug!(path = ?path, "config written");
    Ok(())
}

fn replace_config_file(path: &Path, json: &[u8]) -> Result<()> {
    let staged = path.with_extension("json.tmp");
    {
        let mut file = File::create(&staged)
            .with_context(|| format!("Failed to stage config: {:?}", staged))?;
        file.write_all(json)
            .and_then(|()| file.sync_all())
            .with_context(|| format!("Failed to write config: {:?}", staged))?;
    }
    fs::rename(&staged, path).with_context(|| format!("Failed to replace config: {:?}", path))
}

/// Load harness configuration from `<root>/config.json`
///
/// The loaded `root` is replaced by the directory it was read from.
pub fn load_config(root: &Path) -> Result<HarnessConfig> {
    let path = config_path(root);
    let data = fs::read(&path).with_context(|| format!("Failed to read config: {:?}", path))?;
    let mut config: HarnessConfig =
        serde_json::from_slice(&data).context("Failed to deserialize config")?;
    config.root = root.to_path_buf();
    config
        .extractor()
        .context("Config describes an invalid banner")?;
    Ok(config)
}

/// Load configuration if present, otherwise defaults rooted at `root`
pub fn load_or_default(root: &Path) -> Result<HarnessConfig> {
    if config_path(root).exists() {
        load_config(root)
    } else {
        Ok(HarnessConfig {
            root: root.to_path_buf(),
            ..HarnessConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::CommandSpec;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_config() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("pg");
        init_storage(&root).unwrap();

        let config = HarnessConfig {
            root: root.clone(),
            banner_marker: '#',
            banner_min_run: 4,
            echo_output: false,
            interpreter: Some(CommandSpec::new("lox").arg("--stdin")),
            debug: true,
        };

        write_config(&config).unwrap();
        let loaded = load_config(&root).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let config = load_or_default(temp.path()).unwrap();
        assert_eq!(config.root, temp.path());
        assert_eq!(config.banner_marker, '*');
    }

    #[test]
    fn test_invalid_banner_in_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(config_path(temp.path()), br#"{"banner_min_run": 0}"#).unwrap();
        assert!(load_config(temp.path()).is_err());
    }

    #[test]
    fn test_rewrite_replaces_config_without_leftovers() {
        let temp = TempDir::new().unwrap();
        let mut config = HarnessConfig {
            root: temp.path().to_path_buf(),
            ..HarnessConfig::default()
        };
        write_config(&config).unwrap();

        config.debug = true;
        write_config(&config).unwrap();

        assert!(load_config(temp.path()).unwrap().debug);
        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, [CONFIG_FILE]);
    }
}
