//! Config Locator - find the configuration file for a run
//!
//! Lookup order: an explicit `--config` path, then `.aiwrite.yaml` in the
//! working directory, then `aiwrite/config.yaml` under the user's config
//! directory (e.g. ~/.config on Linux).

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".aiwrite.yaml";

pub struct ConfigLocator {
    working_dir: PathBuf,
    user_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator rooted at the current directory and the platform config dir
    pub fn new() -> Result<Self> {
        let working_dir = std::env::current_dir()?;
        Ok(Self::with_dirs(working_dir, Self::user_config_dir()))
    }

    pub fn with_dirs(working_dir: PathBuf, user_dir: Option<PathBuf>) -> Self {
        Self {
            working_dir,
            user_dir,
        }
    }

    /// `<config dir>/aiwrite`, if the platform has one
    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("aiwrite"))
    }

    /// Resolve which file to load. An explicit path must exist; the implicit
    /// candidates are skipped when absent. None means built-in defaults.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = self.working_dir.join(LOCAL_CONFIG);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(self
            .user_dir
            .as_ref()
            .map(|dir| dir.join("config.yaml"))
            .filter(|path| path.is_file()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ConfigLocator::with_dirs(dir.path().to_path_buf(), None);
        assert!(locator.locate(Some(&dir.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn local_file_beats_user_file() {
        let work = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join(LOCAL_CONFIG), "preset: all\n").unwrap();
        std::fs::write(user.path().join("config.yaml"), "preset: recommended\n").unwrap();

        let locator =
            ConfigLocator::with_dirs(work.path().to_path_buf(), Some(user.path().to_path_buf()));
        assert_eq!(
            locator.locate(None).unwrap(),
            Some(work.path().join(LOCAL_CONFIG))
        );
    }

    #[test]
    fn falls_back_to_user_file_then_defaults() {
        let work = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let locator =
            ConfigLocator::with_dirs(work.path().to_path_buf(), Some(user.path().to_path_buf()));
        assert_eq!(locator.locate(None).unwrap(), None);

        std::fs::write(user.path().join("config.yaml"), "preset: all\n").unwrap();
        assert_eq!(
            locator.locate(None).unwrap(),
            Some(user.path().join("config.yaml"))
        );
    }
}
