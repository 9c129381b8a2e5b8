//! Canonical paths under `.taskstate/` for a workspace root.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::config::{Config, load_config};
use super::store::FileStore;

#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state_dir = root.join(".taskstate");
        Self {
            root: root.clone(),
            config_path: state_dir.join("config.toml"),
            state_dir,
        }
    }
}

/// A loaded config together with the file store it points at.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: WorkspacePaths,
    pub config: Config,
    pub store: FileStore,
}

impl Workspace {
    pub fn open(root: &Path) -> Result<Self> {
        let paths = WorkspacePaths::new(root);
        let config = load_config(&paths.config_path)?;
        let store = FileStore::new(config.store_dir_in(root));
        Ok(Self {
            paths,
            config,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::write_config;

    #[test]
    fn open_without_config_uses_default_store_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let workspace = Workspace::open(temp.path()).expect("open");
        assert_eq!(
            workspace.store.base_dir(),
            temp.path().join(".taskstate/store")
        );
    }

    #[test]
    fn open_honours_configured_store_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(temp.path());
        let cfg = Config {
            store_dir: PathBuf::from("elsewhere"),
            ..Config::default()
        };
        write_config(&paths.config_path, &cfg).expect("write");

        let workspace = Workspace::open(temp.path()).expect("open");
        assert_eq!(workspace.store.base_dir(), temp.path().join("elsewhere"));
    }
}
