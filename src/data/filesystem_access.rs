//! Represents the directories the detector reads its configuration from.
#[derive(Debug)]
pub enum FsAccess {
    Config,
    Current,
}

impl FsAccess {
    /// Retrieves the base path for the specified directory type, optionally appending the `coin_detect` subdirectory.
    ///
    /// # Arguments
    /// * `raw` - If `true`, returns the base path without adding the `coin_detect` subdirectory.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - The base path for the directory.
    fn get_path(&self, raw: bool) -> anyhow::Result<std::path::PathBuf> {
        let base_path = match self {
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unable to resolve the {:?} directory on this system.", self)
        })?;

        if !raw {
            path.push("coin_detect");
        }
        Ok(path)
    }

    /// Returns the `coin_detect` directory, e.g. `~/.config/coin_detect`. Does not create it.
    pub fn path(&self) -> anyhow::Result<std::path::PathBuf> {
        self.get_path(false)
    }

    /// Returns the directory without the `coin_detect` subdirectory.
    pub fn raw_path(&self) -> anyhow::Result<std::path::PathBuf> {
        self.get_path(true)
    }

    /// Resolves a relative path against this directory. Absolute paths are returned as they are.
    pub fn resolve(&self, path: &str) -> anyhow::Result<std::path::PathBuf> {
        let p = std::path::Path::new(path);
        if p.is_absolute() {
            return Ok(p.to_path_buf());
        }
        Ok(self.raw_path()?.join(p))
    }
}
