use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

pub struct AppPaths {
    pub _base: PathBuf,
    pub config: PathBuf,
    pub data: PathBuf,
}

impl AppPaths {
    pub fn from_project_dirs() -> Option<Self> {
        ProjectDirs::from("com", "cascloud", "CascloudDesk").map(|dirs| {
            let _base = dirs.data_dir().to_path_buf();
            let config = dirs.config_dir().to_path_buf();
            let data = _base.join("data");

            Self {
                _base,
                config,
                data,
            }
        })
    }

    /// Location of the persisted workspace selection.
    pub fn workspace_file(&self) -> PathBuf {
        self.data.join("workspace.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config)?;
        fs::create_dir_all(&self.data)?;
        Ok(())
    }
}
