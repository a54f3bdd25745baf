use directories::ProjectDirs;
use nanoserde::{DeJson, SerJson};
use std::fs::{create_dir_all, read_to_string};
use std::path::{Path, PathBuf};
use std::{fs, io};

pub trait Storage {
    /// `None` if the value was never saved or can't be parsed anymore.
    fn get_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>) -> Option<T>;
    fn save_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>, to_save: &T) -> io::Result<()>;
    fn config_dir(&self) -> &Path;
}

/// JSON files in the platform's config directory.
pub struct FileStorage {
    config_dir: PathBuf,
}

impl FileStorage {
    pub fn new() -> Option<FileStorage> {
        let project_dirs = ProjectDirs::from("", "FP-GAme", "fpgame")?;
        FileStorage::at(project_dirs.config_dir()).ok()
    }

    /// Storage rooted at an arbitrary directory, created if needed.
    pub fn at(config_dir: impl AsRef<Path>) -> io::Result<FileStorage> {
        create_dir_all(config_dir.as_ref())?;
        Ok(FileStorage {
            config_dir: config_dir.as_ref().to_path_buf(),
        })
    }
}

impl Storage for FileStorage {
    fn get_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>) -> Option<T> {
        let path = self.config_dir.join(file_name);
        let json = read_to_string(&path).ok()?;
        match T::deserialize_json(json.as_str()) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring unreadable config {:?}: {:?}", path, e);
                None
            }
        }
    }

    fn save_value<T: SerJson + DeJson>(&self, file_name: impl AsRef<Path>, to_save: &T) -> io::Result<()> {
        let json = T::serialize_json(to_save);
        fs::write(self.config_dir.join(file_name), json)
    }

    fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
