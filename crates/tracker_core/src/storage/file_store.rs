use super::KeyValueStore;
use crate::error::AppError;
use std::path::{Path, PathBuf};

const STORE_DIR_ENV_VAR: &str = "TRACKER_STORE_DIR";
const APP_DIR_NAME: &str = "task-tracker";

/// Directory-backed slot store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

/// Resolves the store directory: `TRACKER_STORE_DIR`, then the configured
/// directory, then the per-user config directory.
pub fn default_store_dir(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(dir) = std::env::var(STORE_DIR_ENV_VAR)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::io(format!("{}: {}", self.dir.display(), err)))?;

        let path = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&staging, value)
            .map_err(|err| AppError::io(format!("{}: {}", staging.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&staging, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        // rename replaces the target in one step on both unix and windows
        std::fs::rename(&staging, &path).map_err(|err| {
            std::fs::remove_file(&staging).ok();
            AppError::io(format!("{}: {}", path.display(), err))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("task-tracker-{nanos}-{name}"))
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = temp_dir("missing");
        let store = FileStore::new(&dir);

        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn set_creates_directory_and_overwrites() {
        let dir = temp_dir("overwrite");
        let mut store = FileStore::new(&dir);

        store.set("tasks", "[1]").unwrap();
        store.set("tasks", "[2]").unwrap();
        let value = store.get("tasks").unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(value.as_deref(), Some("[2]"));
        assert_eq!(leftovers, vec!["tasks.json".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn written_slot_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("perms");
        let mut store = FileStore::new(&dir);
        store.set("tasks", "[]").unwrap();
        let mode = std::fs::metadata(store.path_for("tasks"))
            .unwrap()
            .permissions()
            .mode();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(mode & 0o777, 0o600);
    }
}
