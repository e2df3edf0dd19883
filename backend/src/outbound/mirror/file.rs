//! Directory-backed local mirror.
//!
//! Each key is one JSON file. Writes go to a staging file that is renamed
//! over the target, so readers see either the old or the new value.

use std::io;
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{LocalMirror, LocalMirrorError, MirrorKey};

/// [`LocalMirror`] storing one file per key inside a directory.
pub struct FileMirror {
    dir: Dir,
}

fn file_name(key: MirrorKey) -> String {
    format!("{}.json", key.as_str().replace(':', "-"))
}

fn io_error(key: MirrorKey, error: &io::Error) -> LocalMirrorError {
    LocalMirrorError::io(format!("{}: {error}", key.as_str()))
}

impl FileMirror {
    /// Open `path`, creating it when missing.
    pub fn open(path: &Path) -> Result<Self, LocalMirrorError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(path, ambient_authority()))
            .map(|dir| Self { dir })
            .map_err(|error| LocalMirrorError::io(format!("{}: {error}", path.display())))
    }
}

impl LocalMirror for FileMirror {
    fn read(&self, key: MirrorKey) -> Result<Option<Value>, LocalMirrorError> {
        let bytes = match self.dir.read(file_name(key)) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error(key, &error)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|error| LocalMirrorError::corrupt(key.as_str(), error.to_string()))
    }

    fn write(&self, key: MirrorKey, value: &Value) -> Result<(), LocalMirrorError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|error| LocalMirrorError::corrupt(key.as_str(), error.to_string()))?;
        let staging = format!(".tmp-{}-{}", file_name(key), Uuid::new_v4().simple());
        self.dir
            .write(&staging, bytes)
            .and_then(|()| self.dir.rename(&staging, &self.dir, file_name(key)))
            .map_err(|error| {
                let _cleanup = self.dir.remove_file(&staging);
                io_error(key, &error)
            })
    }

    fn remove(&self, key: MirrorKey) -> Result<(), LocalMirrorError> {
        match self.dir.remove_file(file_name(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(key, &error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    #[rstest]
    fn values_survive_reopening(workspace: TempDir) {
        let value = json!([{ "id": "d1" }]);
        FileMirror::open(workspace.path())
            .expect("open")
            .write(MirrorKey::Designs, &value)
            .expect("write");
        let reopened = FileMirror::open(workspace.path()).expect("reopen");
        assert_eq!(reopened.read(MirrorKey::Designs).expect("read"), Some(value));
        assert!(workspace.path().join("pawprint-designs.json").exists());
    }

    #[rstest]
    fn absent_keys_read_as_none_and_remove_cleanly(workspace: TempDir) {
        let mirror = FileMirror::open(workspace.path()).expect("open");
        assert_eq!(mirror.read(MirrorKey::Likes).expect("read"), None);
        mirror.remove(MirrorKey::Likes).expect("idempotent remove");
    }

    #[rstest]
    fn malformed_files_are_reported_corrupt(workspace: TempDir) {
        std::fs::write(workspace.path().join("pawprint-follows.json"), b"{oops").expect("seed");
        let mirror = FileMirror::open(workspace.path()).expect("open");
        let err = mirror.read(MirrorKey::Follows).expect_err("corrupt");
        assert_eq!(err.kind(), "corrupt");
    }
}
