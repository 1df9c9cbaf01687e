//! [`Storage`] of the persisted client state.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

/// Key of a value persisted in a [`Storage`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Key {
    /// Opaque access token of the session.
    #[display("erp_token")]
    Token,

    /// JSON profile of the signed-in user.
    #[display("erp_user")]
    Profile,
}

impl Key {
    /// All the [`Key`]s.
    pub const ALL: [Self; 2] = [Self::Token, Self::Profile];

    /// Returns the persisted name of this [`Key`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "erp_token",
            Self::Profile => "erp_user",
        }
    }
}

/// Synchronous key-value storage of the client state.
pub trait Storage: fmt::Debug + Send + Sync {
    /// Loads the value stored under the provided [`Key`], if any.
    ///
    /// # Errors
    ///
    /// If the value cannot be read.
    fn load(&self, key: Key) -> Result<Option<String>, Traced<Error>>;

    /// Stores the provided `value` under the provided [`Key`], replacing the
    /// previous one.
    ///
    /// # Errors
    ///
    /// If the value cannot be written.
    fn save(&self, key: Key, value: &str) -> Result<(), Traced<Error>>;

    /// Removes the value stored under the provided [`Key`], if any.
    ///
    /// # Errors
    ///
    /// If the value exists, but cannot be removed.
    fn remove(&self, key: Key) -> Result<(), Traced<Error>>;
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O error of a [`FileStorage`].
    #[display("`FileStorage` I/O failed: {_0}")]
    Io(io::Error),
}

/// [`Storage`] keeping every [`Key`] in its own file inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    /// Directory the files are kept in.
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a new [`FileStorage`] in the provided directory.
    ///
    /// The directory is created lazily, on the first [`Storage::save`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory of this [`FileStorage`].
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file holding the provided [`Key`].
    fn path(&self, key: Key) -> PathBuf {
        self.dir.join(key.as_str())
    }
}

impl Storage for FileStorage {
    fn load(&self, key: Key) -> Result<Option<String>, Traced<Error>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(tracerr::new!(Error::Io(e))),
        }
    }

    fn save(&self, key: Key, value: &str) -> Result<(), Traced<Error>> {
        fs::create_dir_all(&self.dir)
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        // Written aside and renamed, so a crash never leaves a torn value.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value).map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::rename(&tmp, self.path(key))
            .map_err(tracerr::from_and_wrap!(=> Error))
    }

    fn remove(&self, key: Key) -> Result<(), Traced<Error>> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(tracerr::new!(Error::Io(e))),
        }
    }
}

/// In-memory [`Storage`], forgetting everything on drop.
#[derive(Debug, Default)]
pub struct MemoryStorage(Mutex<HashMap<Key, String>>);

impl MemoryStorage {
    /// Creates a new empty [`MemoryStorage`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: Key) -> Result<Option<String>, Traced<Error>> {
        Ok(self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    fn save(&self, key: Key, value: &str) -> Result<(), Traced<Error>> {
        drop(
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, value.to_owned()),
        );
        Ok(())
    }

    fn remove(&self, key: Key) -> Result<(), Traced<Error>> {
        drop(
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key),
        );
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{FileStorage, Key, MemoryStorage, Storage};

    fn exercise(storage: &dyn Storage) {
        assert_eq!(storage.load(Key::Token).unwrap(), None);

        storage.save(Key::Token, "abc").unwrap();
        storage.save(Key::Profile, "{}").unwrap();
        storage.save(Key::Token, "def").unwrap();
        assert_eq!(storage.load(Key::Token).unwrap().as_deref(), Some("def"));
        assert_eq!(storage.load(Key::Profile).unwrap().as_deref(), Some("{}"));

        storage.remove(Key::Token).unwrap();
        storage.remove(Key::Token).unwrap();
        assert_eq!(storage.load(Key::Token).unwrap(), None);
        assert_eq!(storage.load(Key::Profile).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));

        exercise(&storage);
        assert!(storage.dir().join("erp_user").exists());
        assert!(!storage.dir().join("erp_token").exists());
    }

    #[test]
    fn memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn keys_use_fixed_names() {
        assert_eq!(Key::Token.to_string(), "erp_token");
        assert_eq!(Key::Profile.as_str(), "erp_user");
        assert_eq!(Key::ALL.len(), 2);
    }
}
