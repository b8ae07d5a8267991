use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{KeyValueStore, StorageError};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	/// Open (creating if needed) a store rooted at `dir`.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let dir = dir.into();
		fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
			key: String::new(),
			path: dir.clone(),
			source,
		})?;
		Ok(Self { dir })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, key: &str) -> PathBuf {
		let file_name: String = key
			.chars()
			.map(|ch| {
				if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
					ch
				} else {
					'_'
				}
			})
			.collect();
		self.dir.join(format!("{file_name}.json"))
	}
}

fn io_error(key: &str, path: &Path, source: io::Error) -> StorageError {
	StorageError::Io {
		key: key.to_string(),
		path: path.to_path_buf(),
		source,
	}
}

impl KeyValueStore for FileStore {
	fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
		let path = self.path_for(key);
		let contents = match fs::read(&path) {
			Ok(contents) => contents,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(io_error(key, &path, err)),
		};

		serde_json::from_slice(&contents)
			.map(Some)
			.map_err(|source| StorageError::Corrupt {
				key: key.to_string(),
				source,
			})
	}

	fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
		let path = self.path_for(key);
		let temp = path.with_extension("json.tmp");
		let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Corrupt {
			key: key.to_string(),
			source,
		})?;

		let mut file = fs::File::create(&temp).map_err(|err| io_error(key, &temp, err))?;
		file.write_all(&bytes)
			.and_then(|()| file.sync_all())
			.map_err(|err| io_error(key, &temp, err))?;
		fs::rename(&temp, &path).map_err(|err| io_error(key, &path, err))
	}

	fn remove(&self, key: &str) -> Result<(), StorageError> {
		let path = self.path_for(key);
		match fs::remove_file(&path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(io_error(key, &path, err)),
		}
	}
}
