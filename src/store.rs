//! Where trained models live between runs.
//!
//! Stores hold a single artifact. Nothing checks that a stored artifact
//! matches the current feature schema; it is decoded as-is.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::config::DEFAULT_MODEL_FILE;
use crate::error::{Error, Result};

pub trait ModelStore {
	/// Whether an artifact has been persisted.
	fn exists(&self) -> bool;

	fn load<C: Classifier>(&self) -> Result<C>;

	/// Persist `model`, replacing any existing artifact.
	fn save<C: Classifier>(&self, model: &C) -> Result<()>;

	/// Human readable location, for logs.
	fn location(&self) -> String;
}

/// A single model file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsModelStore {
	path: PathBuf,
}

static TMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl FsModelStore {
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn tmp_path(&self) -> PathBuf {
		let name = self.path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string());

		self.path.with_file_name(format!(
			".{}.{}.{}.tmp",
			name,
			std::process::id(),
			TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
		))
	}

	fn write_tmp<C: Classifier>(&self, tmp: &Path, model: &C) -> std::io::Result<()> {
		if let Some(parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}

		let mut writer = BufWriter::new(File::create(tmp)?);
		model.serialize(&mut writer)?;
		writer.flush()?;
		writer.get_ref().sync_all()
	}
}

impl Default for FsModelStore {
	fn default() -> Self {
		Self::new(DEFAULT_MODEL_FILE)
	}
}

impl ModelStore for FsModelStore {
	fn exists(&self) -> bool {
		self.path.is_file()
	}

	fn load<C: Classifier>(&self) -> Result<C> {
		let load = || -> std::io::Result<C> {
			let mut reader = BufReader::new(File::open(&self.path)?);
			C::deserialize(&mut reader)
		};

		let model = load().map_err(|source| Error::Load {
			path: self.path.clone(),
			source,
		})?;

		debug!(path = %self.path.display(), "loaded model artifact");
		Ok(model)
	}

	// Written beside the target and renamed into place: readers see the old
	// artifact or the new one, and the last writer wins.
	fn save<C: Classifier>(&self, model: &C) -> Result<()> {
		let tmp = self.tmp_path();

		let result = self.write_tmp(&tmp, model)
			.and_then(|_| fs::rename(&tmp, &self.path));

		if let Err(source) = result {
			let _ = fs::remove_file(&tmp);
			return Err(Error::Persist {
				path: self.path.clone(),
				source,
			});
		}

		info!(path = %self.path.display(), "persisted model artifact");
		Ok(())
	}

	fn location(&self) -> String {
		self.path.display().to_string()
	}
}
