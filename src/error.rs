use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("failed to load model from {}: {source}", .path.display())]
	Load {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("failed to persist model to {}: {source}", .path.display())]
	Persist {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("model produced an unknown class value {value}")]
	UnknownClass { value: f64 },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
