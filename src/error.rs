use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::coco_dataset::{Partition, SplitName};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read COCO catalog {}: {source}", .path.display())]
    CatalogRead { path: PathBuf, source: io::Error },

    #[error("malformed COCO catalog {}: {source}", .path.display())]
    CatalogParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to walk {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },

    #[error("required directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("split `{split}` is not available for partition `{partition}`")]
    UnknownSplit {
        partition: Partition,
        split: SplitName,
    },

    #[error("invalid split ratios (train {train}, val {val}, test {test}): {reason}")]
    InvalidRatios {
        train: f64,
        val: f64,
        test: f64,
        reason: &'static str,
    },

    #[error("could not decode a frame from {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
