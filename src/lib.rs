//! Data-preparation utilities for the COLO cow image dataset
//!
//! Three independent tools: a loader that turns a COCO catalog plus an image
//! folder into per-image records, a train/val/test splitter for YOLO folders,
//! and a first-frame extractor for captured video recordings.

pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frames;
pub mod io;
pub mod types;
pub mod utils;
pub mod yolo_dataset;

// Re-export commonly used types and functions
pub use config::{Cli, Command};
pub use error::{Error, Result};
pub use types::{SampleId, SplitAssignment, Subset};

pub use coco::{Annotation, CocoCatalog};
pub use coco_dataset::{AnnotationRecord, DatasetLoader, Partition, SplitName};
pub use dataset::{split_ids, SplitRatios, Splitter};
pub use frames::{
    ExtractionReport, FfmpegDecoder, FrameDecoder, FrameExtractor, FrameExtractorConfig,
};
pub use yolo_dataset::YoloSplitter;
