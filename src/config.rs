use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::coco_dataset::{Partition, SplitName};
use crate::dataset::SplitRatios;
use crate::error::Result;
use crate::frames::{FrameExtractorConfig, NamingScheme};

/// Data-preparation utilities for the COLO cow image dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Split a YOLO images/labels folder into train/val/test
    Split(SplitArgs),
    /// Extract the first frame of each complete video recording
    Frames(FramesArgs),
    /// Write the records of a dataset split as JSON Lines
    Records(RecordsArgs),
    /// List the partitions, their splits and catalog paths
    Partitions(PartitionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Dataset root containing `images/` and `labels/`
    #[arg(short = 'd', long = "root")]
    pub root: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_size", default_value_t = 0.64, value_parser = validate_size)]
    pub train_size: f64,

    /// Proportion of the dataset to use for validation
    #[arg(long = "val_size", default_value_t = 0.16, value_parser = validate_size)]
    pub val_size: f64,

    /// Proportion of the dataset to use for testing; defaults to what train and
    /// val leave over. The three sizes must not sum past 1.0
    #[arg(long = "test_size", value_parser = validate_size)]
    pub test_size: Option<f64>,

    /// Seed for random shuffling; a fresh split is drawn when omitted
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Ordered list of class names
    #[arg(value_delimiter = ',')]
    pub classes: Vec<String>,
}

impl SplitArgs {
    pub fn ratios(&self) -> Result<SplitRatios> {
        let test_size = self
            .test_size
            .unwrap_or_else(|| (1.0 - self.train_size - self.val_size).max(0.0));
        SplitRatios::new(self.train_size, self.val_size, test_size)
    }
}

#[derive(Args, Debug, Clone)]
pub struct FramesArgs {
    /// Directory holding the captured recordings
    #[arg(short = 's', long = "source")]
    pub source: PathBuf,

    /// Directory the extracted images are written to
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Suffix of incomplete recordings, which are deleted
    #[arg(long = "incomplete_suffix", default_value = "_1.mp4")]
    pub incomplete_suffix: String,

    /// Suffix of complete recordings
    #[arg(long = "complete_suffix", default_value = "_0.mp4")]
    pub complete_suffix: String,

    /// Prefix of the output image names
    #[arg(long = "prefix", default_value = "img_1_")]
    pub prefix: String,

    /// How output images are named
    #[arg(long = "naming", value_enum, default_value = "sequential")]
    pub naming: NamingScheme,

    /// ffmpeg executable used to decode the recordings
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,
}

impl FramesArgs {
    pub fn to_extractor_config(&self) -> FrameExtractorConfig {
        FrameExtractorConfig {
            source_dir: self.source.clone(),
            output_dir: self.output.clone(),
            incomplete_suffix: self.incomplete_suffix.clone(),
            complete_suffix: self.complete_suffix.clone(),
            prefix: self.prefix.clone(),
            naming: self.naming,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RecordsArgs {
    /// Dataset root containing one directory per partition
    #[arg(short = 'd', long = "root")]
    pub root: PathBuf,

    #[arg(short = 'p', long = "partition", value_enum)]
    pub partition: Partition,

    #[arg(short = 's', long = "split", value_enum)]
    pub split: SplitName,

    /// Output file; records go to stdout when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PartitionsArgs {
    /// Dataset root containing one directory per partition
    #[arg(short = 'd', long = "root", default_value = ".")]
    pub root: PathBuf,
}

// Validate that the size is between 0.0 and 1.0
pub fn validate_size(s: &str) -> std::result::Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0".to_string()),
    }
}
