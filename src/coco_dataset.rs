//! COCO dataset loading module
//!
//! This module exposes the annotated cow images of one partition/split as
//! [`AnnotationRecord`]s: the image bytes plus every COCO annotation of that image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use jwalk::WalkDir;
use log::{debug, info};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::coco::{Annotation, CocoCatalog};
use crate::error::{Error, Result};
use crate::types::has_image_extension;

/// File name of the catalog inside every split directory.
pub const CATALOG_FILE_NAME: &str = "coco.json";

/// Named dataset subsets (viewpoint, lighting, source and generalisation setups).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Partition {
    #[value(name = "0_all")]
    All,
    #[value(name = "1_top")]
    Top,
    #[value(name = "2_side")]
    Side,
    #[value(name = "3_external")]
    External,
    #[value(name = "a1_t2s")]
    TopToSide,
    #[value(name = "a2_s2t")]
    SideToTop,
    #[value(name = "b_light")]
    Light,
    #[value(name = "c_external")]
    AllToExternal,
}

impl Partition {
    pub const ALL: [Partition; 8] = [
        Partition::All,
        Partition::Top,
        Partition::Side,
        Partition::External,
        Partition::TopToSide,
        Partition::SideToTop,
        Partition::Light,
        Partition::AllToExternal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Partition::All => "0_all",
            Partition::Top => "1_top",
            Partition::Side => "2_side",
            Partition::External => "3_external",
            Partition::TopToSide => "a1_t2s",
            Partition::SideToTop => "a2_s2t",
            Partition::Light => "b_light",
            Partition::AllToExternal => "c_external",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Partition::All => {
                "Including top-down and side-view images with pre-defined train-test split"
            }
            Partition::Top => "Top-down images with pre-defined train-test split, and also splits for different lighting conditions",
            Partition::Side => "Side view images with pre-defined train-test split, and also splits for different lighting conditions",
            Partition::External => "Images captured from external sources, which have lower angle and different lighting conditions",
            Partition::TopToSide => {
                "For testing the model generalization from top-down to side-view images"
            }
            Partition::SideToTop => {
                "For testing the model generalization from side-view to top-down images"
            }
            Partition::Light => "For testing the model generalization from daylight condition to indoor lighting and NIR images",
            Partition::AllToExternal => {
                "For testing the model generalization from 0_all to 3_external"
            }
        }
    }

    /// Splits offered by this partition, in generation order.
    pub fn splits(self) -> &'static [SplitName] {
        match self {
            Partition::Top | Partition::Side => &[
                SplitName::Daylight,
                SplitName::IndoorLight,
                SplitName::Infrared,
                SplitName::Train,
                SplitName::Test,
            ],
            _ => &[SplitName::Train, SplitName::Test],
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named division of a partition's data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum SplitName {
    Train,
    Test,
    Daylight,
    #[value(name = "indoorlight")]
    IndoorLight,
    Infrared,
}

impl SplitName {
    pub fn name(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Test => "test",
            SplitName::Daylight => "daylight",
            SplitName::IndoorLight => "indoorlight",
            SplitName::Infrared => "infrared",
        }
    }

    /// Directory holding the split on disk.
    pub fn dir_name(self) -> &'static str {
        match self {
            SplitName::IndoorLight => "indoor-light",
            other => other.name(),
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the catalog and images of one split live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSource {
    pub split: SplitName,
    pub catalog_path: PathBuf,
    pub image_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageData {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>,
}

/// One image plus its detections.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationRecord {
    pub image: ImageData,
    pub width: u32,
    pub height: u32,
    pub n_cows: usize,
    pub annotations: Vec<Annotation>,
    pub image_id: i64,
    pub filename: String,
}

impl AnnotationRecord {
    /// Key identifying the record inside its split.
    pub fn key(&self) -> String {
        self.image.path.to_string_lossy().into_owned()
    }
}

fn serialize_base64<T, S>(bytes: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
}

/// Loads records for the partitions stored under one dataset root.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root: PathBuf,
}

impl DatasetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Catalog and image directory of every split `partition` offers.
    pub fn split_sources(&self, partition: Partition) -> Vec<SplitSource> {
        partition
            .splits()
            .iter()
            .map(|&split| self.source_for(partition, split))
            .collect()
    }

    pub fn split_source(&self, partition: Partition, split: SplitName) -> Result<SplitSource> {
        if !partition.splits().contains(&split) {
            return Err(Error::UnknownSplit { partition, split });
        }
        Ok(self.source_for(partition, split))
    }

    fn source_for(&self, partition: Partition, split: SplitName) -> SplitSource {
        let image_dir = self.root.join(partition.name()).join(split.dir_name());
        SplitSource {
            split,
            catalog_path: image_dir.join(CATALOG_FILE_NAME),
            image_dir,
        }
    }

    /// Load every annotated image of `split`.
    pub fn load(&self, partition: Partition, split: SplitName) -> Result<Vec<AnnotationRecord>> {
        let source = self.split_source(partition, split)?;
        info!(
            "Loading {}/{} from {}",
            partition,
            split,
            source.catalog_path.display()
        );
        let catalog = CocoCatalog::from_path(&source.catalog_path)?;
        let files = list_split_files(&source.image_dir)?;
        let records = generate_records(&catalog, files)?;
        info!(
            "Loaded {} records for {}/{} ({} categories, {} licenses)",
            records.len(),
            partition,
            split,
            catalog.categories().len(),
            catalog.licenses().len()
        );
        Ok(records)
    }
}

/// Write one line per partition with its description, followed by the
/// catalog path of each split it offers.
pub fn write_partition_listing<W: Write>(out: &mut W, loader: &DatasetLoader) -> io::Result<()> {
    for partition in Partition::ALL {
        writeln!(out, "{}\t{}", partition, partition.description())?;
        for source in loader.split_sources(partition) {
            writeln!(
                out,
                "  {}\t{}",
                source.split,
                source.catalog_path.display()
            )?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct KeyedRecord<'a> {
    key: String,
    #[serde(flatten)]
    record: &'a AnnotationRecord,
}

/// Write records as JSON Lines, each object carrying the record key.
pub fn write_records<W: Write>(out: &mut W, records: &[AnnotationRecord]) -> io::Result<()> {
    for record in records {
        let keyed = KeyedRecord {
            key: record.key(),
            record,
        };
        serde_json::to_writer(&mut *out, &keyed)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Every regular file below `dir`, sorted by path.
pub fn list_split_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort(true).skip_hidden(false) {
        let entry = entry.map_err(|e| Error::Walk {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Build one record for each image file that the catalog knows about.
///
/// Files without an image extension and images missing from the catalog are
/// skipped without error; the latter are treated as not yet labeled.
pub fn generate_records<I>(catalog: &CocoCatalog, images: I) -> Result<Vec<AnnotationRecord>>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut records = Vec::new();
    for path in images {
        if !has_image_extension(&path) {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            continue;
        };
        let Some(image) = catalog.image_info(&filename) else {
            debug!("No catalog entry for {}, skipping", path.display());
            continue;
        };

        let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let annotations: Vec<Annotation> = catalog
            .annotations_for(image.id)
            .into_iter()
            .cloned()
            .collect();

        records.push(AnnotationRecord {
            image: ImageData { path, bytes },
            width: image.width,
            height: image.height,
            n_cows: annotations.len(),
            annotations,
            image_id: image.id,
            filename,
        });
    }
    Ok(records)
}
