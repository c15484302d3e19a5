//! COCO annotation catalog
//!
//! Read-only index over one COCO-style `coco.json`: images looked up by file name,
//! annotations grouped by their owning image id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};

/// COCO license information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub supercategory: Option<String>,
}

/// COCO image information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// A single labeled object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub image_id: i64,
    pub category_id: i64,
    pub iscrowd: i64,
    pub area: f64,
    pub bbox: [f64; 4], // [x, y, width, height]
    pub segmentation: Vec<Vec<f64>>,
}

/// On-disk layout of a COCO file; `info` and unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct CocoFile {
    images: Vec<Image>,
    annotations: Vec<Annotation>,
    categories: Vec<Category>,
    licenses: Vec<License>,
}

#[derive(Debug, Clone)]
pub struct CocoCatalog {
    images: Vec<Image>,
    annotations: Vec<Annotation>,
    categories: Vec<Category>,
    licenses: Vec<License>,
    by_file_name: HashMap<String, usize>,
    by_image_id: HashMap<i64, Vec<usize>>,
}

impl CocoCatalog {
    /// Load and index a catalog file. Missing or malformed files are fatal.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let coco: CocoFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!(
            "Loaded {} images and {} annotations from {}",
            coco.images.len(),
            coco.annotations.len(),
            path.display()
        );
        Ok(Self::from_parts(
            coco.images,
            coco.annotations,
            coco.categories,
            coco.licenses,
        ))
    }

    pub fn from_parts(
        images: Vec<Image>,
        annotations: Vec<Annotation>,
        categories: Vec<Category>,
        licenses: Vec<License>,
    ) -> Self {
        let mut by_file_name = HashMap::with_capacity(images.len());
        for (idx, image) in images.iter().enumerate() {
            // first entry wins on duplicate file names
            by_file_name.entry(image.file_name.clone()).or_insert(idx);
        }

        let mut by_image_id: HashMap<i64, Vec<usize>> = HashMap::new();
        for (idx, ann) in annotations.iter().enumerate() {
            by_image_id.entry(ann.image_id).or_default().push(idx);
        }

        Self {
            images,
            annotations,
            categories,
            licenses,
            by_file_name,
            by_image_id,
        }
    }

    /// Look up image metadata by the basename of `file_name`.
    pub fn image_info(&self, file_name: &str) -> Option<&Image> {
        let basename = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        self.by_file_name
            .get(basename)
            .map(|&idx| &self.images[idx])
    }

    /// Annotations owned by `image_id`, in file order.
    pub fn annotations_for(&self, image_id: i64) -> Vec<&Annotation> {
        self.by_image_id
            .get(&image_id)
            .map(|indices| indices.iter().map(|&idx| &self.annotations[idx]).collect())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }
}
