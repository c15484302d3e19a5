use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

// Supported image formats
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp", "pfm",
];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Whether `path` ends in one of the recognised image extensions (case-insensitive).
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
}

/// Image extension of the YOLO folder convention.
pub const IMAGE_SUFFIX: &str = ".jpg";
/// Label extension of the YOLO folder convention.
pub const LABEL_SUFFIX: &str = ".txt";

/// Filename stem shared by an image and its label file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId(String);

impl SampleId {
    pub fn new(stem: impl Into<String>) -> Self {
        Self(stem.into())
    }

    /// `img_1_13_jpg.rf.jpg` -> `img_1_13_jpg.rf`; `None` for anything not ending in `.jpg`.
    pub fn from_image_file_name(file_name: &str) -> Option<Self> {
        file_name
            .strip_suffix(IMAGE_SUFFIX)
            .map(|stem| Self(stem.to_string()))
    }

    pub fn image_file_name(&self) -> String {
        format!("{}{}", self.0, IMAGE_SUFFIX)
    }

    pub fn label_file_name(&self) -> String {
        format!("{}{}", self.0, LABEL_SUFFIX)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three output subsets of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    Train,
    Val,
    Test,
}

impl Subset {
    pub const ALL: [Subset; 3] = [Subset::Train, Subset::Val, Subset::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
            Subset::Test => "test",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subset::Train => "Train",
            Subset::Val => "Val",
            Subset::Test => "Test",
        }
    }
}

// Disjoint train/val/test partition of the discovered sample ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<SampleId>,
    pub val: Vec<SampleId>,
    pub test: Vec<SampleId>,
}

impl SplitAssignment {
    pub fn subset(&self, subset: Subset) -> &[SampleId] {
        match subset {
            Subset::Train => &self.train,
            Subset::Val => &self.val,
            Subset::Test => &self.test,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subset, &[SampleId])> + '_ {
        Subset::ALL.into_iter().map(move |s| (s, self.subset(s)))
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_id_strips_jpg_only() {
        assert_eq!(
            SampleId::from_image_file_name("img_1_13_jpg.rf.d695.jpg"),
            Some(SampleId::new("img_1_13_jpg.rf.d695"))
        );
        assert_eq!(SampleId::from_image_file_name("notes.txt"), None);
        assert_eq!(SampleId::new("x").label_file_name(), "x.txt");
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension(Path::new("a/b/000139.JPG")));
        assert!(has_image_extension(Path::new("frame.png")));
        assert!(!has_image_extension(Path::new("train/coco.json")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }
}
