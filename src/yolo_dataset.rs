//! Folder-based train/val/test splitter for YOLO datasets.
//!
//! ```text
//! root/
//!     data.yaml
//!     images/  img_1_13_jpg.rf.d695.jpg ...
//!     labels/  img_1_13_jpg.rf.d695.txt ...
//!     train/ val/ test/
//!         images/
//!         labels/
//! ```

use log::info;
use rand::rngs::StdRng;
use std::path::PathBuf;

use crate::dataset::{shuffle_rng, split_ids, SplitRatios, Splitter};
use crate::error::{Error, Result};
use crate::io::{
    copy_images_labels, create_dataset_yaml, discover_ids, setup_split_directories, IMAGES_DIR,
    LABELS_DIR,
};
use crate::types::{SampleId, SplitAssignment};

pub struct YoloSplitter {
    root: PathBuf,
    classes: Vec<String>,
    ratios: SplitRatios,
    rng: StdRng,
}

impl YoloSplitter {
    /// `seed` pins the shuffle; `None` draws a fresh split every run.
    pub fn new(
        root: impl Into<PathBuf>,
        classes: Vec<String>,
        ratios: SplitRatios,
        seed: Option<u64>,
    ) -> Self {
        Self {
            root: root.into(),
            classes,
            ratios,
            rng: shuffle_rng(seed),
        }
    }
}

impl Splitter for YoloSplitter {
    fn read_dataset(&mut self) -> Result<()> {
        for dir in [IMAGES_DIR, LABELS_DIR] {
            let path = self.root.join(dir);
            if !path.is_dir() {
                return Err(Error::MissingDirectory(path));
            }
        }
        Ok(())
    }

    fn get_ids(&self) -> Result<Vec<SampleId>> {
        let ids = discover_ids(&self.root.join(IMAGES_DIR))?;
        info!("Found {} images in {}", ids.len(), self.root.display());
        Ok(ids)
    }

    fn shuffle_train_test(&mut self, ids: Vec<SampleId>) -> SplitAssignment {
        info!(
            "Splitting with ratios train {}, val {}, test {}",
            self.ratios.train(),
            self.ratios.val(),
            self.ratios.test()
        );
        let assignment = split_ids(ids, &self.ratios, &mut self.rng);
        info!(
            "Split into {} train, {} val, {} test",
            assignment.train.len(),
            assignment.val.len(),
            assignment.test.len()
        );
        assignment
    }

    fn write_dataset(&self, assignment: &SplitAssignment) -> Result<()> {
        setup_split_directories(&self.root)?;
        let manifest = create_dataset_yaml(&self.root, &self.classes)?;
        info!("Wrote {}", manifest.display());
        copy_images_labels(&self.root, assignment)
    }
}
