use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{SampleId, SplitAssignment, Subset};
use crate::utils::{create_progress_bar, ensure_directory, python_list_literal, write_atomically};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const MANIFEST_FILE_NAME: &str = "data.yaml";

/// Collect the sample ids of every `.jpg` file directly inside `images_dir`.
///
/// The result is sorted, so the same directory always yields the same list
/// regardless of the order the OS lists it in.
pub fn discover_ids(images_dir: &Path) -> Result<Vec<SampleId>> {
    let entries = fs::read_dir(images_dir).map_err(|e| Error::io(images_dir, e))?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(images_dir, e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| Error::io(entry.path(), e))?
            .is_file();
        if !is_file {
            continue;
        }
        if let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(SampleId::from_image_file_name)
        {
            ids.push(id);
        }
    }
    ids.sort();
    Ok(ids)
}

/// Make sure `<root>/{train,val,test}/{images,labels}` exist.
///
/// Existing folders are left untouched, so files from earlier runs remain.
pub fn setup_split_directories(root: &Path) -> Result<()> {
    for subset in Subset::ALL {
        let subset_dir = root.join(subset.dir_name());
        ensure_directory(&subset_dir.join(IMAGES_DIR))?;
        ensure_directory(&subset_dir.join(LABELS_DIR))?;
    }
    Ok(())
}

/// Render the `data.yaml` manifest for a split rooted at `root`.
pub fn render_manifest(root: &Path, classes: &[String]) -> String {
    let images_dir = |subset: Subset| root.join(subset.dir_name()).join(IMAGES_DIR);
    format!(
        "train: {}\nval: {}\ntest: {}\nnc: {}\nnames: {}\n",
        images_dir(Subset::Train).display(),
        images_dir(Subset::Val).display(),
        images_dir(Subset::Test).display(),
        classes.len(),
        python_list_literal(classes)
    )
}

/// Create the data.yaml file for YOLO training
pub fn create_dataset_yaml(root: &Path, classes: &[String]) -> Result<PathBuf> {
    let path = root.join(MANIFEST_FILE_NAME);
    write_atomically(&path, render_manifest(root, classes).as_bytes())?;
    Ok(path)
}

/// Copy the image and label of every assigned id into its subset folder.
///
/// A missing source file aborts the run; files already copied stay in place.
pub fn copy_images_labels(root: &Path, assignment: &SplitAssignment) -> Result<()> {
    let src_images = root.join(IMAGES_DIR);
    let src_labels = root.join(LABELS_DIR);

    for (subset, ids) in assignment.iter() {
        let dst_images = root.join(subset.dir_name()).join(IMAGES_DIR);
        let dst_labels = root.join(subset.dir_name()).join(LABELS_DIR);
        let pb = create_progress_bar(ids.len() as u64, subset.label());

        for id in ids {
            copy_file(
                &src_images.join(id.image_file_name()),
                &dst_images.join(id.image_file_name()),
            )?;
            copy_file(
                &src_labels.join(id.label_file_name()),
                &dst_labels.join(id.label_file_name()),
            )?;
            pb.inc(1);
        }
        pb.finish_with_message(format!("{} copy complete", subset.label()));
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|e| Error::io(from, e))?;
    Ok(())
}
