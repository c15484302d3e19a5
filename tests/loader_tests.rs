use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use colo_tools::coco_dataset::{generate_records, write_partition_listing, write_records};
use colo_tools::{CocoCatalog, DatasetLoader, Error, Partition, SplitName};

fn catalog_json() -> serde_json::Value {
    json!({
        "info": {"description": "COLO"},
        "images": [
            {"id": 1, "file_name": "a.jpg", "width": 640, "height": 480, "license": 1}
        ],
        "annotations": [
            {
                "id": 5,
                "image_id": 1,
                "category_id": 1,
                "iscrowd": 0,
                "area": 1200.5,
                "bbox": [10.0, 20.0, 30.0, 40.0],
                "segmentation": [[10, 20, 40, 20, 40, 60, 10, 60]]
            }
        ],
        "categories": [{"id": 1, "name": "cow", "supercategory": "animal"}],
        "licenses": [{"id": 1, "name": "CC BY 4.0", "url": ""}]
    })
}

fn write_split(root: &Path, partition: &str, split_dir: &str) -> PathBuf {
    let dir = root.join(partition).join(split_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("coco.json"), catalog_json().to_string()).unwrap();
    fs::write(dir.join("a.jpg"), b"\xFF\xD8\xFFjpeg").unwrap();
    fs::write(dir.join("b.jpg"), b"\xFF\xD8\xFFunlabeled").unwrap();
    fs::write(dir.join("readme.md"), "not an image").unwrap();
    dir
}

#[test]
fn test_record_for_catalogued_image() {
    let root = tempfile::tempdir().unwrap();
    let dir = write_split(root.path(), "0_all", "train");

    let records = DatasetLoader::new(root.path())
        .load(Partition::All, SplitName::Train)
        .unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.filename, "a.jpg");
    assert_eq!(record.image_id, 1);
    assert_eq!((record.width, record.height), (640, 480));
    assert_eq!(record.n_cows, 1);
    assert_eq!(record.image.path, dir.join("a.jpg"));
    assert_eq!(record.image.bytes, b"\xFF\xD8\xFFjpeg");

    let ann = &record.annotations[0];
    assert_eq!(ann.id, 5);
    assert_eq!(ann.image_id, 1);
    assert_eq!(ann.category_id, 1);
    assert_eq!(ann.iscrowd, 0);
    assert_eq!(ann.area, 1200.5);
    assert_eq!(ann.bbox, [10.0, 20.0, 30.0, 40.0]);
    assert_eq!(ann.segmentation, vec![vec![10.0, 20.0, 40.0, 20.0, 40.0, 60.0, 10.0, 60.0]]);
}

#[test]
fn test_image_absent_from_catalog_yields_nothing() {
    let root = tempfile::tempdir().unwrap();
    let dir = write_split(root.path(), "0_all", "test");
    let catalog = CocoCatalog::from_path(&dir.join("coco.json")).unwrap();

    let records = generate_records(&catalog, vec![dir.join("b.jpg")]).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_indoor_light_split_reads_hyphenated_dir() {
    let root = tempfile::tempdir().unwrap();
    write_split(root.path(), "1_top", "indoor-light");

    let records = DatasetLoader::new(root.path())
        .load(Partition::Top, SplitName::IndoorLight)
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_missing_catalog_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("0_all/train")).unwrap();

    let err = DatasetLoader::new(root.path())
        .load(Partition::All, SplitName::Train)
        .unwrap_err();
    assert!(matches!(err, Error::CatalogRead { .. }));
}

#[test]
fn test_malformed_catalog_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("0_all/train");
    fs::create_dir_all(&dir).unwrap();

    let mut bad = catalog_json();
    bad["annotations"][0]["bbox"] = json!([1.0, 2.0, 3.0]);
    fs::write(dir.join("coco.json"), bad.to_string()).unwrap();

    let err = DatasetLoader::new(root.path())
        .load(Partition::All, SplitName::Train)
        .unwrap_err();
    assert!(matches!(err, Error::CatalogParse { .. }));
}

#[test]
fn test_record_serializes_bytes_as_base64() {
    let root = tempfile::tempdir().unwrap();
    write_split(root.path(), "2_side", "train");

    let records = DatasetLoader::new(root.path())
        .load(Partition::Side, SplitName::Train)
        .unwrap();
    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(value["image"]["bytes"], "/9j/anBlZw==");
    assert_eq!(value["n_cows"], 1);
    assert_eq!(value["filename"], "a.jpg");
}

#[test]
fn test_catalog_accepts_sparse_categories_and_licenses() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("3_external/train");
    fs::create_dir_all(&dir).unwrap();

    let mut catalog = catalog_json();
    catalog["categories"] = json!([{"id": 1, "name": "cow", "supercategory": null}]);
    catalog["licenses"] = json!([{"name": "CC", "url": ""}]);
    fs::write(dir.join("coco.json"), catalog.to_string()).unwrap();
    fs::write(dir.join("a.jpg"), b"\xFF\xD8\xFF").unwrap();

    let records = DatasetLoader::new(root.path())
        .load(Partition::External, SplitName::Train)
        .unwrap();
    assert_eq!(records.len(), 1);

    let catalog = CocoCatalog::from_path(&dir.join("coco.json")).unwrap();
    assert_eq!(catalog.categories()[0].supercategory, None);
    assert_eq!(catalog.categories()[0].name.as_deref(), Some("cow"));
    assert_eq!(catalog.licenses()[0].id, None);
}

#[test]
fn test_write_records_one_keyed_line_per_record() {
    let root = tempfile::tempdir().unwrap();
    let dir = write_split(root.path(), "0_all", "train");
    fs::write(
        dir.join("coco.json"),
        {
            let mut catalog = catalog_json();
            catalog["images"] = json!([
                {"id": 1, "file_name": "a.jpg", "width": 640, "height": 480},
                {"id": 2, "file_name": "b.jpg", "width": 320, "height": 240}
            ]);
            catalog.to_string()
        },
    )
    .unwrap();

    let records = DatasetLoader::new(root.path())
        .load(Partition::All, SplitName::Train)
        .unwrap();
    let mut out = Vec::new();
    write_records(&mut out, &records).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["key"], dir.join("a.jpg").to_string_lossy().as_ref());
    assert_eq!(first["filename"], "a.jpg");
    assert_eq!(first["n_cows"], 1);

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["filename"], "b.jpg");
    assert_eq!(second["n_cows"], 0);
    assert_eq!(second["annotations"], json!([]));
}

#[test]
fn test_split_sources_and_partition_listing() {
    let loader = DatasetLoader::new("/data/colo");

    let sources = loader.split_sources(Partition::Side);
    let splits: Vec<SplitName> = sources.iter().map(|s| s.split).collect();
    assert_eq!(
        splits,
        vec![
            SplitName::Daylight,
            SplitName::IndoorLight,
            SplitName::Infrared,
            SplitName::Train,
            SplitName::Test
        ]
    );
    assert_eq!(
        sources[1].catalog_path,
        PathBuf::from("/data/colo/2_side/indoor-light/coco.json")
    );

    let mut out = Vec::new();
    write_partition_listing(&mut out, &loader).unwrap();
    let text = String::from_utf8(out).unwrap();

    let headers: Vec<&str> = text.lines().filter(|l| !l.starts_with(' ')).collect();
    assert_eq!(headers.len(), Partition::ALL.len());
    assert!(text.contains("b_light\tFor testing the model generalization from daylight"));
    assert!(text.contains("  infrared\t/data/colo/1_top/infrared/coco.json"));
    // 2 lighting partitions with 5 splits, 6 with train/test
    assert_eq!(text.lines().count(), 8 + 2 * 5 + 6 * 2);
}
