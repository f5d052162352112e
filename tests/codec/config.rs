//! Options loaded from `flatrec.toml`

use crate::common::*;
use flatrec::{
    decode, recordable, Asset, CodecConfig, ConfigError, DecodeError, Value,
    CONFIG_FILE_NAME,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, text).unwrap();
    path
}

#[derive(Debug, Clone, PartialEq)]
struct Upload {
    key: String,
    file: PathBuf,
}

recordable! { Upload as "Upload" { key, file } }

#[test]
fn test_config_file_drives_encode_and_decode() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
identifier_key = "key"
attachments = "strings"
"#,
    );
    let options = CodecConfig::from_file(&path)
        .unwrap()
        .into_options()
        .unwrap();

    let upload = Upload {
        key: "u1".into(),
        file: PathBuf::from("/var/uploads/u1.bin"),
    };
    let (store, root) = store_with(&upload, &options);

    assert_eq!(root.name(), "u1");
    let record = store.get(&root).unwrap();
    assert!(!record.contains("key"));
    assert_eq!(
        record.get("file"),
        Some(&Value::String("/var/uploads/u1.bin".into()))
    );
    assert_eq!(decode::<Upload, _>(&record, &store, &options).unwrap(), upload);
}

#[test]
fn test_default_file_content_matches_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, CodecConfig::default_toml());
    let options = CodecConfig::from_file(&path)
        .unwrap()
        .into_options()
        .unwrap();

    assert!(options.identifier_key().matches("id"));
    assert!(!options.identifier_key().matches("key"));
    assert!(options.cycle_guard());

    let (store, root) = store_with(&person("001", "Coleman"), &options);
    assert!(store.get(&root).unwrap().parent().is_none());

    let attached = options
        .attachments()
        .apply(&flatrec::Attachable::Path(std::path::Path::new("/var/uploads/u2.bin")));
    assert_eq!(
        attached,
        Value::Asset(Asset::File(PathBuf::from("/var/uploads/u2.bin")))
    );
}

#[test]
fn test_nested_linkage_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "parent_linkage = \"nested\"\n");
    let options = CodecConfig::from_file(&path)
        .unwrap()
        .into_options()
        .unwrap();

    let mut root = person("001", "Root");
    root.friends.push(person("002", "Child"));
    let (store, id) = store_with(&root, &options);

    assert_eq!(store.delete_cascade(&id).len(), 2);
    assert!(store.is_empty());
}

#[test]
fn test_depth_limit_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "max_depth = 1\n");
    let options = CodecConfig::from_file(&path)
        .unwrap()
        .into_options()
        .unwrap();

    let mut root = person("001", "Root");
    root.friends.push(person("002", "Child"));
    let (store, id) = store_with(&root, &options);

    let err = decode::<Person, _>(&store.get(&id).unwrap(), &store, &options).unwrap_err();
    assert!(matches!(err, DecodeError::DepthExceeded { limit: 1, .. }));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = CodecConfig {
        cycle_guard: false,
        max_depth: 12,
        ..CodecConfig::default()
    };
    config.write_to_file(&path).unwrap();

    assert_eq!(CodecConfig::from_file(&path).unwrap(), config);
}

#[test]
fn test_bad_config_file_reports_setting() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "attachments = \"inline\"\n");

    match CodecConfig::from_file(&path) {
        Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "attachments"),
        other => panic!("unexpected result {:?}", other),
    }
}
