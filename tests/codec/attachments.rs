//! Boxing of URLs and filesystem paths

use crate::common::*;
use flatrec::{
    decode, recordable, Asset, Attachable, AttachmentStrategy, Boxing, CodecOptions, EncodeError,
    Value,
};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
struct Document {
    id: String,
    source: Url,
    local_copy: PathBuf,
    mirrors: Vec<Url>,
}

recordable! { Document as "Document" { id, source, local_copy, mirrors } }

fn document() -> Document {
    Document {
        id: "report".into(),
        source: Url::parse("file:///srv/docs/report.pdf").unwrap(),
        local_copy: PathBuf::from("/tmp/report.pdf"),
        mirrors: vec![
            Url::parse("https://mirror.example.org/report.pdf").unwrap(),
            Url::parse("https://backup.example.org/report.pdf").unwrap(),
        ],
    }
}

/// Mirrors mixing a remote URL with a local file
fn document_with_local_mirror() -> Document {
    let mut doc = document();
    doc.mirrors[1] = Url::parse("file:///mnt/backup/report.pdf").unwrap();
    doc
}

#[test]
fn test_local_files_become_assets() {
    init_tracing();
    let original = document();
    let options = CodecOptions::default();
    let (store, root) = store_with(&original, &options);
    let record = store.get(&root).unwrap();

    assert_eq!(
        record.get("source"),
        Some(&Value::Asset(Asset::File(PathBuf::from("/srv/docs/report.pdf"))))
    );
    assert_eq!(
        record.get("local_copy"),
        Some(&Value::Asset(Asset::File(PathBuf::from("/tmp/report.pdf"))))
    );
    let mirrors = record.get("mirrors").unwrap().as_list().unwrap();
    assert_eq!(
        mirrors[0],
        Value::String("https://mirror.example.org/report.pdf".into())
    );
    assert!(mirrors.iter().all(|m| matches!(m, Value::String(_))));

    let back: Document = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_mixed_boxing_in_one_list_is_rejected() {
    let mut collector = CountingCollector::default();
    let err = flatrec::encode(
        &document_with_local_mirror(),
        &mut collector,
        &CodecOptions::default(),
    )
    .unwrap_err();

    match err {
        EncodeError::UnsupportedNestedValue { path, kind } => {
            assert_eq!(path.to_string(), "mirrors");
            assert_eq!(kind, "heterogeneous list");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(collector.registered.is_empty());
}

#[test]
fn test_strings_only_keeps_text() {
    let original = document_with_local_mirror();
    let options = CodecOptions::builder()
        .attachments(AttachmentStrategy::strings_only())
        .build();
    let (store, root) = store_with(&original, &options);
    let record = store.get(&root).unwrap();

    assert_eq!(
        record.get("source"),
        Some(&Value::String("file:///srv/docs/report.pdf".into()))
    );
    assert_eq!(
        record.get("local_copy"),
        Some(&Value::String("/tmp/report.pdf".into()))
    );

    let back: Document = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_custom_strategy_controls_boxing() {
    let options = CodecOptions::builder()
        .attachments(AttachmentStrategy::custom(|item: &Attachable<'_>| match item {
            Attachable::Url(url) => Boxing::Asset(Asset::Url(url.to_string())),
            Attachable::Path(path) => Boxing::Plain(path.display().to_string()),
        }))
        .build();
    let original = document();
    let (store, root) = store_with(&original, &options);
    let record = store.get(&root).unwrap();

    assert!(matches!(record.get("source"), Some(Value::Asset(Asset::Url(_)))));
    assert!(matches!(record.get("local_copy"), Some(Value::String(_))));

    let back: Document = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_decoding_ignores_boxing_choice() {
    let original = document();
    let (store, root) = store_with(&original, &CodecOptions::default());
    let record = store.get(&root).unwrap();

    let strings = CodecOptions::builder()
        .attachments(AttachmentStrategy::strings_only())
        .build();
    let back: Document = decode(&record, &store, &strings).unwrap();
    assert_eq!(back, original);
}
