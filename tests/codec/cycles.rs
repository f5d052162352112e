//! Cycle guard and depth limit

use crate::common::*;
use flatrec::{
    decode, CodecOptions, DecodeError, Identifier, MemoryStore, Record, Reference, Value,
};

fn stored_person(name: &str, friends: &[&str]) -> Record {
    let mut record = Record::new(person_id(name));
    record.set("name", name);
    record.set("gender", 0i64);
    let refs = friends
        .iter()
        .map(|f| Value::Reference(Reference::new(person_id(f))))
        .collect::<Vec<_>>();
    record.set("friends", refs);
    record
}

/// `p0 -> p1 -> ... -> p{len-1}`
fn chain(len: usize) -> MemoryStore {
    let store = MemoryStore::new();
    for i in 0..len {
        let next = format!("p{}", i + 1);
        let friends: Vec<&str> = if i + 1 < len { vec![next.as_str()] } else { vec![] };
        store.insert(stored_person(&format!("p{}", i), &friends));
    }
    store
}

#[test]
fn test_two_record_cycle_is_detected() {
    init_tracing();
    let store = MemoryStore::new();
    store.insert(stored_person("a", &["b"]));
    store.insert(stored_person("b", &["a"]));

    let root = store.get(&person_id("a")).unwrap();
    let err = decode::<Person, _>(&root, &store, &CodecOptions::default()).unwrap_err();

    match err {
        DecodeError::CycleDetected { path, identifier } => {
            assert_eq!(identifier, person_id("a"));
            assert_eq!(path.to_string(), "friends[0].friends[0]");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(store.fetch_count(), 1);
}

#[test]
fn test_self_reference_is_detected_without_fetch() {
    let store = MemoryStore::new();
    store.insert(stored_person("me", &["me"]));

    let root = store.get(&person_id("me")).unwrap();
    let err = decode::<Person, _>(&root, &store, &CodecOptions::default()).unwrap_err();

    assert!(matches!(err, DecodeError::CycleDetected { .. }));
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let store = MemoryStore::new();
    store.insert(stored_person("top", &["left", "right"]));
    store.insert(stored_person("left", &["bottom"]));
    store.insert(stored_person("right", &["bottom"]));
    store.insert(stored_person("bottom", &[]));

    let root = store.get(&person_id("top")).unwrap();
    let back: Person = decode(&root, &store, &CodecOptions::default()).unwrap();

    assert_eq!(back.friends[0].friends[0].id, "bottom");
    assert_eq!(back.friends[1].friends[0].id, "bottom");
    assert_eq!(store.fetch_count(), 4);
}

#[test]
fn test_chain_within_limit_decodes() {
    let store = chain(5);
    let options = CodecOptions::builder().max_depth(5).build();

    let root = store.get(&person_id("p0")).unwrap();
    let back: Person = decode(&root, &store, &options).unwrap();

    let mut depth = 1;
    let mut cursor = &back;
    while let Some(next) = cursor.friends.first() {
        depth += 1;
        cursor = next;
    }
    assert_eq!(depth, 5);
}

#[test]
fn test_chain_beyond_limit_fails() {
    let store = chain(6);
    let options = CodecOptions::builder().max_depth(5).build();

    let root = store.get(&person_id("p0")).unwrap();
    let err = decode::<Person, _>(&root, &store, &options).unwrap_err();

    match err {
        DecodeError::DepthExceeded { limit, path } => {
            assert_eq!(limit, 5);
            assert_eq!(path.depth(), 10);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_disabled_guard_falls_back_to_depth_limit() {
    let store = MemoryStore::new();
    store.insert(stored_person("a", &["b"]));
    store.insert(stored_person("b", &["a"]));
    let options = CodecOptions::builder()
        .cycle_guard(false)
        .max_depth(8)
        .build();

    let root = store.get(&person_id("a")).unwrap();
    let err = decode::<Person, _>(&root, &store, &options).unwrap_err();

    assert!(matches!(err, DecodeError::DepthExceeded { limit: 8, .. }));
    assert_eq!(store.fetch_count(), 7);
}

#[test]
fn test_cycle_inside_optional_is_still_an_error() {
    let store = MemoryStore::new();
    store.insert(stored_person("cap", &["cap"]));
    let mut team_record = Record::new(Identifier::new("Team", "1"));
    team_record.set("title", "loop");
    team_record.set("captain", Reference::new(person_id("cap")));
    team_record.set("members", Vec::<Value>::new());

    let err = decode::<Team, _>(&team_record, &store, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::CycleDetected { .. }));
}
