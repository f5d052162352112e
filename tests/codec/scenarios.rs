//! Reference scenarios for the person model

use crate::common::*;
use flatrec::{decode, CodecOptions, FetchContext, Value};

#[test]
fn test_single_person_flattens_to_one_record() {
    init_tracing();
    let coleman = Person {
        id: "001".into(),
        name: "Coleman".into(),
        gender: 0,
        friends: vec![],
    };
    let options = CodecOptions::default();
    let (store, root) = store_with(&coleman, &options);

    assert_eq!(root, person_id("001"));
    assert_eq!(store.len(), 1);

    let record = store.get(&root).unwrap();
    assert_eq!(record.record_type(), "Person");
    assert_eq!(record.get("name"), Some(&Value::String("Coleman".into())));
    assert_eq!(record.get("gender"), Some(&Value::Int(0)));
    assert!(!record.contains("id"));

    let back: Person = decode(&record, &store, &options).unwrap();
    assert_eq!(back, coleman);
}

#[test]
fn test_friend_becomes_referenced_record() {
    init_tracing();
    let mut coleman = person("001", "Coleman");
    coleman.friends.push(person("002", "Dana"));
    let options = CodecOptions::default();
    let (store, root) = store_with(&coleman, &options);

    assert_eq!(store.len(), 2);
    let record = store.get(&root).unwrap();
    match record.get("friends") {
        Some(Value::List(items)) => {
            assert_eq!(items.len(), 1);
            let reference = items[0].as_reference().unwrap();
            assert_eq!(reference.identifier, person_id("002"));
        }
        other => panic!("friends stored as {:?}", other),
    }

    let friend = store.get(&person_id("002")).unwrap();
    assert_eq!(friend.get("name"), Some(&Value::String("Dana".into())));
    assert_eq!(friend.get("friends"), Some(&Value::List(vec![])));

    let back: Person = decode(&record, &store, &options).unwrap();
    assert_eq!(back, coleman);
    assert_eq!(store.fetch_count(), 1);
}

#[test]
fn test_empty_list_decodes_without_fetch() {
    let loner = person("003", "Eli");
    let options = CodecOptions::default();
    let (store, root) = store_with(&loner, &options);

    let record = store.get(&root).unwrap();
    assert_eq!(record.get("friends"), Some(&Value::List(vec![])));

    let back: Person = decode(&record, &store, &options).unwrap();
    assert!(back.friends.is_empty());
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn test_fetches_follow_field_order() {
    let mut root_person = person("001", "Coleman");
    root_person.friends = vec![person("003", "C"), person("002", "B")];
    let options = CodecOptions::default();
    let (store, root) = store_with(&root_person, &options);

    let order = std::sync::Mutex::new(Vec::new());
    let recording = flatrec::fetch_fn(|id: &flatrec::Identifier| {
        order.lock().unwrap().push(id.name().to_string());
        store.fetch(id)
    });
    let record = store.get(&root).unwrap();
    let back: Person = decode(&record, &recording, &options).unwrap();

    assert_eq!(back, root_person);
    assert_eq!(*order.lock().unwrap(), vec!["003", "002"]);
}
