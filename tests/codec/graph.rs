//! Shape of the produced record graph

use crate::common::*;
use flatrec::{
    decode, encode, recordable, CodecOptions, EncodeError, Identifier, IdentifierKeyStrategy,
    ParentStrategy, ReferenceAction,
};

#[test]
fn test_root_is_registered_last() {
    init_tracing();
    let mut root = person("001", "Root");
    let mut middle = person("002", "Middle");
    middle.friends.push(person("003", "Leaf"));
    root.friends.push(middle);

    let mut collector = CountingCollector::default();
    let id = encode(&root, &mut collector, &CodecOptions::default()).unwrap();

    assert_eq!(
        collector.registered,
        vec![person_id("003"), person_id("002"), person_id("001")]
    );
    assert_eq!(collector.registered.last(), Some(&id));
}

#[test]
fn test_identity_field_is_never_stored() {
    let mut t = team(3, vec![person("010", "A")]);
    t.captain = Some(person("011", "B"));
    let (batch, _) = batch_of(&t, &CodecOptions::default());

    for record in &batch {
        assert!(!record.contains("id"), "{} stores its identity", record.id());
    }
}

#[test]
fn test_repeated_identity_registers_once_per_batch() {
    let twin = person("050", "Twin");
    let t = team(4, vec![twin.clone(), twin.clone(), twin]);
    let (batch, root) = batch_of(&t, &CodecOptions::default());

    assert_eq!(batch.len(), 2);
    let ids: Vec<_> = batch.ids().cloned().collect();
    assert_eq!(ids, vec![person_id("050"), root]);
}

#[test]
fn test_failed_encode_registers_nothing() {
    let mut root = person("001", "Root");
    let mut friend = person("002", "Friend");
    friend.friends.push(person("", "Nameless"));
    root.friends.push(friend);

    let mut collector = CountingCollector::default();
    let err = encode(&root, &mut collector, &CodecOptions::default()).unwrap_err();

    assert!(matches!(err, EncodeError::InvalidIdentifier { .. }));
    assert!(err.to_string().contains("friends[0]"));
    assert!(collector.registered.is_empty());
}

#[test]
fn test_default_strategy_leaves_children_unlinked() {
    let mut root = person("001", "Root");
    root.friends.push(person("002", "Friend"));
    let (batch, _) = batch_of(&root, &CodecOptions::default());

    assert!(batch.iter().all(|r| r.parent().is_none()));
}

#[test]
fn test_nested_strategy_links_to_encloser() {
    let options = CodecOptions::builder().parent(ParentStrategy::Nested).build();
    let mut friend = person("002", "Friend");
    friend.friends.push(person("003", "FoF"));
    let mut t = team(9, vec![friend]);
    t.captain = Some(person("004", "Cap"));

    let (batch, root) = batch_of(&t, &options);

    let parent_of = |name: &str| {
        let parent = batch.get(&person_id(name)).unwrap().parent().unwrap();
        assert_eq!(parent.action, ReferenceAction::DeleteSelf);
        parent.identifier.clone()
    };
    assert_eq!(parent_of("002"), root);
    assert_eq!(parent_of("004"), root);
    assert_eq!(parent_of("003"), person_id("002"));
    assert!(batch.get(&root).unwrap().parent().is_none());
}

#[test]
fn test_custom_strategy_sees_field_path() {
    let group = Identifier::new("Group", "captains");
    let target = group.clone();
    let options = CodecOptions::builder()
        .parent(ParentStrategy::custom(move |path, _child| {
            (path.to_string() == "captain").then(|| target.clone())
        }))
        .build();

    let mut t = team(5, vec![person("020", "Member")]);
    t.captain = Some(person("021", "Cap"));
    let (batch, _) = batch_of(&t, &options);

    let captain = batch.get(&person_id("021")).unwrap();
    assert_eq!(captain.parent().unwrap().identifier, group);
    assert!(batch.get(&person_id("020")).unwrap().parent().is_none());
}

#[test]
fn test_nested_linkage_drives_cascade_delete() {
    let options = CodecOptions::builder().parent(ParentStrategy::Nested).build();
    let mut member = person("030", "Member");
    member.friends.push(person("031", "Friend"));
    let mut t = team(6, vec![member]);
    t.lead = Some(person_id("999"));

    let (store, root) = store_with(&t, &options);
    let bystander = person("040", "Other");
    store.apply(batch_of(&bystander, &options).0);
    assert_eq!(store.len(), 4);

    let removed = store.delete_cascade(&root);
    assert_eq!(removed.len(), 3);
    assert_eq!(removed[0], root);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&person_id("040")));
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    uid: String,
    owner: Person,
}

recordable! { Account as "Account" { uid, owner } }

#[test]
fn test_identifier_key_strategy_applies_to_every_record() {
    let options = CodecOptions::builder()
        .identifier_key(IdentifierKeyStrategy::any_of(&["id", "uid"]))
        .build();
    let account = Account {
        uid: "acc-1".into(),
        owner: person("001", "Owner"),
    };

    let (store, root) = store_with(&account, &options);
    assert_eq!(root, Identifier::new("Account", "acc-1"));
    let record = store.get(&root).unwrap();
    assert!(!record.contains("uid"));
    assert!(record.get("owner").unwrap().is_reference());

    let back: Account = decode(&record, &store, &options).unwrap();
    assert_eq!(back, account);
}

#[test]
fn test_record_without_identity_field_is_rejected() {
    let options = CodecOptions::builder()
        .identifier_key(IdentifierKeyStrategy::named("key"))
        .build();
    let err = encode(&person("001", "A"), &mut CountingCollector::default(), &options)
        .unwrap_err();
    assert!(matches!(err, EncodeError::InvalidIdentifier { .. }));
}
