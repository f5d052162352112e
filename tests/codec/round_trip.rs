//! Values that must come back unchanged after encode then decode

use crate::common::*;
use chrono::{TimeZone, Utc};
use flatrec::{
    decode, recordable, Blob, CodecOptions, GeoPoint, Identifier, Plain, Ref, Value,
};
use proptest::prelude::*;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Sensor {
    id: Uuid,
    label: String,
    installed: chrono::DateTime<Utc>,
    position: Option<GeoPoint>,
    firmware: Blob,
    readings: Vec<f64>,
    manual: Option<Url>,
    calibration: Plain<Vec<i64>>,
    owner: Ref<Identifier>,
}

recordable! {
    Sensor as "Sensor" {
        id, label, installed, position, firmware, readings, manual, calibration, owner
    }
}

fn sensor() -> Sensor {
    Sensor {
        id: Uuid::from_u128(0x5e45_0001),
        label: "roof".into(),
        installed: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        position: GeoPoint::new(52.52, 13.40),
        firmware: Blob(vec![0xde, 0xad, 0xbe, 0xef]),
        readings: vec![20.5, 21.0, -4.25],
        manual: Some(Url::parse("https://example.com/manual.pdf").unwrap()),
        calibration: Plain(vec![-3, 12]),
        owner: Ref(person_id("001")),
    }
}

#[test]
fn test_special_values_round_trip() {
    init_tracing();
    let original = sensor();
    let options = CodecOptions::default();
    let (store, root) = store_with(&original, &options);

    assert_eq!(root.record_type(), "Sensor");
    assert_eq!(root.name(), original.id.to_string());
    assert_eq!(store.len(), 1);

    let record = store.get(&root).unwrap();
    assert!(matches!(record.get("installed"), Some(Value::Timestamp(_))));
    assert!(matches!(record.get("position"), Some(Value::Location(_))));
    assert!(matches!(record.get("firmware"), Some(Value::Bytes(_))));
    assert!(record.get("owner").unwrap().is_reference());

    let back: Sensor = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn test_absent_optionals_are_not_stored() {
    let mut original = sensor();
    original.position = None;
    original.manual = None;
    let options = CodecOptions::default();
    let (store, root) = store_with(&original, &options);

    let record = store.get(&root).unwrap();
    assert!(!record.contains("position"));
    assert!(!record.contains("manual"));

    let back: Sensor = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_nested_composites_round_trip() {
    let mut captain = person("010", "Ada");
    captain.friends = vec![person("011", "Bo"), person("012", "Cy")];
    let mut original = team(7, vec![person("020", "Di"), person("021", "Ed")]);
    original.captain = Some(captain);
    original.lead = Some(person_id("020"));

    let options = CodecOptions::default();
    let (store, root) = store_with(&original, &options);

    assert_eq!(root, Identifier::new("Team", "7"));
    assert_eq!(store.len(), 6);

    let record = store.get(&root).unwrap();
    let back: Team = decode(&record, &store, &options).unwrap();
    assert_eq!(back, original);
    // captain, two friends, two members; the lead is a bare reference
    assert_eq!(store.fetch_count(), 5);
}

#[test]
fn test_shared_friend_stored_once() {
    let shared = person("100", "Shared");
    let mut a = person("101", "A");
    a.friends.push(shared.clone());
    let mut b = person("102", "B");
    b.friends.push(shared.clone());
    let original = team(1, vec![a, b]);

    let options = CodecOptions::default();
    let (batch, root) = batch_of(&original, &options);
    assert_eq!(batch.len(), 4);

    let store = flatrec::MemoryStore::new();
    store.apply(batch);
    let back: Team = decode(&store.get(&root).unwrap(), &store, &options).unwrap();
    assert_eq!(back, original);
}

fn arb_person(id: usize) -> impl Strategy<Value = Person> {
    ("[a-zA-Z ]{0,12}", any::<i32>()).prop_map(move |(name, gender)| Person {
        id: format!("p{}", id),
        name,
        gender,
        friends: Vec::new(),
    })
}

fn arb_person_tree() -> impl Strategy<Value = Person> {
    (arb_person(0), prop::collection::vec(any::<(String, i32)>(), 0..6)).prop_map(
        |(mut root, friends)| {
            root.friends = friends
                .into_iter()
                .enumerate()
                .map(|(i, (name, gender))| Person {
                    id: format!("f{}", i),
                    name,
                    gender,
                    friends: Vec::new(),
                })
                .collect();
            root
        },
    )
}

proptest! {
    #[test]
    fn prop_person_tree_round_trips(original in arb_person_tree()) {
        let options = CodecOptions::default();
        let (store, root) = store_with(&original, &options);
        prop_assert_eq!(store.len(), original.friends.len() + 1);

        let back: Person = decode(&store.get(&root).unwrap(), &store, &options).unwrap();
        prop_assert_eq!(store.fetch_count() as usize, original.friends.len());
        prop_assert_eq!(back, original);
    }

    #[test]
    fn prop_integer_fields_keep_their_value(id in any::<u32>(), gender in any::<i32>()) {
        let mut p = person("x", "x");
        p.gender = gender;
        let t = Team { captain: Some(p.clone()), ..team(id, vec![]) };
        let options = CodecOptions::default();
        let (store, root) = store_with(&t, &options);

        prop_assert_eq!(root.name(), id.to_string());
        let back: Team = decode(&store.get(&root).unwrap(), &store, &options).unwrap();
        prop_assert_eq!(back.id, id);
        prop_assert_eq!(back.captain, Some(p));
    }
}
