//! Round-trip properties of built-in values.

use bytes::Bytes;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tagged_codec::{Map, Object, Regex, Registry, Set, Tag, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn roundtrip(registry: &Registry, value: &Value) -> Value {
    let encoded = registry.encode(value).expect("failed to encode");
    let decoded = registry.decode(encoded.clone()).expect("failed to decode");
    assert_eq!(&decoded, value);

    // Re-encoding the decoded value reproduces the same bytes
    let reencoded = registry.encode(&decoded).expect("failed to re-encode");
    assert_eq!(reencoded, encoded);
    decoded
}

/// Reads the element count of an encoded composite.
fn count(encoded: &Bytes) -> u32 {
    u32::from_le_bytes(encoded[1..5].try_into().unwrap())
}

fn random_string(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..16);
    (0..len)
        .map(|_| match rng.gen_range(0..4) {
            0 => 'é',
            1 => '✓',
            _ => rng.gen_range(b'a'..=b'z') as char,
        })
        .collect()
}

fn random_value(rng: &mut StdRng, depth: usize) -> Value {
    let kinds = if depth == 0 { 6 } else { 11 };
    match rng.gen_range(0..kinds) {
        0 => Value::Bool(rng.gen()),
        1 => Value::String(random_string(rng)),
        2 => Value::Number(rng.gen::<f64>() * 1e6 - 5e5),
        3 => Value::BigInt(rng.gen()),
        4 => Value::Null,
        5 => Value::Undefined,
        6 => Value::Regex(Regex::new(random_string(rng), "gi")),
        7 => {
            let len = rng.gen_range(0..4);
            Value::Array((0..len).map(|_| random_value(rng, depth - 1)).collect())
        }
        8 => {
            let len = rng.gen_range(0..4);
            let mut map = Map::new();
            for _ in 0..len {
                map.insert(random_value(rng, depth - 1), random_value(rng, depth - 1));
            }
            Value::Map(map)
        }
        9 => {
            let len = rng.gen_range(0..4);
            let mut set = Set::new();
            for _ in 0..len {
                set.insert(random_value(rng, depth - 1));
            }
            Value::Set(set)
        }
        _ => {
            let len = rng.gen_range(0..4);
            let mut object = Object::new();
            for _ in 0..len {
                object.insert(random_string(rng), random_value(rng, depth - 1));
            }
            Value::Object(object)
        }
    }
}

#[test]
fn test_scalars() {
    let registry = Registry::new();
    let values = [
        Value::Bool(true),
        Value::Bool(false),
        Value::from(""),
        Value::from("hello, world"),
        Value::Number(0.0),
        Value::Number(-0.0),
        Value::Number(f64::MAX),
        Value::Number(f64::MIN_POSITIVE),
        Value::Number(f64::INFINITY),
        Value::Number(f64::NAN),
        Value::BigInt(0),
        Value::BigInt(i64::MIN),
        Value::BigInt(i64::MAX),
        Value::Null,
        Value::Undefined,
    ];
    for value in values.iter() {
        roundtrip(&registry, value);
    }
}

#[test]
fn test_negative_zero_survives() {
    let registry = Registry::new();
    let decoded = roundtrip(&registry, &Value::Number(-0.0));
    assert!(decoded.as_f64().unwrap().is_sign_negative());
}

#[test]
fn test_bigint_beyond_64_bits_wraps() {
    let registry = Registry::new();
    let value = Value::from(i128::from(i64::MAX) + 1);
    let decoded = roundtrip(&registry, &value);
    assert_eq!(decoded.as_bigint(), Some(i64::MIN));
}

#[test]
fn test_collections() {
    let registry = Registry::new();

    let array = Value::Array(vec![Value::from(1), Value::from("two"), Value::Null]);
    roundtrip(&registry, &array);

    let set: Set = ["b", "a", "c"].into_iter().collect();
    let decoded = roundtrip(&registry, &Value::Set(set));
    let order: Vec<_> = decoded
        .as_set()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["b", "a", "c"]);

    let object: Object = [("z", 1), ("a", 2)].into_iter().collect();
    let decoded = roundtrip(&registry, &Value::Object(object));
    assert_eq!(
        decoded.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["z", "a"]
    );

    roundtrip(&registry, &Value::Regex(Regex::new(r"^\d+(?:\.\d+)?$", "gu")));
    roundtrip(&registry, &Value::Array(vec![]));
    roundtrip(&registry, &Value::Object(Object::new()));
}

#[test]
fn test_mixed_map_preserves_pairs_and_order() {
    let registry = Registry::new();
    let nested: Object = [("inner", Value::from(true)), ("depth", Value::from(2))]
        .into_iter()
        .collect();

    let mut map = Map::new();
    map.insert(3, "three");
    map.insert("key", 4.5);
    map.insert(Value::Object(nested.clone()), "object key");
    map.insert("nested", Value::Object(nested.clone()));
    map.insert(-1, Value::Array(vec![Value::Null, Value::Undefined]));

    let decoded = roundtrip(&registry, &Value::Map(map.clone()));
    let decoded = decoded.as_map().unwrap();
    assert_eq!(decoded, &map);
    assert_eq!(
        decoded.iter().map(|(k, _)| k).collect::<Vec<_>>(),
        map.iter().map(|(k, _)| k).collect::<Vec<_>>()
    );
    assert_eq!(decoded.get(&Value::from(3)), Some(&Value::from("three")));
    assert_eq!(
        decoded.get(&Value::from("nested")),
        Some(&Value::Object(nested))
    );
}

#[test]
fn test_single_null_element() {
    let registry = Registry::new();
    for element in [Value::Null, Value::Undefined] {
        let value = Value::Array(vec![element.clone()]);
        let encoded = registry.encode(&value).unwrap();
        assert_eq!(count(&encoded), 1);
        let decoded = registry.decode(encoded).unwrap();
        assert_eq!(decoded.as_array().unwrap(), &vec![element]);
    }
}

#[test]
fn test_composite_growth() {
    let registry = Registry::new();

    let array = Value::Array(vec![Value::from(1), Value::from(2)]);
    let encoded = registry.encode(&array).unwrap();
    let Value::Array(mut items) = registry.decode(encoded.clone()).unwrap() else {
        panic!("expected an array");
    };
    items.push(Value::from(3));
    let grown = registry.encode(&Value::Array(items)).unwrap();
    assert_eq!(count(&grown), count(&encoded) + 1);

    let set: Set = ["a", "b"].into_iter().collect();
    let encoded = registry.encode(&Value::Set(set)).unwrap();
    let Value::Set(mut set) = registry.decode(encoded.clone()).unwrap() else {
        panic!("expected a set");
    };
    assert!(set.insert("c"));
    let grown = registry.encode(&Value::Set(set)).unwrap();
    assert_eq!(grown[0], Tag::SET.get());
    assert_eq!(count(&grown), count(&encoded) + 1);
}

#[test]
fn test_random_values() {
    init_tracing();
    let registry = Registry::new();
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..500 {
        let value = random_value(&mut rng, 4);
        roundtrip(&registry, &value);
    }
}

#[test]
fn test_deep_nesting() {
    let registry = Registry::new();
    let mut value = Value::Null;
    for _ in 0..200 {
        value = Value::Array(vec![value]);
    }
    roundtrip(&registry, &value);
}
