#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use tagged_codec::{Config, Error, Map, Object, Record, Regex, Registry, Set, Value};

/// Upper bound on nesting accepted while decoding arbitrary bytes.
const MAX_DEPTH: usize = 256;

#[derive(Arbitrary, Debug)]
enum ArbValue {
    Bool(bool),
    String(String),
    Number(f64),
    BigInt(i64),
    Null,
    Undefined,
    Array(Vec<ArbValue>),
    Map(Vec<(ArbValue, ArbValue)>),
    Set(Vec<ArbValue>),
    Regex(String, String),
    Object(Vec<(String, ArbValue)>),
    Record(Vec<(String, ArbValue)>),
}

impl From<ArbValue> for Value {
    fn from(value: ArbValue) -> Self {
        match value {
            ArbValue::Bool(b) => Value::Bool(b),
            ArbValue::String(s) => Value::String(s),
            ArbValue::Number(n) => Value::Number(n),
            ArbValue::BigInt(n) => Value::BigInt(n),
            ArbValue::Null => Value::Null,
            ArbValue::Undefined => Value::Undefined,
            ArbValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            ArbValue::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect::<Map>(),
            ),
            ArbValue::Set(items) => Value::Set(items.into_iter().map(Value::from).collect::<Set>()),
            ArbValue::Regex(source, flags) => Value::Regex(Regex::new(source, flags)),
            ArbValue::Object(fields) => Value::Object(fields_to_object(fields)),
            ArbValue::Record(fields) => Value::from(Record::new("Record", fields_to_object(fields))),
        }
    }
}

fn fields_to_object(fields: Vec<(String, ArbValue)>) -> Object {
    fields
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect()
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    Bytes(&'a [u8]),
    Value(ArbValue),
}

fn registry() -> Registry {
    let mut registry = Registry::with_config(Config {
        max_depth: MAX_DEPTH,
        ..Config::default()
    });
    registry
        .register("Record", None)
        .expect("failed to register");
    registry
}

fn roundtrip_bytes(registry: &Registry, data: Bytes) {
    // Arbitrary input must fail cleanly or decode to a value that round-trips
    let Ok(decoded) = registry.decode(data) else {
        return;
    };
    let encoded = registry
        .encode(&decoded)
        .expect("Failed to encode a successfully decoded input!");
    let redecoded = registry
        .decode(encoded.clone())
        .expect("Failed to decode a successfully encoded input!");
    assert_eq!(decoded, redecoded);
    assert_eq!(registry.encode(&redecoded).unwrap(), encoded);
}

fn roundtrip_value(registry: &Registry, value: Value) {
    let encoded = match registry.encode(&value) {
        Ok(encoded) => encoded,
        Err(Error::FieldTooLarge(_)) => return,
        Err(err) => panic!("Failed to encode value: {err}"),
    };
    let decoded = match registry.decode(encoded.clone()) {
        Ok(decoded) => decoded,
        Err(Error::DepthExceeded(_)) => return,
        Err(err) => panic!("Failed to decode a successfully encoded input: {err}"),
    };
    assert_eq!(decoded, value);
    assert_eq!(registry.encode(&decoded).unwrap(), encoded);
}

fn fuzz(input: FuzzInput) {
    let registry = registry();
    match input {
        FuzzInput::Bytes(it) => roundtrip_bytes(&registry, Bytes::from(it.to_vec())),
        FuzzInput::Value(it) => roundtrip_value(&registry, it.into()),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
