use crate::unit::common::*;
use apache_avro::types::Value as AvroValue;
use std::collections::HashMap;
use velotail::velotail::serialization::{AvroCodec, SerializationError, WireEnvelope, ENVELOPE_LEN};

const ORDER_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "OrderEvent",
    "namespace": "com.example.orders",
    "fields": [
        {"name": "order_id", "type": "string"},
        {"name": "quantity", "type": "int"},
        {"name": "price", "type": "double"},
        {"name": "status", "type": {"type": "enum", "name": "Status", "symbols": ["NEW", "FILLED"]}},
        {"name": "attributes", "type": {"type": "map", "values": "string"}},
        {"name": "comment", "type": ["null", "string"], "default": null}
    ]
}
"#;

fn order_value() -> AvroValue {
    let mut attributes = HashMap::new();
    attributes.insert("desk".to_string(), AvroValue::String("emea".to_string()));

    AvroValue::Record(vec![
        ("order_id".to_string(), AvroValue::String("ord-1".to_string())),
        ("quantity".to_string(), AvroValue::Int(250)),
        ("price".to_string(), AvroValue::Double(101.25)),
        ("status".to_string(), AvroValue::Enum(1, "FILLED".to_string())),
        ("attributes".to_string(), AvroValue::Map(attributes)),
        (
            "comment".to_string(),
            AvroValue::Union(0, Box::new(AvroValue::Null)),
        ),
    ])
}

fn framed_order(schema_id: u32) -> Vec<u8> {
    let schema = apache_avro::Schema::parse_str(ORDER_SCHEMA).unwrap();
    let datum = apache_avro::to_avro_datum(&schema, order_value()).unwrap();
    let mut bytes = encode_header(0, schema_id).to_vec();
    bytes.extend_from_slice(&datum);
    bytes
}

#[test]
fn test_hello_event_round_trip_through_envelope() {
    let bytes = framed_event(EVENT_SCHEMA_ID, "hello");
    let envelope = WireEnvelope::parse(&bytes).unwrap();
    assert_eq!(envelope.schema_id, EVENT_SCHEMA_ID);
    assert_eq!(envelope.payload, &bytes[ENVELOPE_LEN..]);

    let codec = AvroCodec::new(EVENT_SCHEMA).unwrap();
    let text = codec.decode_to_text(envelope.payload).unwrap();
    assert!(text.contains("hello"));
}

#[test]
fn test_order_event_renders_as_json() {
    let bytes = framed_order(42);
    let envelope = WireEnvelope::parse(&bytes).unwrap();
    assert_eq!(envelope.schema_id, 42);

    let codec = AvroCodec::new(ORDER_SCHEMA).unwrap();
    assert_eq!(
        codec.schema_name().as_deref(),
        Some("com.example.orders.OrderEvent")
    );

    let text = codec.decode_to_text(envelope.payload).unwrap();
    assert!(!text.contains('\n'));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["order_id"], "ord-1");
    assert_eq!(json["quantity"], 250);
    assert_eq!(json["price"], 101.25);
    assert_eq!(json["status"], "FILLED");
    assert_eq!(json["attributes"]["desk"], "emea");
    assert!(json["comment"].is_null());
}

#[test]
fn test_same_bytes_render_identically() {
    let bytes = framed_order(42);
    let codec = AvroCodec::new(ORDER_SCHEMA).unwrap();
    let envelope = WireEnvelope::parse(&bytes).unwrap();

    let renders: Vec<String> = (0..5)
        .map(|_| codec.decode_to_text(envelope.payload).unwrap())
        .collect();
    assert!(renders.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_wrong_schema_is_decode_error() {
    // An event datum read with the order schema runs out of bytes
    let bytes = framed_event(EVENT_SCHEMA_ID, "hello");
    let envelope = WireEnvelope::parse(&bytes).unwrap();
    let codec = AvroCodec::new(ORDER_SCHEMA).unwrap();

    assert!(matches!(
        codec.decode(envelope.payload),
        Err(SerializationError::Decode(_))
    ));
}
