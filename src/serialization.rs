use super::error::RecordError;
use super::record_type::{RecordInstance, RecordType};
use super::slot_tuple::SlotTuple;
use super::slot_value::SlotValue;
use serde::ser::{Serialize, SerializeSeq, Serializer};

// ─── Serialize (positional sequence form) ───────────────────────────────────

/// The container serializes as a plain value sequence.
impl Serialize for SlotTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

/// A record instance reduces to its current field values, in slot order.
/// Field names, the schema and the mapping helper never reach the wire;
/// reconstruction goes through the type's constructor.
impl Serialize for RecordInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

// ─── CBOR ───────────────────────────────────────────────────────────────────

/// Reduce an instance to compact CBOR: one array of field values.
pub fn to_bytes(instance: &RecordInstance) -> Result<Vec<u8>, RecordError> {
    let mut buf = Vec::new();
    cbor4ii::serde::to_writer(&mut buf, instance)
        .map_err(|e| RecordError::Codec(e.to_string()))?;
    Ok(buf)
}

/// Reconstruct an instance of `ty` from its serialized value sequence.
/// Runs back through `make_from`, so arity is re-validated on the way in.
pub fn from_bytes(ty: &RecordType, bytes: &[u8]) -> Result<RecordInstance, RecordError> {
    let value: cbor4ii::core::Value =
        cbor4ii::serde::from_slice(bytes).map_err(|e| RecordError::Codec(e.to_string()))?;
    let items = match value {
        cbor4ii::core::Value::Array(items) => items,
        _ => return Err(RecordError::Codec("expected a value sequence".into())),
    };
    ty.make_from(items.into_iter().map(SlotValue::from))
}

/// Serialize a bare container to CBOR.
pub fn tuple_to_bytes(tuple: &SlotTuple) -> Result<Vec<u8>, RecordError> {
    let mut buf = Vec::new();
    cbor4ii::serde::to_writer(&mut buf, tuple)
        .map_err(|e| RecordError::Codec(e.to_string()))?;
    Ok(buf)
}

pub fn tuple_from_bytes(bytes: &[u8]) -> Result<SlotTuple, RecordError> {
    let value: cbor4ii::core::Value =
        cbor4ii::serde::from_slice(bytes).map_err(|e| RecordError::Codec(e.to_string()))?;
    let items = match value {
        cbor4ii::core::Value::Array(items) => items,
        _ => return Err(RecordError::Codec("expected a value sequence".into())),
    };
    Ok(SlotTuple::new(items.into_iter().map(SlotValue::from)))
}

// ─── JSON ───────────────────────────────────────────────────────────────────

/// Readable form: the same positional array, as JSON text.
pub fn to_json(instance: &RecordInstance) -> Result<String, RecordError> {
    serde_json::to_string(instance).map_err(|e| RecordError::Codec(e.to_string()))
}

pub fn from_json(ty: &RecordType, json: &str) -> Result<RecordInstance, RecordError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| RecordError::Codec(e.to_string()))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return Err(RecordError::Codec("expected a value sequence".into())),
    };
    ty.make_from(items.into_iter().map(SlotValue::from))
}

// ─── Copying ────────────────────────────────────────────────────────────────

/// Copy through the reduce→reconstruct path: the type handle travels with
/// the copy and the constructor re-validates arity, exactly as a
/// deserialized instance would.
pub fn duplicate(instance: &RecordInstance) -> Result<RecordInstance, RecordError> {
    instance.record_type().make_from(instance.values())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_type::{make_record_type, RecordOptions};
    use crate::slot_value::FastMap;
    use smol_str::SmolStr;

    fn v(n: i64) -> SlotValue {
        SlotValue::from(n)
    }

    fn user_type() -> RecordType {
        make_record_type("User", "name age active", RecordOptions::default()).unwrap()
    }

    fn user() -> RecordInstance {
        user_type()
            .new_positional(vec![
                SlotValue::from("Alice"),
                v(30),
                SlotValue::from(true),
            ])
            .unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CBOR round-trip
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_cbor_roundtrip() {
        let original = user();
        let bytes = to_bytes(&original).unwrap();
        let back = from_bytes(&user_type(), &bytes).unwrap();
        assert_eq!(back, original);
        assert_eq!(back.get_field("name").unwrap(), &SlotValue::from("Alice"));
    }

    #[test]
    fn test_cbor_roundtrip_with_nested_values() {
        let ty = make_record_type("Doc", "id meta tags", RecordOptions::default()).unwrap();
        let mut meta = FastMap::new();
        meta.insert(SmolStr::from("lang"), SlotValue::from("en"));
        let original = ty
            .new_positional(vec![
                v(1),
                SlotValue::Object(meta),
                SlotValue::Array(vec![SlotValue::from("a"), SlotValue::from("b")]),
            ])
            .unwrap();

        let bytes = to_bytes(&original).unwrap();
        let back = from_bytes(&ty, &bytes).unwrap();
        assert_eq!(back, original);
        assert_eq!(
            back.get_field("meta").unwrap().get("lang").and_then(|v| v.as_str()),
            Some("en")
        );
    }

    #[test]
    fn test_cbor_wrong_arity_on_reconstruction() {
        let bytes = to_bytes(&user()).unwrap();
        let narrow = make_record_type("Pair", "a b", RecordOptions::default()).unwrap();
        assert!(matches!(
            from_bytes(&narrow, &bytes),
            Err(RecordError::ArityMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_cbor_rejects_non_sequence() {
        let mut buf = Vec::new();
        cbor4ii::serde::to_writer(&mut buf, &SlotValue::from(42i64)).unwrap();
        assert!(matches!(
            from_bytes(&user_type(), &buf),
            Err(RecordError::Codec(_))
        ));
    }

    #[test]
    fn test_cbor_rejects_garbage() {
        assert!(from_bytes(&user_type(), &[0xff, 0x00, 0x13]).is_err());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Wire form is positional only
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_serialized_form_is_a_plain_array() {
        let json = to_json(&user()).unwrap();
        assert_eq!(json, "[\"Alice\",30,true]");
        // No mapping helper, no field names, no type name.
        assert!(!json.contains("FieldMap"));
        assert!(!json.contains("name"));
        assert!(!json.contains("User"));
    }

    #[test]
    fn test_cbor_bytes_contain_no_mapping_marker() {
        let ty = make_record_type("Conf", "host port", RecordOptions::default()).unwrap();
        let inst = ty
            .new_positional(vec![SlotValue::from("localhost"), v(8080)])
            .unwrap();
        let bytes = to_bytes(&inst).unwrap();
        let marker = b"FieldMap";
        assert!(!bytes.windows(marker.len()).any(|w| w == marker));
        assert!(!bytes.windows(4).any(|w| w == b"host"));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // JSON round-trip
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_json_roundtrip() {
        let original = user();
        let json = to_json(&original).unwrap();
        let back = from_json(&user_type(), &json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_json_rejects_non_sequence() {
        assert!(matches!(
            from_json(&user_type(), "{\"name\": \"Alice\"}"),
            Err(RecordError::Codec(_))
        ));
        assert!(from_json(&user_type(), "not json").is_err());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Container codec
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_tuple_roundtrip() {
        let original = SlotTuple::new([v(1), SlotValue::from("two"), SlotValue::Null]);
        let bytes = tuple_to_bytes(&original).unwrap();
        let back = tuple_from_bytes(&bytes).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_empty_tuple_roundtrip() {
        let bytes = tuple_to_bytes(&SlotTuple::empty()).unwrap();
        assert_eq!(tuple_from_bytes(&bytes).unwrap(), SlotTuple::empty());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Copying
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_duplicate_preserves_type_and_values() {
        let original = user();
        let copy = duplicate(&original).unwrap();
        assert_eq!(copy, original);
        assert_eq!(copy.type_name(), "User");
    }

    #[test]
    fn test_duplicate_is_independent() {
        let original = user();
        let mut copy = duplicate(&original).unwrap();
        copy.set_field("age", v(99)).unwrap();
        assert_eq!(original.get_field("age").unwrap(), &v(30));
        assert_eq!(copy.get_field("age").unwrap(), &v(99));
    }
}
