use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::convert::TryFrom;

pub type FastMap<K, V> = BTreeMap<K, V>;

// ─── SlotNumber ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub enum SlotNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl std::fmt::Debug for SlotNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotNumber::I64(i) => write!(f, "I64({})", i),
            SlotNumber::U64(u) => write!(f, "U64({})", u),
            SlotNumber::F64(v) => write!(f, "F64({})", v),
        }
    }
}

impl SlotNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            SlotNumber::I64(i) => i as f64,
            SlotNumber::U64(u) => u as f64,
            SlotNumber::F64(f) => f,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            SlotNumber::I64(i) => Some(i),
            SlotNumber::U64(u) => i64::try_from(u).ok(),
            SlotNumber::F64(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            SlotNumber::U64(u) => Some(u),
            SlotNumber::I64(i) => u64::try_from(i).ok(),
            SlotNumber::F64(f) => {
                if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }
}

// Equality is by numeric value, not by variant: slot comparison must treat
// I64(1), U64(1) and F64(1.0) as the same number.
impl PartialEq for SlotNumber {
    fn eq(&self, other: &Self) -> bool {
        use SlotNumber::*;
        match (*self, *other) {
            (I64(a), I64(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (I64(a), U64(b)) | (U64(b), I64(a)) => u64::try_from(a).is_ok_and(|a| a == b),
            (I64(a), F64(b)) | (F64(b), I64(a)) => a as f64 == b,
            (U64(a), F64(b)) | (F64(b), U64(a)) => a as f64 == b,
        }
    }
}

impl PartialOrd for SlotNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use SlotNumber::*;
        match (*self, *other) {
            (I64(a), I64(b)) => a.partial_cmp(&b),
            (U64(a), U64(b)) => a.partial_cmp(&b),
            (F64(a), F64(b)) => a.partial_cmp(&b),
            (I64(a), U64(b)) => match u64::try_from(a) {
                Ok(a) => a.partial_cmp(&b),
                Err(_) => Some(Ordering::Less),
            },
            (U64(a), I64(b)) => match u64::try_from(b) {
                Ok(b) => a.partial_cmp(&b),
                Err(_) => Some(Ordering::Greater),
            },
            (I64(a), F64(b)) => (a as f64).partial_cmp(&b),
            (F64(a), I64(b)) => a.partial_cmp(&(b as f64)),
            (U64(a), F64(b)) => (a as f64).partial_cmp(&b),
            (F64(a), U64(b)) => a.partial_cmp(&(b as f64)),
        }
    }
}

impl std::fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotNumber::I64(i) => write!(f, "{}", i),
            SlotNumber::U64(u) => write!(f, "{}", u),
            SlotNumber::F64(v) => write!(f, "{}", v),
        }
    }
}

// ─── SlotValue ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Null,
    Bool(bool),
    Number(SlotNumber),
    Str(SmolStr),
    Array(Vec<SlotValue>),
    Object(FastMap<SmolStr, SlotValue>),
}

impl Default for SlotValue {
    fn default() -> Self {
        SlotValue::Null
    }
}

impl SlotValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlotValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SlotValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SlotValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SlotValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SlotValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FastMap<SmolStr, SlotValue>> {
        match self {
            SlotValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<SlotValue>> {
        match self {
            SlotValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&SlotValue> {
        self.as_object()?.get(&SmolStr::new(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SlotValue::Null)
    }
}

// ─── Ordering ───────────────────────────────────────────────────────────────

/// Same-kind values order like their payloads; values of different kinds are
/// incomparable (`None`), which makes container comparison partial as well.
impl PartialOrd for SlotValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (SlotValue::Null, SlotValue::Null) => Some(Ordering::Equal),
            (SlotValue::Bool(a), SlotValue::Bool(b)) => a.partial_cmp(b),
            (SlotValue::Number(a), SlotValue::Number(b)) => a.partial_cmp(b),
            (SlotValue::Str(a), SlotValue::Str(b)) => a.partial_cmp(b),
            (SlotValue::Array(a), SlotValue::Array(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

// ─── Repr (Display) ─────────────────────────────────────────────────────────

/// Repr form used by container and record reprs: `null`, `true`, `42`,
/// quoted strings, `[...]` arrays, `{...}` objects.
impl std::fmt::Display for SlotValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotValue::Null => write!(f, "null"),
            SlotValue::Bool(b) => write!(f, "{}", b),
            SlotValue::Number(n) => write!(f, "{}", n),
            SlotValue::Str(s) => write!(f, "{:?}", s.as_str()),
            SlotValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            SlotValue::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k.as_str(), v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ─── Serialize (for cbor4ii/serde_json writers on nested types) ─────────────

impl Serialize for SlotValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotValue::Null => serializer.serialize_none(),
            SlotValue::Bool(b) => serializer.serialize_bool(*b),
            SlotValue::Number(n) => match n {
                SlotNumber::I64(i) => serializer.serialize_i64(*i),
                SlotNumber::U64(u) => serializer.serialize_u64(*u),
                SlotNumber::F64(f) => serializer.serialize_f64(*f),
            },
            SlotValue::Str(s) => serializer.serialize_str(s.as_str()),
            SlotValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            SlotValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<f64> for SlotValue {
    fn from(n: f64) -> Self {
        SlotValue::Number(SlotNumber::F64(n))
    }
}

impl From<i64> for SlotValue {
    fn from(n: i64) -> Self {
        SlotValue::Number(SlotNumber::I64(n))
    }
}

impl From<u64> for SlotValue {
    fn from(n: u64) -> Self {
        SlotValue::Number(SlotNumber::U64(n))
    }
}

impl From<bool> for SlotValue {
    fn from(b: bool) -> Self {
        SlotValue::Bool(b)
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Str(SmolStr::from(s))
    }
}

impl From<String> for SlotValue {
    fn from(s: String) -> Self {
        SlotValue::Str(SmolStr::from(s))
    }
}

// ─── From<cbor4ii::core::Value> ─────────────────────────────────────────────

impl From<cbor4ii::core::Value> for SlotValue {
    fn from(v: cbor4ii::core::Value) -> Self {
        match v {
            cbor4ii::core::Value::Null => SlotValue::Null,
            cbor4ii::core::Value::Bool(b) => SlotValue::Bool(b),
            cbor4ii::core::Value::Integer(i) => {
                if let Ok(val) = i64::try_from(i) {
                    SlotValue::Number(SlotNumber::I64(val))
                } else if let Ok(val) = u64::try_from(i) {
                    SlotValue::Number(SlotNumber::U64(val))
                } else {
                    SlotValue::Number(SlotNumber::F64(i as f64))
                }
            }
            cbor4ii::core::Value::Float(f) => SlotValue::Number(SlotNumber::F64(f)),
            cbor4ii::core::Value::Text(s) => SlotValue::Str(SmolStr::from(s)),
            cbor4ii::core::Value::Array(arr) => {
                SlotValue::Array(arr.into_iter().map(SlotValue::from).collect())
            }
            cbor4ii::core::Value::Map(map) => SlotValue::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let key = match k {
                            cbor4ii::core::Value::Text(s) => SmolStr::from(s),
                            cbor4ii::core::Value::Integer(i) => SmolStr::from(i.to_string()),
                            other => SmolStr::from(format!("{:?}", other)),
                        };
                        (key, SlotValue::from(v))
                    })
                    .collect(),
            ),
            _ => SlotValue::Null,
        }
    }
}

// ─── Into<cbor4ii::core::Value> ─────────────────────────────────────────────

impl From<SlotValue> for cbor4ii::core::Value {
    fn from(val: SlotValue) -> Self {
        match val {
            SlotValue::Null => cbor4ii::core::Value::Null,
            SlotValue::Bool(b) => cbor4ii::core::Value::Bool(b),
            SlotValue::Number(n) => match n {
                SlotNumber::I64(i) => cbor4ii::core::Value::Integer(i as i128),
                SlotNumber::U64(u) => cbor4ii::core::Value::Integer(u as i128),
                SlotNumber::F64(f) => cbor4ii::core::Value::Float(f),
            },
            SlotValue::Str(s) => cbor4ii::core::Value::Text(s.to_string()),
            SlotValue::Array(arr) => {
                cbor4ii::core::Value::Array(arr.into_iter().map(|v| v.into()).collect())
            }
            SlotValue::Object(obj) => cbor4ii::core::Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (cbor4ii::core::Value::Text(k.to_string()), v.into()))
                    .collect(),
            ),
        }
    }
}

// ─── From/Into serde_json::Value ────────────────────────────────────────────

impl From<serde_json::Value> for SlotValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => SlotValue::Null,
            serde_json::Value::Bool(b) => SlotValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SlotValue::Number(SlotNumber::I64(i))
                } else if let Some(u) = n.as_u64() {
                    SlotValue::Number(SlotNumber::U64(u))
                } else {
                    SlotValue::Number(SlotNumber::F64(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => SlotValue::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                SlotValue::Array(arr.into_iter().map(SlotValue::from).collect())
            }
            serde_json::Value::Object(obj) => SlotValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), SlotValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<SlotValue> for serde_json::Value {
    fn from(val: SlotValue) -> Self {
        match val {
            SlotValue::Null => serde_json::Value::Null,
            SlotValue::Bool(b) => serde_json::Value::Bool(b),
            SlotValue::Number(n) => match n {
                SlotNumber::I64(i) => serde_json::json!(i),
                SlotNumber::U64(u) => serde_json::json!(u),
                SlotNumber::F64(f) => serde_json::json!(f),
            },
            SlotValue::Str(s) => serde_json::Value::String(s.to_string()),
            SlotValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(|v| v.into()).collect())
            }
            SlotValue::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ═══════════════════════════════════════════════════════════════════════
    // Numeric equality across variants
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_number_eq_same_variant() {
        assert_eq!(SlotNumber::I64(7), SlotNumber::I64(7));
        assert_eq!(SlotNumber::U64(7), SlotNumber::U64(7));
        assert_eq!(SlotNumber::F64(7.5), SlotNumber::F64(7.5));
        assert_ne!(SlotNumber::I64(7), SlotNumber::I64(8));
    }

    #[test]
    fn test_number_eq_cross_variant() {
        assert_eq!(SlotNumber::I64(1), SlotNumber::U64(1));
        assert_eq!(SlotNumber::U64(1), SlotNumber::I64(1));
        assert_eq!(SlotNumber::I64(1), SlotNumber::F64(1.0));
        assert_eq!(SlotNumber::U64(2), SlotNumber::F64(2.0));
        assert_ne!(SlotNumber::I64(-1), SlotNumber::U64(u64::MAX));
        assert_ne!(SlotNumber::F64(1.5), SlotNumber::I64(1));
    }

    #[test]
    fn test_number_ordering() {
        assert!(SlotNumber::I64(1) < SlotNumber::I64(2));
        assert!(SlotNumber::I64(-1) < SlotNumber::U64(0));
        assert!(SlotNumber::U64(10) > SlotNumber::I64(-3));
        assert!(SlotNumber::F64(0.5) < SlotNumber::I64(1));
        assert_eq!(
            SlotNumber::I64(3).partial_cmp(&SlotNumber::F64(3.0)),
            Some(Ordering::Equal)
        );
        assert!(SlotNumber::F64(f64::NAN).partial_cmp(&SlotNumber::F64(1.0)).is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Value ordering
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_value_ordering_same_kind() {
        assert!(SlotValue::from(1i64) < SlotValue::from(2i64));
        assert!(SlotValue::from("abc") < SlotValue::from("abd"));
        assert!(SlotValue::from(false) < SlotValue::from(true));
    }

    #[test]
    fn test_value_ordering_cross_kind_incomparable() {
        assert!(SlotValue::from(1i64).partial_cmp(&SlotValue::from("1")).is_none());
        assert!(SlotValue::Null.partial_cmp(&SlotValue::from(false)).is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Repr
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_display_scalars() {
        assert_eq!(SlotValue::Null.to_string(), "null");
        assert_eq!(SlotValue::from(true).to_string(), "true");
        assert_eq!(SlotValue::from(42i64).to_string(), "42");
        assert_eq!(SlotValue::from(1.5f64).to_string(), "1.5");
        assert_eq!(SlotValue::from("hi").to_string(), "\"hi\"");
    }

    #[test]
    fn test_display_nested() {
        let arr = SlotValue::Array(vec![SlotValue::from(1i64), SlotValue::from("x")]);
        assert_eq!(arr.to_string(), "[1, \"x\"]");

        let mut map = FastMap::new();
        map.insert(SmolStr::from("k"), SlotValue::from(2i64));
        assert_eq!(SlotValue::Object(map).to_string(), "{\"k\": 2}");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Conversions
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_json_value_roundtrip() {
        let json: serde_json::Value = serde_json::json!({
            "name": "Alice",
            "age": 30,
            "score": 99.5,
            "tags": ["a", "b"],
        });
        let slot = SlotValue::from(json.clone());
        assert_eq!(slot.get("name").and_then(|v| v.as_str()), Some("Alice"));
        assert_eq!(slot.get("age").and_then(|v| v.as_i64()), Some(30));
        let back: serde_json::Value = slot.into();
        assert_eq!(back, json);
    }

    #[test]
    fn test_cbor_value_roundtrip() {
        let original = SlotValue::Array(vec![
            SlotValue::from(-5i64),
            SlotValue::from(u64::MAX),
            SlotValue::from("text"),
            SlotValue::Null,
        ]);
        let cbor: cbor4ii::core::Value = original.clone().into();
        assert_eq!(SlotValue::from(cbor), original);
    }

    #[test]
    fn test_number_lossless_accessors() {
        assert_eq!(SlotNumber::U64(7).as_i64(), Some(7));
        assert_eq!(SlotNumber::U64(u64::MAX).as_i64(), None);
        assert_eq!(SlotNumber::I64(-1).as_u64(), None);
        assert_eq!(SlotNumber::F64(2.0).as_i64(), Some(2));
        assert_eq!(SlotNumber::F64(2.5).as_i64(), None);
    }
}
