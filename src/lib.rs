//! Slotted records: a fixed-arity mutable tuple of dynamic values, plus a
//! runtime factory that turns a validated field schema into named record
//! types with shared accessors and positional-sequence serialization.

pub mod builder;
pub mod error;
pub mod record_type;
pub mod schema;
pub mod serialization;
pub mod slot_tuple;
pub mod slot_value;

pub use builder::RecordTypeBuilder;
pub use error::RecordError;
pub use record_type::{
    FieldMap, MemberFn, RecordInstance, RecordOptions, RecordType, RESERVED_MEMBERS,
    make_record_type,
};
pub use schema::{FieldDef, FieldSchema, FieldSpec, TypeTag, parse_field_list};
pub use serialization::{
    duplicate, from_bytes, from_json, to_bytes, to_json, tuple_from_bytes, tuple_to_bytes,
};
pub use slot_tuple::{RevSlotIter, SlotIter, SlotTuple};
pub use slot_value::{FastMap, SlotNumber, SlotValue};
