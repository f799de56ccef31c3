// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("type and field names must be valid identifiers: {0:?}")]
    InvalidIdentifier(SmolStr),
    #[error("encountered duplicate field name: {0:?}")]
    DuplicateField(SmolStr),
    #[error("field names cannot start with an underscore: {0:?}")]
    ReservedName(SmolStr),
    #[error("expected {expected} field values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("unknown field: {0:?}")]
    UnknownField(SmolStr),
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("non-default field {field:?} cannot follow default field(s) {defaulted:?}")]
    DefaultOrderingViolation {
        field: SmolStr,
        defaulted: Vec<SmolStr>,
    },
    #[error("cannot overwrite reserved attribute {0:?}")]
    ReservedAttributeConflict(SmolStr),
    #[error("cannot splice {extra} extra value(s) into fixed-arity record {type_name}")]
    TypeMismatch { type_name: SmolStr, extra: usize },
    #[error("codec error: {0}")]
    Codec(String),
}
