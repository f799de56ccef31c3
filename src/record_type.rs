use super::error::RecordError;
use super::schema::{FieldSchema, FieldSpec, TypeTag};
use super::slot_tuple::{SlotIter, SlotTuple};
use super::slot_value::{FastMap, SlotValue};
use smol_str::SmolStr;
use std::sync::Arc;
use xxhash_rust::const_xxh64::xxh64 as const_xxh64;
use xxhash_rust::xxh64::xxh64;

// ─── Reserved surface ───────────────────────────────────────────────────────

/// Member names a record type refuses to let user code shadow.
pub const RESERVED_MEMBERS: &[&str] = &[
    "fields",
    "field_types",
    "field_defaults",
    "schema",
    "make_from",
    "replace",
    "to_mapping",
];

/// Attached behavior: a named computed view over one instance.
pub type MemberFn = Arc<dyn Fn(&RecordInstance) -> SlotValue + Send + Sync>;

// ─── Factory entry point ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOptions {
    pub rename: bool,
    pub verbose: bool,
}

/// Produce a record type from a type name and a field list.
///
/// `fields` accepts a joined string (`"x, y"`), a name sequence, or full
/// declarations. Validation happens up front; on failure no type exists.
pub fn make_record_type(
    name: &str,
    fields: impl Into<FieldSpec>,
    options: RecordOptions,
) -> Result<RecordType, RecordError> {
    let schema = FieldSchema::build(name, fields.into().into_defs(), options.rename)?;
    let ty = RecordType::from_parts(name, schema, Vec::new())?;
    if options.verbose {
        log::debug!(
            "assembled record type {}: fields={:?}, lookup entries={}",
            ty.name(),
            ty.fields(),
            ty.arity()
        );
    }
    Ok(ty)
}

// ─── RecordType ─────────────────────────────────────────────────────────────

struct RecordTypeInner {
    name: SmolStr,
    schema: FieldSchema,
    /// (xxh64(name), slot index), sorted by hash. Built once per schema and
    /// shared by every instance through the Arc handle.
    lookup: Vec<(u64, u32)>,
    members: FastMap<SmolStr, MemberFn>,
}

/// A named record shape: a validated schema plus generated positional
/// accessors. Cloning is cheap; all clones share one descriptor.
#[derive(Clone)]
pub struct RecordType {
    inner: Arc<RecordTypeInner>,
}

impl RecordType {
    pub(crate) fn from_parts(
        name: &str,
        schema: FieldSchema,
        members: Vec<(SmolStr, MemberFn)>,
    ) -> Result<RecordType, RecordError> {
        let mut table: FastMap<SmolStr, MemberFn> = FastMap::new();
        for (member_name, f) in members {
            if RESERVED_MEMBERS.contains(&member_name.as_str()) {
                return Err(RecordError::ReservedAttributeConflict(member_name));
            }
            // A member shadowing a declared field is dropped, not attached.
            if schema.names().any(|n| n == member_name.as_str()) {
                continue;
            }
            table.insert(member_name, f);
        }

        let mut lookup: Vec<(u64, u32)> = schema
            .names()
            .enumerate()
            .map(|(i, n)| (const_xxh64(n.as_bytes(), 0), i as u32))
            .collect();
        lookup.sort_unstable_by_key(|(hash, _)| *hash);

        Ok(RecordType {
            inner: Arc::new(RecordTypeInner {
                name: SmolStr::from(name),
                schema,
                lookup,
                members: table,
            }),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.inner.name.as_str()
    }

    /// Number of fields, which is also every instance's slot count.
    #[inline]
    pub fn arity(&self) -> usize {
        self.inner.schema.len()
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> Vec<&str> {
        self.inner.schema.names().collect()
    }

    /// name → type tag, present only when any tag was declared.
    pub fn field_types(&self) -> Option<Vec<(SmolStr, TypeTag)>> {
        if !self.inner.schema.has_type_tags() {
            return None;
        }
        Some(
            self.inner
                .schema
                .fields()
                .iter()
                .filter_map(|f| f.type_tag.clone().map(|t| (f.name.clone(), t)))
                .collect(),
        )
    }

    /// name → default, present only when any default was declared.
    pub fn field_defaults(&self) -> Option<Vec<(SmolStr, SlotValue)>> {
        if !self.inner.schema.has_defaults() {
            return None;
        }
        Some(
            self.inner
                .schema
                .fields()
                .iter()
                .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
                .collect(),
        )
    }

    #[inline]
    pub fn schema(&self) -> &FieldSchema {
        &self.inner.schema
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.inner.members.contains_key(name)
    }

    /// Resolve a field name to its slot index. Linear scan for up to four
    /// fields, binary search on the hash-sorted table above that.
    fn field_index(&self, name: &str) -> Result<usize, RecordError> {
        let hash = xxh64(name.as_bytes(), 0);
        let lookup = &self.inner.lookup;
        let n = lookup.len();
        if n == 0 {
            return Err(RecordError::UnknownField(SmolStr::from(name)));
        }
        if n <= 4 {
            for &(h, idx) in lookup {
                if h == hash {
                    return Ok(idx as usize);
                }
            }
            return Err(RecordError::UnknownField(SmolStr::from(name)));
        }
        let mut lo = 0usize;
        let mut hi = n;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match lookup[mid].0.cmp(&hash) {
                std::cmp::Ordering::Equal => return Ok(lookup[mid].1 as usize),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Err(RecordError::UnknownField(SmolStr::from(name)))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════

    /// General constructor: positional values fill the leading fields, named
    /// values fill the remainder. A named value landing on an already-filled
    /// slot is a duplicate binding; unfilled fields fall back to declared
    /// defaults; anything still missing is an arity fault.
    pub fn instantiate(
        &self,
        positional: Vec<SlotValue>,
        named: Vec<(&str, SlotValue)>,
    ) -> Result<RecordInstance, RecordError> {
        let arity = self.arity();
        if positional.len() > arity {
            return Err(RecordError::ArityMismatch {
                expected: arity,
                actual: positional.len(),
            });
        }

        let mut slots: Vec<Option<SlotValue>> = positional.into_iter().map(Some).collect();
        slots.resize_with(arity, || None);

        for (name, value) in named {
            let idx = self.field_index(name)?;
            if slots[idx].is_some() {
                return Err(RecordError::DuplicateField(SmolStr::from(name)));
            }
            slots[idx] = Some(value);
        }

        let fields = self.inner.schema.fields();
        let mut missing = 0usize;
        for (idx, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                match &fields[idx].default {
                    Some(default) => *slot = Some(default.clone()),
                    None => missing += 1,
                }
            }
        }
        if missing > 0 {
            return Err(RecordError::ArityMismatch {
                expected: arity,
                actual: arity - missing,
            });
        }

        let values: Vec<SlotValue> = slots
            .into_iter()
            .map(|slot| slot.unwrap_or_default())
            .collect();
        Ok(RecordInstance {
            ty: self.clone(),
            slots: SlotTuple::from(values),
        })
    }

    pub fn new_positional(&self, values: Vec<SlotValue>) -> Result<RecordInstance, RecordError> {
        self.instantiate(values, Vec::new())
    }

    pub fn new_named(&self, named: Vec<(&str, SlotValue)>) -> Result<RecordInstance, RecordError> {
        self.instantiate(Vec::new(), named)
    }

    /// Build from an arbitrary finite value sequence. The produced length
    /// must equal the arity exactly; defaults do not apply here.
    pub fn make_from<I>(&self, values: I) -> Result<RecordInstance, RecordError>
    where
        I: IntoIterator<Item = SlotValue>,
    {
        let slots = SlotTuple::new(values);
        let arity = self.arity();
        if slots.len() != arity {
            return Err(RecordError::ArityMismatch {
                expected: arity,
                actual: slots.len(),
            });
        }
        Ok(RecordInstance {
            ty: self.clone(),
            slots,
        })
    }

    /// Rebuild an instance from an ordered mapping via named binding.
    pub fn from_mapping(&self, mapping: &FieldMap) -> Result<RecordInstance, RecordError> {
        self.new_named(
            mapping
                .iter()
                .map(|(name, value)| (name.as_str(), value.clone()))
                .collect(),
        )
    }
}

impl std::fmt::Debug for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.inner.name)
            .field("fields", &self.fields())
            .finish()
    }
}

// ─── FieldMap ───────────────────────────────────────────────────────────────

/// Ordered name→value view of one instance, in field-declaration order.
/// A reflection helper only: serialization reduces to the positional value
/// sequence and never embeds this type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    entries: Vec<(SmolStr, SlotValue)>,
}

impl FieldMap {
    pub(crate) fn from_entries(entries: Vec<(SmolStr, SlotValue)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&SlotValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &SlotValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(SmolStr, SlotValue)> {
        self.entries
    }
}

impl std::fmt::Display for FieldMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldMap({{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", name.as_str(), value)?;
        }
        write!(f, "}})")
    }
}

// ─── RecordInstance ─────────────────────────────────────────────────────────

/// One value of a record type: physically a `SlotTuple` of the schema's
/// length, logically a fixed-shape record with named views.
#[derive(Debug, Clone)]
pub struct RecordInstance {
    ty: RecordType,
    slots: SlotTuple,
}

impl RecordInstance {
    #[inline]
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Positional view of the backing container.
    #[inline]
    pub fn slots(&self) -> &SlotTuple {
        &self.slots
    }

    pub fn get(&self, index: i64) -> Result<&SlotValue, RecordError> {
        self.slots.get(index)
    }

    pub fn set(&mut self, index: i64, value: SlotValue) -> Result<(), RecordError> {
        self.slots.set(index, value)
    }

    /// Read a slot through the shared name→index table.
    pub fn get_field(&self, name: &str) -> Result<&SlotValue, RecordError> {
        let idx = self.ty.field_index(name)?;
        self.slots.get(idx as i64)
    }

    /// Overwrite a slot through the shared name→index table.
    pub fn set_field(&mut self, name: &str, value: SlotValue) -> Result<(), RecordError> {
        let idx = self.ty.field_index(name)?;
        self.slots.set(idx as i64, value)
    }

    /// Apply named updates sequentially, in place. An unknown name fails
    /// mid-way; updates applied before the failure stay applied.
    pub fn replace(
        &mut self,
        updates: Vec<(&str, SlotValue)>,
    ) -> Result<&mut Self, RecordError> {
        for (name, value) in updates {
            self.set_field(name, value)?;
        }
        Ok(self)
    }

    /// Ordered name→value mapping in declaration order.
    pub fn to_mapping(&self) -> FieldMap {
        FieldMap::from_entries(
            self.ty
                .inner
                .schema
                .fields()
                .iter()
                .zip(self.slots.iter())
                .map(|(field, value)| (field.name.clone(), value.clone()))
                .collect(),
        )
    }

    /// Fixed-arity guard: a record instance never grows. An empty tail
    /// yields a fresh copy of the same type; anything else is refused
    /// instead of truncated or padded.
    pub fn concat(&self, extra: &SlotTuple) -> Result<RecordInstance, RecordError> {
        if !extra.is_empty() {
            return Err(RecordError::TypeMismatch {
                type_name: self.ty.inner.name.clone(),
                extra: extra.len(),
            });
        }
        self.ty.make_from(self.slots.iter().cloned())
    }

    #[inline]
    pub fn iter(&self) -> SlotIter<'_> {
        self.slots.iter()
    }

    /// Current field values, cloned, in slot order.
    pub fn values(&self) -> Vec<SlotValue> {
        self.slots.iter().cloned().collect()
    }

    /// Call an attached member by name.
    pub fn invoke(&self, member: &str) -> Result<SlotValue, RecordError> {
        match self.ty.inner.members.get(member) {
            Some(f) => Ok(f(self)),
            None => Err(RecordError::UnknownField(SmolStr::from(member))),
        }
    }
}

/// Instances compare by type name and pairwise slot values.
impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.slots == other.slots
    }
}

impl std::fmt::Display for RecordInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self
            .ty
            .inner
            .schema
            .names()
            .zip(self.slots.iter())
            .enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
