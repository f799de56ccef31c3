use super::error::RecordError;
use super::record_type::{MemberFn, RecordInstance, RecordType};
use super::schema::{FieldDef, FieldSchema, TypeTag};
use super::slot_value::SlotValue;
use smol_str::SmolStr;
use std::sync::Arc;

// ─── RecordTypeBuilder ──────────────────────────────────────────────────────

/// Declarative record-type construction: ordered field declarations, each
/// optionally typed and optionally defaulted, plus attached members.
///
/// Once a declaration carries a default, every later one must too; `build`
/// rejects the schema otherwise, naming the offender and the fields already
/// defaulted. Defaults are captured here, once, and cloned into each
/// instance — value semantics, so instances never share default state.
pub struct RecordTypeBuilder {
    name: SmolStr,
    fields: Vec<FieldDef>,
    members: Vec<(SmolStr, MemberFn)>,
    rename: bool,
    verbose: bool,
}

impl RecordTypeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::from(name),
            fields: Vec::new(),
            members: Vec::new(),
            rename: false,
            verbose: false,
        }
    }

    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(FieldDef::named(name));
        self
    }

    pub fn typed_field(mut self, name: &str, tag: TypeTag) -> Self {
        self.fields.push(FieldDef::typed(name, tag));
        self
    }

    pub fn default_field(mut self, name: &str, default: impl Into<SlotValue>) -> Self {
        self.fields.push(FieldDef::named(name).with_default(default));
        self
    }

    pub fn typed_default_field(
        mut self,
        name: &str,
        tag: TypeTag,
        default: impl Into<SlotValue>,
    ) -> Self {
        self.fields
            .push(FieldDef::typed(name, tag).with_default(default));
        self
    }

    pub fn declare(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Attach a non-field member. Reserved names are rejected at `build`;
    /// a member shadowing a declared field is dropped.
    pub fn member<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&RecordInstance) -> SlotValue + Send + Sync + 'static,
    {
        self.members.push((SmolStr::from(name), Arc::new(f)));
        self
    }

    pub fn rename(mut self, rename: bool) -> Self {
        self.rename = rename;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<RecordType, RecordError> {
        let schema = FieldSchema::build(&self.name, self.fields, self.rename)?;
        let ty = RecordType::from_parts(&self.name, schema, self.members)?;
        if self.verbose {
            log::debug!(
                "declared record type {}: fields={:?}",
                ty.name(),
                ty.fields()
            );
        }
        Ok(ty)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
