use super::error::RecordError;
use super::slot_value::SlotValue;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

// ─── Identifier rules ───────────────────────────────────────────────────────

/// Words that can never be a type or field name. Strict and reserved Rust
/// keywords, since generated field names surface as accessor names.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false",
    "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where",
    "while", "yield",
];

/// ASCII identifier check: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS.contains(&s)
}

// ─── TypeTag ────────────────────────────────────────────────────────────────

/// Opaque per-field type label. Carried as reflection metadata only; never
/// a live Rust type and never checked at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag(SmolStr);

impl TypeTag {
    pub fn new(label: &str) -> Self {
        Self(SmolStr::from(label))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FieldDef ───────────────────────────────────────────────────────────────

/// One field declaration: name, optional type tag, optional default.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: SmolStr,
    pub type_tag: Option<TypeTag>,
    pub default: Option<SlotValue>,
}

impl FieldDef {
    pub fn named(name: &str) -> Self {
        Self {
            name: SmolStr::from(name),
            type_tag: None,
            default: None,
        }
    }

    pub fn typed(name: &str, tag: TypeTag) -> Self {
        Self {
            name: SmolStr::from(name),
            type_tag: Some(tag),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<SlotValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

// ─── FieldSpec ──────────────────────────────────────────────────────────────

/// Accepted shapes for a factory field list: one joined string split on
/// commas/whitespace, a name sequence, or full declarations.
#[derive(Debug, Clone)]
pub enum FieldSpec {
    Joined(String),
    Names(Vec<SmolStr>),
    Defs(Vec<FieldDef>),
}

impl FieldSpec {
    pub fn into_defs(self) -> Vec<FieldDef> {
        match self {
            FieldSpec::Joined(s) => parse_field_list(&s),
            FieldSpec::Names(names) => names
                .into_iter()
                .map(|n| FieldDef::named(n.as_str()))
                .collect(),
            FieldSpec::Defs(defs) => defs,
        }
    }
}

/// Split a joined field list on commas and whitespace: `"x, y"` and
/// `"x y"` both name two fields.
pub fn parse_field_list(spec: &str) -> Vec<FieldDef> {
    spec.replace(',', " ")
        .split_whitespace()
        .map(FieldDef::named)
        .collect()
}

impl From<&str> for FieldSpec {
    fn from(s: &str) -> Self {
        FieldSpec::Joined(s.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(s: String) -> Self {
        FieldSpec::Joined(s)
    }
}

impl From<Vec<&str>> for FieldSpec {
    fn from(names: Vec<&str>) -> Self {
        FieldSpec::Names(names.into_iter().map(SmolStr::from).collect())
    }
}

impl From<&[&str]> for FieldSpec {
    fn from(names: &[&str]) -> Self {
        FieldSpec::Names(names.iter().copied().map(SmolStr::from).collect())
    }
}

impl From<Vec<(&str, TypeTag)>> for FieldSpec {
    fn from(pairs: Vec<(&str, TypeTag)>) -> Self {
        FieldSpec::Defs(
            pairs
                .into_iter()
                .map(|(name, tag)| FieldDef::typed(name, tag))
                .collect(),
        )
    }
}

impl From<Vec<FieldDef>> for FieldSpec {
    fn from(defs: Vec<FieldDef>) -> Self {
        FieldSpec::Defs(defs)
    }
}

// ─── FieldSchema ────────────────────────────────────────────────────────────

/// Validated, ordered field list for one record shape.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<FieldDef>,
}

impl FieldSchema {
    /// Validate a declaration list against `type_name`.
    ///
    /// With `rename`, invalid, reserved, underscore-prefixed and duplicate
    /// names are replaced by `_<declaration-index>` before validation;
    /// duplicate detection during the rename pass runs against the original
    /// spellings. Checks run in a fixed order and the first failure wins:
    /// identifiers, duplicates, reserved prefix, default ordering.
    pub fn build(
        type_name: &str,
        mut fields: Vec<FieldDef>,
        rename: bool,
    ) -> Result<Self, RecordError> {
        if rename {
            let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
            for (index, field) in fields.iter_mut().enumerate() {
                let original = field.name.clone();
                if !is_identifier(&original)
                    || is_reserved_word(&original)
                    || original.starts_with('_')
                    || seen.contains(&original)
                {
                    field.name = SmolStr::from(format!("_{index}"));
                }
                seen.insert(original);
            }
        }

        if !is_identifier(type_name) || is_reserved_word(type_name) {
            return Err(RecordError::InvalidIdentifier(SmolStr::from(type_name)));
        }
        for field in &fields {
            if !is_identifier(&field.name) || is_reserved_word(&field.name) {
                return Err(RecordError::InvalidIdentifier(field.name.clone()));
            }
        }

        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for field in &fields {
            if !seen.insert(field.name.clone()) {
                return Err(RecordError::DuplicateField(field.name.clone()));
            }
        }

        if !rename {
            for field in &fields {
                if field.name.starts_with('_') {
                    return Err(RecordError::ReservedName(field.name.clone()));
                }
            }
        }

        let mut defaulted: Vec<SmolStr> = Vec::new();
        for field in &fields {
            if field.default.is_some() {
                defaulted.push(field.name.clone());
            } else if !defaulted.is_empty() {
                return Err(RecordError::DefaultOrderingViolation {
                    field: field.name.clone(),
                    defaulted,
                });
            }
        }

        Ok(Self { fields })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn has_type_tags(&self) -> bool {
        self.fields.iter().any(|f| f.type_tag.is_some())
    }

    pub fn has_defaults(&self) -> bool {
        self.fields.iter().any(|f| f.default.is_some())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
