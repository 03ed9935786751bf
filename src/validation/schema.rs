/// Primitive kind a schema field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
}

impl FieldKind {
    pub fn expected_message(&self) -> &'static str {
        match self {
            FieldKind::String => "Expected string",
            FieldKind::Integer => "Expected integer",
            FieldKind::Boolean => "Expected boolean",
        }
    }
}

/// One declared property of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true, nullable: false }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false, nullable: false }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Closed object schema: every key must be declared in `fields`.
///
/// Schemas are plain `const` data so they can be referenced from
/// [`Validation`](super::Validation) impls without any setup.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn object(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }
}

/// Payload accepted by `POST /planets` and `PUT /planets/:id`.
pub const PLANET_SCHEMA: Schema = Schema::object(&[
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::optional("description", FieldKind::String).nullable(),
    FieldSpec::required("diameter", FieldKind::Integer),
    FieldSpec::required("moon", FieldKind::Integer),
]);
