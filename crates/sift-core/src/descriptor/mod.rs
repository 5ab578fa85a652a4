//! Module: descriptor
//! Responsibility: per-record-type filter descriptors and their builders.
//! Does not own: operation metadata or literal parsing.
//! Boundary: built once at configuration time, read-only for every request.

mod builder;
mod resolve;

#[cfg(test)]
mod tests;

use crate::{
    model::{FieldKind, TypeRef},
    operation::{OperationId, OperationRegistry, ValueKind},
    value::ScalarKind,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};
use thiserror::Error as ThisError;

// re-exports
pub use builder::{FilterDescriptorBuilder, OperationInputBuilder, describe_type};
pub(crate) use builder::DescriptorConfig;
pub(crate) use resolve::resolve_descriptors;

///
/// DescriptorId
///
/// Index of a descriptor inside its `DescriptorSet`.
/// Nested fields point at descriptors by id, which lets record types
/// reference each other cyclically.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DescriptorId(usize);

impl DescriptorId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// OperationInput
///
/// Per-descriptor override of an operation's operand shape or description.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OperationInput {
    pub accepts: Option<ValueKind>,
    pub description: Option<String>,
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub operations: BTreeSet<OperationId>,
    /// Operations usable on each element inside a scalar-list quantifier.
    pub element_operations: BTreeSet<OperationId>,
    /// Descriptor of the nested record type for object and collection fields.
    pub nested: Option<DescriptorId>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn allows(&self, id: OperationId) -> bool {
        self.operations.contains(&id)
    }

    #[must_use]
    pub fn allows_on_element(&self, id: OperationId) -> bool {
        self.element_operations.contains(&id)
    }

    /// Scalar kind the field's operands are checked against.
    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarKind> {
        self.kind.element_scalar()
    }
}

///
/// FilterDescriptor
///
/// Filterable surface of one record type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterDescriptor {
    pub id: DescriptorId,
    pub record: TypeRef,
    pub fields: BTreeMap<String, FieldDescriptor>,
    pub operation_inputs: BTreeMap<OperationId, OperationInput>,
}

impl FilterDescriptor {
    const fn empty(id: DescriptorId, record: TypeRef) -> Self {
        Self {
            id,
            record,
            fields: BTreeMap::new(),
            operation_inputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Operand shape for `id` on this descriptor.
    ///
    /// A descriptor-level input override wins over the registry default.
    #[must_use]
    pub fn accepts(&self, id: OperationId, registry: &OperationRegistry) -> Option<ValueKind> {
        self.operation_inputs
            .get(&id)
            .and_then(|input| input.accepts)
            .or_else(|| registry.get(id).map(|op| op.accepts))
    }
}

///
/// DescriptorSet
///
/// Owns every descriptor of one configuration.
///

#[derive(Clone, Debug, Default)]
pub struct DescriptorSet {
    descriptors: Vec<FilterDescriptor>,
    by_type: BTreeMap<TypeRef, DescriptorId>,
}

impl DescriptorSet {
    #[must_use]
    pub fn get(&self, id: DescriptorId) -> Option<&FilterDescriptor> {
        self.descriptors.get(id.0)
    }

    /// Root descriptor registered for a record type.
    #[must_use]
    pub fn for_type(&self, record: TypeRef) -> Option<&FilterDescriptor> {
        self.by_type.get(&record).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.descriptors.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn reserve(&mut self, record: TypeRef) -> DescriptorId {
        let id = DescriptorId(self.descriptors.len());
        self.descriptors.push(FilterDescriptor::empty(id, record));

        id
    }

    fn lookup(&self, record: TypeRef) -> Option<DescriptorId> {
        self.by_type.get(&record).copied()
    }

    fn bind(&mut self, record: TypeRef, id: DescriptorId) {
        self.by_type.insert(record, id);
    }

    fn fill(
        &mut self,
        id: DescriptorId,
        fields: BTreeMap<String, FieldDescriptor>,
        operation_inputs: BTreeMap<OperationId, OperationInput>,
    ) {
        if let Some(descriptor) = self.descriptors.get_mut(id.0) {
            descriptor.fields = fields;
            descriptor.operation_inputs = operation_inputs;
        }
    }
}

///
/// InputKind
///
/// Field shape a default operation set is keyed by.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InputKind {
    Scalar(ScalarKind),
    List,
    Object,
    Collection,
}

impl InputKind {
    #[must_use]
    pub const fn of(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar(scalar) => Self::Scalar(scalar),
            FieldKind::List(_) => Self::List,
            FieldKind::Object(_) => Self::Object,
            FieldKind::Collection(_) => Self::Collection,
        }
    }
}

impl From<ScalarKind> for InputKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

///
/// DefaultOperations
///
/// Operations a field exposes when its descriptor does not say otherwise.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DefaultOperations {
    by_kind: BTreeMap<InputKind, BTreeSet<OperationId>>,
}

impl DefaultOperations {
    /// Built-in per-kind operation sets.
    #[must_use]
    pub fn standard() -> Self {
        use OperationId as Id;

        let equality = [Id::EQUALS, Id::NOT_EQUALS];
        let membership = [Id::IN, Id::NOT_IN];
        let ordering = [
            Id::GREATER_THAN,
            Id::NOT_GREATER_THAN,
            Id::GREATER_THAN_OR_EQUALS,
            Id::NOT_GREATER_THAN_OR_EQUALS,
            Id::LOWER_THAN,
            Id::NOT_LOWER_THAN,
            Id::LOWER_THAN_OR_EQUALS,
            Id::NOT_LOWER_THAN_OR_EQUALS,
        ];
        let text = [
            Id::CONTAINS,
            Id::NOT_CONTAINS,
            Id::STARTS_WITH,
            Id::NOT_STARTS_WITH,
            Id::ENDS_WITH,
            Id::NOT_ENDS_WITH,
        ];
        let many = [Id::SOME, Id::ALL, Id::NONE, Id::ANY];

        let numeric: BTreeSet<_> = equality.into_iter().chain(membership).chain(ordering).collect();

        let mut by_kind = BTreeMap::new();
        by_kind.insert(
            InputKind::Scalar(ScalarKind::Text),
            equality.into_iter().chain(membership).chain(text).collect(),
        );
        by_kind.insert(InputKind::Scalar(ScalarKind::Int), numeric.clone());
        by_kind.insert(InputKind::Scalar(ScalarKind::Uint), numeric.clone());
        by_kind.insert(InputKind::Scalar(ScalarKind::Float), numeric);
        by_kind.insert(InputKind::Scalar(ScalarKind::Bool), equality.into_iter().collect());
        by_kind.insert(InputKind::List, many.into_iter().collect());
        by_kind.insert(InputKind::Collection, many.into_iter().collect());
        by_kind.insert(InputKind::Object, BTreeSet::new());

        Self { by_kind }
    }

    #[must_use]
    pub fn for_kind(&self, kind: InputKind) -> BTreeSet<OperationId> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    pub fn kind_mut(&mut self, kind: InputKind) -> &mut BTreeSet<OperationId> {
        self.by_kind.entry(kind).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputKind, &BTreeSet<OperationId>)> {
        self.by_kind.iter().map(|(kind, ops)| (*kind, ops))
    }
}

///
/// DescriptorIssue
///
/// One descriptor validation failure found while resolving descriptors.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DescriptorIssue {
    #[error("field '{record}.{field}' references unknown operation {id}")]
    UnknownOperation {
        record: TypeRef,
        field: String,
        id: OperationId,
    },

    #[error("operation input on '{record}' configures unknown operation {id}")]
    UnknownInputOperation { record: TypeRef, id: OperationId },

    #[error("descriptor for '{record}' configures unknown field '{field}'")]
    UnknownField { record: TypeRef, field: String },

    #[error("input bound for '{expected}' on '{record}' describes '{found}'")]
    BoundTypeMismatch {
        record: TypeRef,
        expected: TypeRef,
        found: TypeRef,
    },

    #[error("'{record}' has no field of bound type '{bound}'")]
    UnresolvableBoundType { record: TypeRef, bound: TypeRef },
}

///
/// DescriptorError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("descriptor validation failed with {} issue(s)", .issues.len())]
pub struct DescriptorError {
    pub issues: Vec<DescriptorIssue>,
}
