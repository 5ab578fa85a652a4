use crate::{
    descriptor::{DefaultOperations, DescriptorError, DescriptorSet, OperationInput, resolve},
    model::{Filterable, RecordModel, TypeRef},
    operation::{OperationId, OperationRegistry, ValueKind},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    marker::PhantomData,
};

/// Start describing the filterable surface of `T`.
#[must_use]
pub fn describe_type<T: Filterable>() -> FilterDescriptorBuilder<T> {
    FilterDescriptorBuilder {
        config: DescriptorConfig::implicit(T::model()),
        _marker: PhantomData,
    }
}

///
/// FilterDescriptorBuilder
///
/// By-value builder for one record type's descriptor.
/// Fields are taken from `T::model()` unless `bind_fields_explicitly` is
/// called; every field can be overridden individually.
///

pub struct FilterDescriptorBuilder<T> {
    config: DescriptorConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for FilterDescriptorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptorBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Filterable> FilterDescriptorBuilder<T> {
    /// Replace the operations allowed on `name`.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        operations: impl IntoIterator<Item = OperationId>,
    ) -> Self {
        let rule = self.config.rules.entry(name.into()).or_default();
        rule.replace = Some(operations.into_iter().collect());

        self
    }

    /// Allow one more operation on `name`, on top of its current set.
    #[must_use]
    pub fn allow(mut self, name: impl Into<String>, operation: OperationId) -> Self {
        let rule = self.config.rules.entry(name.into()).or_default();
        match &mut rule.replace {
            Some(ops) => {
                ops.insert(operation);
            }
            None => {
                rule.added.insert(operation);
            }
        }

        self
    }

    /// Remove `name` from the filterable surface.
    #[must_use]
    pub fn ignore(mut self, name: impl Into<String>) -> Self {
        self.config.ignored.insert(name.into());

        self
    }

    /// Only fields named through `field` or `allow` are filterable.
    #[must_use]
    pub const fn bind_fields_explicitly(mut self) -> Self {
        self.config.explicit = true;

        self
    }

    /// Use `descriptor` for fields of this record whose nested type is
    /// `type_ref`, instead of the type's global descriptor.
    #[must_use]
    pub fn bind_input_type<U: Filterable>(
        mut self,
        type_ref: TypeRef,
        descriptor: FilterDescriptorBuilder<U>,
    ) -> Self {
        self.config.bindings.insert(type_ref, descriptor.config);

        self
    }

    /// Override how `operation` accepts its operand on this record.
    #[must_use]
    pub fn configure_operation_input(
        mut self,
        operation: OperationId,
        configure: impl FnOnce(OperationInputBuilder) -> OperationInputBuilder,
    ) -> Self {
        let current = self
            .config
            .inputs
            .remove(&operation)
            .unwrap_or_default();
        let input = configure(OperationInputBuilder { input: current }).input;
        self.config.inputs.insert(operation, input);

        self
    }

    /// Resolve this descriptor on its own against `registry`.
    ///
    /// Nested record types without a local binding get implicit descriptors.
    pub fn build(
        self,
        registry: &OperationRegistry,
        defaults: &DefaultOperations,
    ) -> Result<DescriptorSet, DescriptorError> {
        let record = self.config.model.type_ref();
        let roots = BTreeMap::from([(record, self.config)]);

        let (set, issues) = resolve::resolve_descriptors(registry, defaults, &roots);
        if issues.is_empty() {
            Ok(set)
        } else {
            Err(DescriptorError { issues })
        }
    }

    pub(crate) fn into_config(self) -> DescriptorConfig {
        self.config
    }
}

///
/// OperationInputBuilder
///

#[derive(Debug, Default)]
pub struct OperationInputBuilder {
    input: OperationInput,
}

impl OperationInputBuilder {
    #[must_use]
    pub const fn accepts(mut self, kind: ValueKind) -> Self {
        self.input.accepts = Some(kind);

        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.input.description = Some(description.into());

        self
    }
}

///
/// FieldRule
///

#[derive(Clone, Debug, Default)]
pub(crate) struct FieldRule {
    pub(crate) replace: Option<BTreeSet<OperationId>>,
    pub(crate) added: BTreeSet<OperationId>,
}

///
/// DescriptorConfig
///
/// Untyped descriptor configuration, resolved at finalization.
///

#[derive(Clone, Debug)]
pub(crate) struct DescriptorConfig {
    pub(crate) model: &'static RecordModel,
    pub(crate) explicit: bool,
    pub(crate) rules: BTreeMap<String, FieldRule>,
    pub(crate) ignored: BTreeSet<String>,
    pub(crate) bindings: BTreeMap<TypeRef, Self>,
    pub(crate) inputs: BTreeMap<OperationId, OperationInput>,
}

impl DescriptorConfig {
    pub(crate) const fn implicit(model: &'static RecordModel) -> Self {
        Self {
            model,
            explicit: false,
            rules: BTreeMap::new(),
            ignored: BTreeSet::new(),
            bindings: BTreeMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    pub(crate) const fn record(&self) -> TypeRef {
        self.model.type_ref()
    }
}
