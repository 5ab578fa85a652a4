use crate::{
    compile::{DefaultCompiler, ExpressionCompiler},
    convention::{
        ConfigIssue, ConfigurationError, ConventionOptions, configuration::Configuration,
        provider::ProviderBuilder,
    },
    descriptor::{
        DefaultOperations, DescriptorConfig, DescriptorSet, FilterDescriptorBuilder, InputKind,
        resolve_descriptors,
    },
    handler::HandlerTable,
    model::{Filterable, TypeRef},
    operation::{Operation, OperationId, OperationRegistry, ValueKind},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

///
/// ConventionBuilder
///
/// By-value builder for a filter configuration.
/// Nothing is validated until `build`, which reports every issue at once.
///

#[derive(Default)]
pub struct ConventionBuilder {
    defaults: bool,
    added: Vec<Operation>,
    operations: BTreeMap<OperationId, OperationBuilder>,
    argument_name: Option<String>,
    bindings: BTreeMap<TypeRef, DescriptorConfig>,
    duplicate_bindings: Vec<TypeRef>,
    kinds: BTreeMap<InputKind, OperationSetBuilder>,
    provider: Option<ProviderBuilder>,
    compiler: Option<Arc<dyn ExpressionCompiler>>,
    options: ConventionOptions,
}

impl ConventionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the built-in operations and per-kind operation sets.
    #[must_use]
    pub const fn add_defaults(mut self) -> Self {
        self.defaults = true;

        self
    }

    /// Configure operation `id`. Repeated calls for one id merge.
    ///
    /// Existing operations are renamed or re-described in place; unknown ids
    /// become new operations and must be given a name.
    #[must_use]
    pub fn operation(
        mut self,
        id: OperationId,
        configure: impl FnOnce(OperationBuilder) -> OperationBuilder,
    ) -> Self {
        let current = self.operations.remove(&id).unwrap_or_default();
        self.operations.insert(id, configure(current));

        self
    }

    /// Register a complete operation. Its id must not be taken.
    #[must_use]
    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.added.push(operation);

        self
    }

    /// Name of the host argument the filter is read from.
    #[must_use]
    pub fn argument_name(mut self, name: impl Into<String>) -> Self {
        self.argument_name = Some(name.into());

        self
    }

    /// Use `descriptor` as the filter surface of `T` everywhere it appears.
    #[must_use]
    pub fn bind_runtime_type<T: Filterable>(mut self, descriptor: FilterDescriptorBuilder<T>) -> Self {
        let record = TypeRef::of::<T>();
        if self.bindings.contains_key(&record) {
            self.duplicate_bindings.push(record);
        } else {
            self.bindings.insert(record, descriptor.into_config());
        }

        self
    }

    /// Make `T` filterable with its implicit descriptor, unless it is
    /// already bound.
    #[must_use]
    pub fn filterable<T: Filterable>(mut self) -> Self {
        self.bindings
            .entry(TypeRef::of::<T>())
            .or_insert_with(|| DescriptorConfig::implicit(T::model()));

        self
    }

    /// Adjust the default operation set of one field kind.
    #[must_use]
    pub fn configure(
        mut self,
        kind: impl Into<InputKind>,
        configure: impl FnOnce(OperationSetBuilder) -> OperationSetBuilder,
    ) -> Self {
        let kind = kind.into();
        let current = self.kinds.remove(&kind).unwrap_or_default();
        self.kinds.insert(kind, configure(current));

        self
    }

    /// Configure the handler table. Without this call the table holds the
    /// built-in handlers only.
    #[must_use]
    pub fn provider(mut self, configure: impl FnOnce(ProviderBuilder) -> ProviderBuilder) -> Self {
        let current = self.provider.take().unwrap_or_default();
        self.provider = Some(configure(current));

        self
    }

    /// Replace the default expression compiler.
    #[must_use]
    pub fn compiler(mut self, compiler: impl ExpressionCompiler + 'static) -> Self {
        self.compiler = Some(Arc::new(compiler));

        self
    }

    /// Request limits and argument name. An explicit `argument_name` call
    /// wins over the options.
    #[must_use]
    pub fn options(mut self, options: ConventionOptions) -> Self {
        self.options = options;

        self
    }

    ///
    /// FINALIZE
    ///

    /// Validate everything and freeze the result.
    pub fn build(self) -> Result<Configuration, ConfigurationError> {
        let mut issues = Vec::new();

        let registry = self.build_registry(&mut issues);
        let defaults = self.build_defaults();

        let (descriptors, descriptor_issues) =
            resolve_descriptors(&registry, &defaults, &self.bindings);
        issues.extend(descriptor_issues.into_iter().map(ConfigIssue::from));
        issues.extend(
            self.duplicate_bindings
                .iter()
                .map(|record| ConfigIssue::DuplicateBinding { record: *record }),
        );

        let handlers = self
            .provider
            .unwrap_or_else(ProviderBuilder::standard)
            .build(&mut issues);

        let mut options = self.options;
        if let Some(name) = self.argument_name {
            options.argument_name = name;
        }
        options.validate(&mut issues);

        if !issues.is_empty() {
            tracing::debug!(issues = issues.len(), "filter convention rejected");

            return Err(ConfigurationError { issues });
        }

        warn_unhandled(&registry, &descriptors, &handlers);
        registry.freeze();

        tracing::info!(
            operations = registry.len(),
            descriptors = descriptors.len(),
            handlers = handlers.len(),
            argument = %options.argument_name,
            "filter configuration built"
        );

        let compiler = self
            .compiler
            .unwrap_or_else(|| Arc::new(DefaultCompiler));

        Ok(Configuration::new(
            registry,
            descriptors,
            handlers,
            compiler,
            options,
        ))
    }

    fn build_registry(&self, issues: &mut Vec<ConfigIssue>) -> OperationRegistry {
        let mut registry = if self.defaults {
            OperationRegistry::with_defaults()
        } else {
            OperationRegistry::new()
        };

        for operation in &self.added {
            if let Err(err) = registry.register(operation.clone()) {
                issues.push(err.into());
            }
        }

        for (id, config) in &self.operations {
            if let Err(issue) = config.apply(*id, &mut registry) {
                issues.push(issue);
            }
        }

        for (name, ids) in registry.duplicate_names() {
            issues.push(ConfigIssue::DuplicateOperationName { name, ids });
        }

        registry
    }

    fn build_defaults(&self) -> DefaultOperations {
        let mut defaults = if self.defaults {
            DefaultOperations::standard()
        } else {
            DefaultOperations::default()
        };

        for (kind, set) in &self.kinds {
            let ops = defaults.kind_mut(*kind);
            ops.extend(set.allow.iter().copied());
            ops.retain(|id| !set.deny.contains(id));
        }

        defaults
    }
}

impl fmt::Debug for ConventionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionBuilder")
            .field("defaults", &self.defaults)
            .field("added", &self.added)
            .field("operations", &self.operations)
            .field("argument_name", &self.argument_name)
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("kinds", &self.kinds)
            .field("provider", &self.provider)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// Allowed operations nobody can compile still parse; they fail per request.
fn warn_unhandled(registry: &OperationRegistry, descriptors: &DescriptorSet, handlers: &HandlerTable) {
    for descriptor in descriptors.iter() {
        for field in descriptor.fields.values() {
            for id in field.operations.iter().filter(|id| !id.is_quantifier()) {
                let Some(op) = registry.get(*id) else {
                    continue;
                };
                if handlers.resolve(field, op).is_none() {
                    tracing::warn!(
                        record = %descriptor.record,
                        field = %field.name,
                        operation = %op,
                        "allowed filter operation has no handler"
                    );
                }
            }
        }
    }
}

///
/// OperationBuilder
///
/// Name, description and operand shape of one operation.
///

#[derive(Clone, Debug, Default)]
pub struct OperationBuilder {
    name: Option<String>,
    description: Option<String>,
    accepts: Option<ValueKind>,
}

impl OperationBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());

        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());

        self
    }

    #[must_use]
    pub const fn accepts(mut self, kind: ValueKind) -> Self {
        self.accepts = Some(kind);

        self
    }

    fn apply(&self, id: OperationId, registry: &mut OperationRegistry) -> Result<(), ConfigIssue> {
        if !registry.contains(id) {
            let name = self
                .name
                .clone()
                .ok_or(ConfigIssue::MissingOperationName { id })?;
            let mut operation = Operation::new(id, name, self.accepts.unwrap_or(ValueKind::Field));
            operation.description.clone_from(&self.description);

            return registry.register(operation).map_err(ConfigIssue::from);
        }

        if let Some(name) = &self.name {
            registry.rename(id, name.as_str())?;
        }
        if let Some(description) = &self.description {
            registry.describe(id, description.as_str())?;
        }
        if let Some(accepts) = self.accepts {
            registry.set_accepts(id, accepts)?;
        }

        Ok(())
    }
}

///
/// OperationSetBuilder
///
/// Edits to one field kind's default operation set.
///

#[derive(Clone, Debug, Default)]
pub struct OperationSetBuilder {
    allow: BTreeSet<OperationId>,
    deny: BTreeSet<OperationId>,
}

impl OperationSetBuilder {
    #[must_use]
    pub fn allow(mut self, operation: OperationId) -> Self {
        self.deny.remove(&operation);
        self.allow.insert(operation);

        self
    }

    #[must_use]
    pub fn deny(mut self, operation: OperationId) -> Self {
        self.allow.remove(&operation);
        self.deny.insert(operation);

        self
    }
}
