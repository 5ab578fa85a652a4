use crate::{
    descriptor::{
        DefaultOperations, DescriptorConfig, DescriptorId, DescriptorIssue, DescriptorSet,
        FieldDescriptor, InputKind, OperationInput,
    },
    model::{FieldKind, RecordModel, TypeRef},
    operation::{OperationId, OperationRegistry},
};
use std::collections::{BTreeMap, BTreeSet};

/// Resolve root descriptor configurations into one `DescriptorSet`.
///
/// Every root is registered under its record type. Nested record types are
/// resolved through a local binding when one exists, otherwise through the
/// root registered for that type, otherwise implicitly from the model.
/// Each type's global descriptor is built once, so cyclic models terminate.
pub(crate) fn resolve_descriptors(
    registry: &OperationRegistry,
    defaults: &DefaultOperations,
    roots: &BTreeMap<TypeRef, DescriptorConfig>,
) -> (DescriptorSet, Vec<DescriptorIssue>) {
    let mut resolver = Resolver {
        registry,
        defaults,
        roots,
        set: DescriptorSet::default(),
        issues: Vec::new(),
    };

    for config in roots.values() {
        resolver.resolve_global(config.model);
    }

    (resolver.set, resolver.issues)
}

///
/// Resolver
///

struct Resolver<'a> {
    registry: &'a OperationRegistry,
    defaults: &'a DefaultOperations,
    roots: &'a BTreeMap<TypeRef, DescriptorConfig>,
    set: DescriptorSet,
    issues: Vec<DescriptorIssue>,
}

impl Resolver<'_> {
    fn resolve_global(&mut self, model: &'static RecordModel) -> DescriptorId {
        let record = model.type_ref();
        if let Some(id) = self.set.lookup(record) {
            return id;
        }

        let id = self.set.reserve(record);
        self.set.bind(record, id);

        let implicit;
        let config = match self.roots.get(&record) {
            Some(config) => config,
            None => {
                implicit = DescriptorConfig::implicit(model);
                &implicit
            }
        };
        self.build(id, config);

        id
    }

    fn resolve_local(&mut self, config: &DescriptorConfig) -> DescriptorId {
        let id = self.set.reserve(config.record());
        self.build(id, config);

        id
    }

    fn build(&mut self, id: DescriptorId, config: &DescriptorConfig) {
        let record = config.record();
        self.check_bindings(config);
        self.check_configured_fields(config);

        let mut fields = BTreeMap::new();
        for field in config.model.fields {
            if config.ignored.contains(field.name) {
                continue;
            }

            let rule = config.rules.get(field.name);
            if config.explicit && rule.is_none() {
                continue;
            }

            let operations: BTreeSet<OperationId> = match rule {
                Some(rule) => match &rule.replace {
                    Some(ops) => ops.clone(),
                    None => {
                        let mut ops = self.defaults.for_kind(InputKind::of(field.kind));
                        ops.extend(rule.added.iter().copied());
                        ops
                    }
                },
                None => self.defaults.for_kind(InputKind::of(field.kind)),
            };

            let element_operations = match field.kind {
                FieldKind::List(scalar) => self.defaults.for_kind(InputKind::Scalar(scalar)),
                _ => BTreeSet::new(),
            };

            for op in operations.iter().chain(&element_operations) {
                if !self.registry.contains(*op) {
                    self.issues.push(DescriptorIssue::UnknownOperation {
                        record,
                        field: field.name.to_string(),
                        id: *op,
                    });
                }
            }

            let nested = field.kind.nested_model().map(|nested| {
                match config.bindings.get(&nested.type_ref()) {
                    Some(local) => self.resolve_local(local),
                    None => self.resolve_global(nested),
                }
            });

            fields.insert(
                field.name.to_string(),
                FieldDescriptor {
                    name: field.name.to_string(),
                    kind: field.kind,
                    operations,
                    element_operations,
                    nested,
                },
            );
        }

        let inputs: BTreeMap<OperationId, OperationInput> = config.inputs.clone();
        for op in inputs.keys() {
            if !self.registry.contains(*op) {
                self.issues
                    .push(DescriptorIssue::UnknownInputOperation { record, id: *op });
            }
        }

        self.set.fill(id, fields, inputs);
    }

    fn check_configured_fields(&mut self, config: &DescriptorConfig) {
        let record = config.record();
        let configured = config.rules.keys().chain(config.ignored.iter());

        for name in configured {
            if config.model.field(name).is_none() {
                self.issues.push(DescriptorIssue::UnknownField {
                    record,
                    field: name.clone(),
                });
            }
        }
    }

    fn check_bindings(&mut self, config: &DescriptorConfig) {
        let record = config.record();

        for (bound, local) in &config.bindings {
            if local.record() != *bound {
                self.issues.push(DescriptorIssue::BoundTypeMismatch {
                    record,
                    expected: *bound,
                    found: local.record(),
                });
            }

            let reachable = config
                .model
                .fields
                .iter()
                .filter_map(|field| field.kind.nested_model())
                .any(|nested| nested.type_ref() == *bound);
            if !reachable {
                self.issues.push(DescriptorIssue::UnresolvableBoundType {
                    record,
                    bound: *bound,
                });
            }
        }
    }
}
