use crate::{
    descriptor::{DescriptorSet, FieldDescriptor, FilterDescriptor},
    filter::{FilterNode, ParseError, ParseLimits, Quantifier},
    model::{FieldKind, TypeRef},
    operation::{Operation, OperationId, OperationRegistry},
    value::Value,
};
use serde_json::{Map, Value as JsonValue};

///
/// Parser
///
/// Turns a raw JSON filter into a validated `FilterNode`.
/// Operation and combinator names are resolved through the registry, so
/// renamed operations parse under their new names only.
///

#[derive(Clone, Copy, Debug)]
pub struct Parser<'a> {
    registry: &'a OperationRegistry,
    descriptors: &'a DescriptorSet,
    limits: ParseLimits,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub const fn new(
        registry: &'a OperationRegistry,
        descriptors: &'a DescriptorSet,
        limits: ParseLimits,
    ) -> Self {
        Self {
            registry,
            descriptors,
            limits,
        }
    }

    /// Parse `raw` against the root descriptor registered for `record`.
    pub fn parse_for(&self, record: TypeRef, raw: &JsonValue) -> Result<FilterNode, ParseError> {
        let descriptor = self
            .descriptors
            .for_type(record)
            .ok_or(ParseError::UnknownRecordType { record })?;

        self.parse(descriptor, raw)
    }

    pub fn parse(
        &self,
        descriptor: &FilterDescriptor,
        raw: &JsonValue,
    ) -> Result<FilterNode, ParseError> {
        let mut state = ParseState::default();
        let node = self.parse_level(&mut state, Scope::Record(descriptor), raw, 1)?;

        tracing::debug!(
            record = %descriptor.record,
            nodes = state.nodes,
            "filter parsed"
        );

        Ok(node)
    }

    ///
    /// LEVELS
    ///

    fn parse_level(
        &self,
        state: &mut ParseState,
        scope: Scope<'_>,
        raw: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        if depth > self.limits.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                max: self.limits.max_depth,
            });
        }

        let map = expect_object(state, raw, "filter object")?;
        let mut children = Vec::with_capacity(map.len());
        for (key, value) in map {
            state.path.push(key.clone());
            children.push(self.parse_entry(state, scope, key, value, depth)?);
            state.path.pop();
        }

        self.conjoin(state, children)
    }

    fn parse_entry(
        &self,
        state: &mut ParseState,
        scope: Scope<'_>,
        key: &str,
        value: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        if let Some(combinator) = self.combinator(key) {
            return self.parse_combinator(state, scope, combinator, value, depth);
        }

        match scope {
            Scope::Record(descriptor) => {
                if let Some(field) = descriptor.field(key) {
                    return self.parse_field(state, descriptor, field, value, depth);
                }

                if self.registry.get_by_name(key).is_some() {
                    return Err(ParseError::UnknownCombinator {
                        path: state.path(),
                        key: key.to_string(),
                    });
                }

                Err(ParseError::UnknownField {
                    path: state.path(),
                    record: descriptor.record,
                    field: key.to_string(),
                })
            }
            Scope::Element { descriptor, field } => {
                let op = self
                    .registry
                    .get_by_name(key)
                    .filter(|op| field.allows_on_element(op.id))
                    .ok_or_else(|| ParseError::OperationNotAllowed {
                        path: state.path(),
                        field: field.name.clone(),
                        operation: key.to_string(),
                    })?;

                self.parse_literal(state, descriptor, field, op, value)
            }
        }
    }

    fn parse_combinator(
        &self,
        state: &mut ParseState,
        scope: Scope<'_>,
        combinator: Combinator,
        value: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        let node = match combinator {
            Combinator::And | Combinator::Or => {
                let JsonValue::Array(items) = value else {
                    return Err(ParseError::InvalidShape {
                        path: state.path(),
                        expected: "list of filter objects",
                        found: json_label(value),
                    });
                };

                let mut children = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    state.path.push(i.to_string());
                    children.push(self.parse_level(state, scope, item, depth + 1)?);
                    state.path.pop();
                }

                if combinator == Combinator::And {
                    FilterNode::And(children)
                } else {
                    FilterNode::Or(children)
                }
            }
            Combinator::Not => {
                FilterNode::Not(Box::new(self.parse_level(state, scope, value, depth + 1)?))
            }
        };

        state.count(self.limits)?;

        Ok(node)
    }

    ///
    /// FIELDS
    ///

    fn parse_field(
        &self,
        state: &mut ParseState,
        descriptor: &FilterDescriptor,
        field: &FieldDescriptor,
        value: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        let map = expect_object(state, value, "operation object")?;
        let nested = field.nested.and_then(|id| self.descriptors.get(id));

        let mut children = Vec::new();
        let mut relation_keys = Vec::new();
        for (key, sub) in map {
            let op = self.registry.get_by_name(key);

            if let Some(op) = op.filter(|op| field.allows(op.id)) {
                state.path.push(key.clone());
                children.push(self.parse_field_operation(state, descriptor, field, op, sub, depth)?);
                state.path.pop();
                continue;
            }

            match (op, nested) {
                (_, Some(nested))
                    if self.combinator(key).is_some() || nested.field(key).is_some() =>
                {
                    relation_keys.push((key, sub));
                }
                (Some(op), _) => {
                    state.path.push(key.clone());
                    return Err(ParseError::OperationNotAllowed {
                        path: state.path(),
                        field: field.name.clone(),
                        operation: op.name.clone(),
                    });
                }
                (None, Some(_)) => relation_keys.push((key, sub)),
                (None, None) => {
                    state.path.push(key.clone());
                    return Err(ParseError::OperationNotAllowed {
                        path: state.path(),
                        field: field.name.clone(),
                        operation: key.clone(),
                    });
                }
            }
        }

        if let Some(nested) = nested.filter(|_| !relation_keys.is_empty()) {
            if depth + 1 > self.limits.max_depth {
                return Err(ParseError::DepthLimitExceeded {
                    max: self.limits.max_depth,
                });
            }

            let mut inner = Vec::with_capacity(relation_keys.len());
            for (key, sub) in relation_keys {
                state.path.push(key.clone());
                inner.push(self.parse_entry(state, Scope::Record(nested), key, sub, depth + 1)?);
                state.path.pop();
            }

            let quantifier = match field.kind {
                FieldKind::Collection(_) => Quantifier::Any,
                _ => Quantifier::One,
            };
            let filter = self.conjoin(state, inner)?;
            state.count(self.limits)?;
            children.push(FilterNode::Relation {
                field: field.name.clone(),
                quantifier,
                filter: Box::new(filter),
            });
        }

        self.conjoin(state, children)
    }

    fn parse_field_operation(
        &self,
        state: &mut ParseState,
        descriptor: &FilterDescriptor,
        field: &FieldDescriptor,
        op: &Operation,
        value: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        let Some(quantifier) = Quantifier::from_operation(op.id) else {
            return self.parse_literal(state, descriptor, field, op, value);
        };

        let node = match field.kind {
            FieldKind::Collection(_) => {
                let nested = field
                    .nested
                    .and_then(|id| self.descriptors.get(id))
                    .ok_or_else(|| ParseError::InvalidShape {
                        path: state.path(),
                        expected: "filterable collection",
                        found: "collection without descriptor",
                    })?;
                let filter = self.parse_level(state, Scope::Record(nested), value, depth + 1)?;

                FilterNode::Relation {
                    field: field.name.clone(),
                    quantifier,
                    filter: Box::new(filter),
                }
            }
            FieldKind::List(_) => {
                let scope = Scope::Element { descriptor, field };
                let filter = self.parse_level(state, scope, value, depth + 1)?;

                FilterNode::Elements {
                    field: field.name.clone(),
                    quantifier,
                    filter: Box::new(filter),
                }
            }
            FieldKind::Scalar(_) | FieldKind::Object(_) => {
                return Err(ParseError::TypeMismatch {
                    path: state.path(),
                    field: field.name.clone(),
                    operation: op.name.clone(),
                    expected: "a list or collection field".to_string(),
                    found: field_label(field.kind),
                });
            }
        };

        state.count(self.limits)?;

        Ok(node)
    }

    fn parse_literal(
        &self,
        state: &mut ParseState,
        descriptor: &FilterDescriptor,
        field: &FieldDescriptor,
        op: &Operation,
        raw: &JsonValue,
    ) -> Result<FilterNode, ParseError> {
        let accepts = descriptor
            .accepts(op.id, self.registry)
            .unwrap_or(op.accepts);
        let mismatch = |state: &ParseState, found| ParseError::TypeMismatch {
            path: state.path(),
            field: field.name.clone(),
            operation: op.name.clone(),
            expected: accepts.describe(field.scalar()),
            found,
        };

        let value = Value::try_from(raw).map_err(|_| mismatch(&*state, json_label(raw)))?;
        if !accepts.accepts(&value, field.scalar()) {
            return Err(mismatch(&*state, value.type_label()));
        }

        state.count(self.limits)?;

        Ok(FilterNode::Operation {
            field: field.name.clone(),
            operation: op.id,
            value,
        })
    }

    ///
    /// HELPERS
    ///

    fn combinator(&self, key: &str) -> Option<Combinator> {
        let named = |id: OperationId| self.registry.get(id).is_some_and(|op| op.name == key);

        if named(OperationId::AND) {
            Some(Combinator::And)
        } else if named(OperationId::OR) {
            Some(Combinator::Or)
        } else if named(OperationId::NOT) {
            Some(Combinator::Not)
        } else {
            None
        }
    }

    // Sibling keys are implicitly AND-combined.
    fn conjoin(
        &self,
        state: &mut ParseState,
        mut children: Vec<FilterNode>,
    ) -> Result<FilterNode, ParseError> {
        if children.len() == 1
            && let Some(only) = children.pop()
        {
            return Ok(only);
        }

        state.count(self.limits)?;

        Ok(FilterNode::And(children))
    }
}

///
/// Scope
///
/// What the keys of the current level are resolved against.
///

#[derive(Clone, Copy)]
enum Scope<'d> {
    Record(&'d FilterDescriptor),
    /// Elements of a scalar list; keys are element operations.
    Element {
        descriptor: &'d FilterDescriptor,
        field: &'d FieldDescriptor,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Combinator {
    And,
    Or,
    Not,
}

///
/// ParseState
///

#[derive(Default)]
struct ParseState {
    nodes: usize,
    path: Vec<String>,
}

impl ParseState {
    fn path(&self) -> String {
        self.path.join(".")
    }

    fn count(&mut self, limits: ParseLimits) -> Result<(), ParseError> {
        self.nodes += 1;
        if self.nodes > limits.max_nodes {
            return Err(ParseError::NodeLimitExceeded {
                max: limits.max_nodes,
            });
        }

        Ok(())
    }
}

fn expect_object<'v>(
    state: &ParseState,
    raw: &'v JsonValue,
    expected: &'static str,
) -> Result<&'v Map<String, JsonValue>, ParseError> {
    raw.as_object().ok_or_else(|| ParseError::InvalidShape {
        path: state.path(),
        expected,
        found: json_label(raw),
    })
}

const fn json_label(raw: &JsonValue) -> &'static str {
    match raw {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "text",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "object",
    }
}

const fn field_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Scalar(_) => "scalar field",
        FieldKind::List(_) => "list field",
        FieldKind::Object(_) => "object field",
        FieldKind::Collection(_) => "collection field",
    }
}
