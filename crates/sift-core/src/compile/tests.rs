use crate::{
    compile::{CompileContext, CompileError, DefaultCompiler, ExpressionCompiler, Predicate},
    descriptor::{DefaultOperations, DescriptorSet, describe_type},
    filter::{FilterNode, ParseLimits, Parser, Quantifier},
    handler::{FnHandler, HandlerError, HandlerTable, Position},
    model::TypeRef,
    operation::{OperationId, OperationRegistry},
    test_fixtures::{Address, Company, User, names, users},
    value::Value,
};
use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

///
/// Harness
///
/// Default registry, descriptors and handlers for `User`.
///

struct Harness {
    registry: OperationRegistry,
    descriptors: DescriptorSet,
    handlers: HandlerTable,
}

impl Harness {
    fn new() -> Self {
        Self::with_handlers(HandlerTable::with_defaults())
    }

    fn with_handlers(handlers: HandlerTable) -> Self {
        let registry = OperationRegistry::with_defaults();
        let descriptors = describe_type::<User>()
            .build(&registry, &DefaultOperations::standard())
            .expect("user descriptors should build");

        Self {
            registry,
            descriptors,
            handlers,
        }
    }

    fn parse(&self, raw: &JsonValue) -> FilterNode {
        Parser::new(&self.registry, &self.descriptors, ParseLimits::default())
            .parse_for(TypeRef::of::<User>(), raw)
            .expect("filter should parse")
    }

    fn compile(&self, node: &FilterNode) -> Result<Predicate<User>, CompileError> {
        let root = self
            .descriptors
            .for_type(TypeRef::of::<User>())
            .expect("user descriptor should be registered");
        let cx = CompileContext {
            registry: &self.registry,
            descriptors: &self.descriptors,
            handlers: &self.handlers,
            root,
        };

        DefaultCompiler.compile(&cx, node).map(Predicate::new)
    }

    fn predicate(&self, raw: &JsonValue) -> Predicate<User> {
        self.compile(&self.parse(raw))
            .expect("filter should compile")
    }
}

fn matching(harness: &Harness, raw: &JsonValue) -> Vec<String> {
    let users = users();
    let predicate = harness.predicate(raw);

    names(predicate.apply(&users))
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn homeless() -> User {
    User {
        name: "Nomad".to_string(),
        direct_commits_to_master: 1,
        tags: Vec::new(),
        addresses: Vec::new(),
        company: None,
    }
}

#[test]
fn nested_collection_filter_is_existential_and_case_sensitive() {
    let harness = Harness::new();

    assert_eq!(
        matching(
            &harness,
            &json!({ "addresses": { "street": { "contains": "Street" } } })
        ),
        vec!["Michael"]
    );
}

#[test]
fn contains_is_case_sensitive_on_names() {
    let harness = Harness::new();

    assert!(matching(&harness, &json!({ "name": { "contains": "z" } })).is_empty());
    assert_eq!(
        matching(&harness, &json!({ "name": { "contains": "a" } })),
        vec!["Pascal", "Michael", "Raphael"]
    );
    assert!(matching(&harness, &json!({ "name": { "contains": "A" } })).is_empty());
}

#[test]
fn all_quantifier_is_universal_and_vacuous_on_empty_collections() {
    let harness = Harness::new();
    let all = harness.predicate(&json!({
        "addresses": { "all": { "street": { "endsWith": "street" } } }
    }));
    let some = harness.predicate(&json!({
        "addresses": { "some": { "street": { "endsWith": "street" } } }
    }));

    assert_eq!(names(all.apply(&users())), vec!["Pascal"]);
    assert!(all.matches(&homeless()));
    assert!(!some.matches(&homeless()));
}

#[test]
fn none_quantifier_rejects_any_hit() {
    let harness = Harness::new();

    assert_eq!(
        matching(
            &harness,
            &json!({ "addresses": { "none": { "street": { "startsWith": "A" } } } })
        ),
        vec!["Michael", "Raphael"]
    );
}

#[test]
fn scalar_list_quantifiers_apply_to_elements() {
    let harness = Harness::new();

    assert_eq!(
        matching(&harness, &json!({ "tags": { "some": { "eq": "filters" } } })),
        vec!["Pascal"]
    );
    assert_eq!(
        matching(&harness, &json!({ "tags": { "none": { "eq": "core" } } })),
        vec!["Raphael"]
    );
    assert_eq!(
        matching(&harness, &json!({ "tags": { "all": { "eq": "core" } } })),
        vec!["Michael", "Raphael"]
    );
    assert_eq!(
        matching(&harness, &json!({ "tags": { "any": false } })),
        vec!["Raphael"]
    );
}

#[test]
fn object_relation_never_matches_absent_object() {
    let harness = Harness::new();
    let filter = json!({ "company": { "name": { "eq": "ChilliCream" } } });

    assert_eq!(matching(&harness, &filter), vec!["Pascal", "Michael"]);
    assert_eq!(
        matching(&harness, &json!({ "not": filter })),
        vec!["Raphael"]
    );
}

#[test]
fn logical_combinators_compose() {
    let harness = Harness::new();

    assert_eq!(
        matching(
            &harness,
            &json!({
                "or": [
                    { "directCommitsToMaster": { "gt": 100 } },
                    { "name": { "startsWith": "R" } }
                ]
            })
        ),
        vec!["Michael", "Raphael"]
    );
    assert_eq!(
        matching(
            &harness,
            &json!({
                "name": { "nin": ["Michael"] },
                "directCommitsToMaster": { "lte": 0 }
            })
        ),
        vec!["Pascal", "Raphael"]
    );
}

#[test]
fn empty_exclusion_list_matches_like_negated_membership() {
    let harness = Harness::new();

    let excluded = matching(&harness, &json!({ "name": { "nin": [] } }));
    let negated = matching(&harness, &json!({ "not": { "name": { "in": [] } } }));

    assert_eq!(excluded, vec!["Pascal", "Michael", "Raphael"]);
    assert_eq!(excluded, negated);
    assert!(matching(&harness, &json!({ "name": { "in": [] } })).is_empty());
}

#[test]
fn empty_and_accepts_and_empty_or_rejects() {
    let harness = Harness::new();
    let accept = harness
        .compile(&FilterNode::accept_all())
        .expect("empty and should compile");
    let reject = harness
        .compile(&FilterNode::reject_all())
        .expect("empty or should compile");

    assert_eq!(accept.apply(&users()).len(), 3);
    assert!(reject.apply(&users()).is_empty());
    assert_eq!(matching(&harness, &json!({})).len(), 3);
}

#[test]
fn predicates_compose_with_operators() {
    let harness = Harness::new();
    let pascal = harness.predicate(&json!({ "name": { "eq": "Pascal" } }));
    let michael = harness.predicate(&json!({ "name": { "eq": "Michael" } }));
    let users = users();

    assert_eq!(
        names((pascal.clone() | michael.clone()).apply(&users)),
        vec!["Pascal", "Michael"]
    );
    assert!((pascal.clone() & michael).apply(&users).is_empty());
    assert_eq!(names((!pascal).apply(&users)), vec!["Michael", "Raphael"]);
    assert!(Predicate::<User>::never().apply(&users).is_empty());
}

#[test]
fn lazy_filter_keeps_input_order() {
    let harness = Harness::new();
    let predicate = harness.predicate(&json!({ "directCommitsToMaster": { "eq": 0 } }));
    let users = users();

    assert_eq!(names(predicate.filter(&users)), vec!["Pascal", "Raphael"]);
}

#[test]
fn unhandled_operation_is_a_compile_error() {
    let harness = Harness::with_handlers(HandlerTable::new());
    let node = harness.parse(&json!({ "name": { "eq": "Pascal" } }));

    assert_eq!(
        harness.compile(&node).expect_err("no handler should claim eq"),
        CompileError::UnhandledOperation {
            record: TypeRef::of::<User>(),
            field: "name".to_string(),
            operation: "eq".to_string(),
        }
    );
}

#[test]
fn handler_failure_is_reported_with_its_id() {
    let mut handlers = HandlerTable::with_defaults();
    handlers
        .register(
            Arc::new(FnHandler::new(
                "broken",
                |_, op| op.id == OperationId::EQUALS,
                |_, _, _, _| Err(HandlerError::new("boom")),
            )),
            Position::Prepend,
        )
        .expect("prepend should succeed");
    let harness = Harness::with_handlers(handlers);
    let node = harness.parse(&json!({ "name": { "eq": "Pascal" } }));

    let err = harness.compile(&node).expect_err("handler should fail");
    assert!(matches!(
        err,
        CompileError::Handler { ref handler, ref field, .. } if handler == "broken" && field == "name"
    ));
}

#[test]
fn unknown_field_in_tree_is_rejected() {
    let harness = Harness::new();
    let node = FilterNode::Operation {
        field: "age".to_string(),
        operation: OperationId::EQUALS,
        value: Value::from(1),
    };

    assert!(matches!(
        harness.compile(&node),
        Err(CompileError::UnknownField { .. })
    ));
}

///
/// PROPERTIES
///

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("Pa".to_string()),
        Just("el".to_string()),
        Just("z".to_string()),
        "[a-zA-Z]{0,3}",
    ]
}

fn arb_texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_text(), 0..3)
}

fn arb_quantifier() -> impl Strategy<Value = Quantifier> {
    prop_oneof![Just(Quantifier::Any), Just(Quantifier::All), Just(Quantifier::None)]
}

fn arb_element_leaf() -> impl Strategy<Value = FilterNode> {
    let leaf = |operation: OperationId, value: Value| FilterNode::Operation {
        field: "tags".to_string(),
        operation,
        value,
    };

    prop_oneof![
        arb_text().prop_map(move |text| leaf(OperationId::EQUALS, Value::from(text))),
        arb_text().prop_map(move |text| leaf(OperationId::NOT_CONTAINS, Value::from(text))),
        arb_texts().prop_map(move |texts| leaf(OperationId::NOT_IN, Value::from(texts))),
    ]
}

fn arb_leaf() -> impl Strategy<Value = FilterNode> {
    prop_oneof![
        arb_texts().prop_map(|texts| FilterNode::Operation {
            field: "name".to_string(),
            operation: OperationId::IN,
            value: Value::from(texts),
        }),
        arb_texts().prop_map(|texts| FilterNode::Operation {
            field: "name".to_string(),
            operation: OperationId::NOT_IN,
            value: Value::from(texts),
        }),
        (arb_quantifier(), arb_element_leaf()).prop_map(|(quantifier, leaf)| {
            FilterNode::Elements {
                field: "tags".to_string(),
                quantifier,
                filter: Box::new(leaf),
            }
        }),
        arb_text().prop_map(|text| FilterNode::Operation {
            field: "name".to_string(),
            operation: OperationId::CONTAINS,
            value: Value::from(text),
        }),
        arb_text().prop_map(|text| FilterNode::Operation {
            field: "name".to_string(),
            operation: OperationId::NOT_EQUALS,
            value: Value::from(text),
        }),
        (-5_i64..300).prop_map(|n| FilterNode::Operation {
            field: "directCommitsToMaster".to_string(),
            operation: OperationId::GREATER_THAN_OR_EQUALS,
            value: Value::from(n),
        }),
        any::<bool>().prop_map(|flag| FilterNode::Operation {
            field: "tags".to_string(),
            operation: OperationId::ANY,
            value: Value::from(flag),
        }),
        (arb_text(), arb_quantifier())
            .prop_map(|(text, quantifier)| FilterNode::Relation {
                field: "addresses".to_string(),
                quantifier,
                filter: Box::new(FilterNode::Operation {
                    field: "street".to_string(),
                    operation: OperationId::STARTS_WITH,
                    value: Value::from(text),
                }),
            }),
        arb_text().prop_map(|text| FilterNode::Relation {
            field: "company".to_string(),
            quantifier: Quantifier::One,
            filter: Box::new(FilterNode::Operation {
                field: "name".to_string(),
                operation: OperationId::ENDS_WITH,
                value: Value::from(text),
            }),
        }),
    ]
}

fn arb_node() -> impl Strategy<Value = FilterNode> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FilterNode::And),
            prop::collection::vec(inner.clone(), 0..4).prop_map(FilterNode::Or),
            inner.prop_map(|node| FilterNode::Not(Box::new(node))),
        ]
    })
}

fn arb_user() -> impl Strategy<Value = User> {
    (
        arb_text(),
        0_i64..300,
        arb_texts(),
        arb_texts(),
        prop::option::of(arb_text()),
    )
        .prop_map(|(name, commits, tags, streets, company)| User {
            name,
            direct_commits_to_master: commits,
            tags,
            addresses: streets
                .into_iter()
                .map(|street| Address { street })
                .collect(),
            company: company.map(|name| Company { name }),
        })
}

// field, positive op, negated op, operand; every user holds the field
type NegatedPair = (&'static str, &'static str, &'static str, JsonValue);

fn arb_negated_pair() -> impl Strategy<Value = NegatedPair> {
    let text_ops = prop_oneof![
        Just(("eq", "neq")),
        Just(("contains", "ncontains")),
        Just(("startsWith", "nstartsWith")),
        Just(("endsWith", "nendsWith")),
    ];
    let number_ops = prop_oneof![
        Just(("gt", "ngt")),
        Just(("gte", "ngte")),
        Just(("lt", "nlt")),
        Just(("lte", "nlte")),
        Just(("eq", "neq")),
    ];

    prop_oneof![
        (text_ops, arb_text()).prop_map(|((pos, neg), text)| ("name", pos, neg, json!(text))),
        (number_ops, -5_i64..300)
            .prop_map(|((pos, neg), n)| ("directCommitsToMaster", pos, neg, json!(n))),
        arb_texts().prop_map(|texts| ("name", "in", "nin", json!(texts))),
    ]
}

proptest! {
    #[test]
    fn negated_operation_complements_positive(
        (field, positive, negated, operand) in arb_negated_pair(),
        user in arb_user(),
    ) {
        let harness = Harness::new();
        let pos = harness.predicate(&json!({ field: { positive: operand.clone() } }));
        let neg = harness.predicate(&json!({ field: { negated: operand } }));

        prop_assert_eq!(neg.matches(&user), !pos.matches(&user));
    }

    #[test]
    fn negation_inverts_every_filter(node in arb_node(), user in arb_user()) {
        let harness = Harness::new();
        let positive = harness.compile(&node).expect("filter should compile");
        let negative = harness
            .compile(&FilterNode::Not(Box::new(node)))
            .expect("negated filter should compile");

        prop_assert_eq!(negative.matches(&user), !positive.matches(&user));
    }

    #[test]
    fn de_morgan_holds(children in prop::collection::vec(arb_node(), 0..4), user in arb_user()) {
        let harness = Harness::new();
        let left = harness
            .compile(&FilterNode::Not(Box::new(FilterNode::And(children.clone()))))
            .expect("negated conjunction should compile");
        let right = harness
            .compile(&FilterNode::Or(
                children
                    .into_iter()
                    .map(|child| FilterNode::Not(Box::new(child)))
                    .collect(),
            ))
            .expect("disjunction of negations should compile");

        prop_assert_eq!(left.matches(&user), right.matches(&user));
    }

    #[test]
    fn every_filter_evaluates_against_an_empty_collection(node in arb_node()) {
        let harness = Harness::new();
        let predicate = harness.compile(&node).expect("filter should compile");

        prop_assert!(predicate.apply(&[]).is_empty());
    }

    #[test]
    fn lazy_and_eager_evaluation_agree(
        node in arb_node(),
        users in prop::collection::vec(arb_user(), 0..6),
    ) {
        let harness = Harness::new();
        let predicate = harness.compile(&node).expect("filter should compile");

        let eager = names(predicate.apply(&users));
        let lazy = names(predicate.filter(&users));
        prop_assert_eq!(eager, lazy);
    }
}
