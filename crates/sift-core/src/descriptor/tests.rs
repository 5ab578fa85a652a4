use crate::{
    descriptor::{DefaultOperations, DescriptorIssue, InputKind, describe_type},
    model::TypeRef,
    operation::{OperationId, OperationRegistry, ValueKind},
    test_fixtures::{Address, Node, User},
    value::ScalarKind,
};

fn registry() -> OperationRegistry {
    OperationRegistry::with_defaults()
}

#[test]
fn implicit_fields_get_per_kind_defaults() {
    let set = describe_type::<User>()
        .build(&registry(), &DefaultOperations::standard())
        .expect("user descriptor should build");
    let user = set
        .for_type(TypeRef::of::<User>())
        .expect("user descriptor should be registered");

    let name = user.field("name").expect("name should be filterable");
    assert!(name.allows(OperationId::CONTAINS));
    assert!(!name.allows(OperationId::GREATER_THAN));

    let commits = user
        .field("directCommitsToMaster")
        .expect("commits should be filterable");
    assert!(commits.allows(OperationId::LOWER_THAN_OR_EQUALS));
    assert!(!commits.allows(OperationId::STARTS_WITH));

    let addresses = user.field("addresses").expect("addresses should be filterable");
    assert!(addresses.allows(OperationId::ANY));
    let nested = set
        .get(addresses.nested.expect("addresses should be nested"))
        .expect("nested descriptor should exist");
    assert_eq!(nested.record, TypeRef::of::<Address>());
    assert!(nested.field("street").is_some());
}

#[test]
fn field_replaces_and_allow_extends() {
    let set = describe_type::<User>()
        .field("name", [OperationId::EQUALS])
        .allow("directCommitsToMaster", OperationId::new(123))
        .ignore("tags")
        .build(&registry(), &DefaultOperations::standard());

    // op 123 is not registered yet
    let err = set.expect_err("unknown op should be reported");
    assert_eq!(
        err.issues,
        vec![DescriptorIssue::UnknownOperation {
            record: TypeRef::of::<User>(),
            field: "directCommitsToMaster".to_string(),
            id: OperationId::new(123),
        }]
    );

    let set = describe_type::<User>()
        .field("name", [OperationId::EQUALS])
        .allow("name", OperationId::STARTS_WITH)
        .ignore("tags")
        .build(&registry(), &DefaultOperations::standard())
        .expect("descriptor should build");
    let user = set
        .for_type(TypeRef::of::<User>())
        .expect("user descriptor should be registered");
    let name = user.field("name").expect("name should be filterable");

    assert_eq!(
        name.operations.iter().copied().collect::<Vec<_>>(),
        vec![OperationId::EQUALS, OperationId::STARTS_WITH]
    );
    assert!(user.field("tags").is_none());
}

#[test]
fn explicit_binding_only_keeps_named_fields() {
    let set = describe_type::<User>()
        .bind_fields_explicitly()
        .field("name", [OperationId::EQUALS, OperationId::CONTAINS])
        .build(&registry(), &DefaultOperations::standard())
        .expect("descriptor should build");
    let user = set
        .for_type(TypeRef::of::<User>())
        .expect("user descriptor should be registered");

    assert_eq!(user.fields.len(), 1);
    assert!(user.field("addresses").is_none());
}

#[test]
fn unknown_configured_field_is_reported() {
    let err = describe_type::<User>()
        .field("nickname", [OperationId::EQUALS])
        .build(&registry(), &DefaultOperations::standard())
        .expect_err("unknown field should be reported");

    assert_eq!(
        err.issues,
        vec![DescriptorIssue::UnknownField {
            record: TypeRef::of::<User>(),
            field: "nickname".to_string(),
        }]
    );
}

#[test]
fn bound_input_type_replaces_nested_descriptor() {
    let set = describe_type::<User>()
        .bind_input_type(
            TypeRef::of::<Address>(),
            describe_type::<Address>().field("street", [OperationId::EQUALS]),
        )
        .build(&registry(), &DefaultOperations::standard())
        .expect("descriptor should build");
    let user = set
        .for_type(TypeRef::of::<User>())
        .expect("user descriptor should be registered");
    let addresses = user.field("addresses").expect("addresses should exist");
    let nested = set
        .get(addresses.nested.expect("addresses should be nested"))
        .expect("nested descriptor should exist");
    let street = nested.field("street").expect("street should exist");

    assert_eq!(street.operations.len(), 1);
    assert!(street.allows(OperationId::EQUALS));
}

#[test]
fn bound_input_type_must_match_and_be_reachable() {
    let err = describe_type::<User>()
        .bind_input_type(TypeRef::named("Address"), describe_type::<Node>())
        .bind_input_type(TypeRef::of::<Node>(), describe_type::<Node>())
        .build(&registry(), &DefaultOperations::standard())
        .expect_err("bad bindings should be reported");

    assert!(err.issues.contains(&DescriptorIssue::BoundTypeMismatch {
        record: TypeRef::of::<User>(),
        expected: TypeRef::named("Address"),
        found: TypeRef::of::<Node>(),
    }));
    assert!(err.issues.contains(&DescriptorIssue::UnresolvableBoundType {
        record: TypeRef::of::<User>(),
        bound: TypeRef::of::<Node>(),
    }));
}

#[test]
fn cyclic_models_resolve_to_one_descriptor() {
    let set = describe_type::<Node>()
        .build(&registry(), &DefaultOperations::standard())
        .expect("node descriptor should build");
    let node = set
        .for_type(TypeRef::of::<Node>())
        .expect("node descriptor should be registered");
    let children = node.field("children").expect("children should exist");

    assert_eq!(set.len(), 1);
    assert_eq!(children.nested, Some(node.id));
}

#[test]
fn operation_input_overrides_registry_shape() {
    let registry = registry();
    let set = describe_type::<Address>()
        .configure_operation_input(OperationId::EQUALS, |input| {
            input
                .accepts(ValueKind::Scalar(ScalarKind::Int))
                .description("numeric street codes")
        })
        .build(&registry, &DefaultOperations::standard())
        .expect("descriptor should build");
    let address = set
        .for_type(TypeRef::of::<Address>())
        .expect("address descriptor should be registered");

    assert_eq!(
        address.accepts(OperationId::EQUALS, &registry),
        Some(ValueKind::Scalar(ScalarKind::Int))
    );
    assert_eq!(
        address.accepts(OperationId::CONTAINS, &registry),
        Some(ValueKind::Field)
    );
    assert_eq!(
        address.operation_inputs[&OperationId::EQUALS]
            .description
            .as_deref(),
        Some("numeric street codes")
    );
}

#[test]
fn default_operation_sets_can_be_edited_per_kind() {
    let mut defaults = DefaultOperations::standard();
    defaults
        .kind_mut(InputKind::from(ScalarKind::Bool))
        .insert(OperationId::IN);

    assert!(defaults
        .for_kind(InputKind::Scalar(ScalarKind::Bool))
        .contains(&OperationId::IN));
    assert!(defaults.for_kind(InputKind::Object).is_empty());
}
