use crate::model::{FieldKind, FieldModel, FieldRef, Filterable, Record, RecordModel, ScalarKind};

///
/// User
///

#[derive(Clone, Debug)]
pub(crate) struct User {
    pub(crate) name: String,
    pub(crate) direct_commits_to_master: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) addresses: Vec<Address>,
    pub(crate) company: Option<Company>,
}

pub(crate) static USER_MODEL: RecordModel = RecordModel {
    name: "User",
    fields: &[
        FieldModel::new("name", FieldKind::Scalar(ScalarKind::Text)),
        FieldModel::new("directCommitsToMaster", FieldKind::Scalar(ScalarKind::Int)),
        FieldModel::new("tags", FieldKind::List(ScalarKind::Text)),
        FieldModel::new("addresses", FieldKind::Collection(&ADDRESS_MODEL)),
        FieldModel::new("company", FieldKind::Object(&COMPANY_MODEL)),
    ],
};

impl Record for User {
    fn field(&self, name: &str) -> FieldRef<'_> {
        match name {
            "name" => FieldRef::value(self.name.as_str()),
            "directCommitsToMaster" => FieldRef::value(self.direct_commits_to_master),
            "tags" => FieldRef::value(self.tags.clone()),
            "addresses" => FieldRef::many(&self.addresses),
            "company" => FieldRef::object(self.company.as_ref()),
            _ => FieldRef::Missing,
        }
    }
}

impl Filterable for User {
    fn model() -> &'static RecordModel {
        &USER_MODEL
    }
}

///
/// Address
///

#[derive(Clone, Debug)]
pub(crate) struct Address {
    pub(crate) street: String,
}

pub(crate) static ADDRESS_MODEL: RecordModel = RecordModel {
    name: "Address",
    fields: &[FieldModel::new(
        "street",
        FieldKind::Scalar(ScalarKind::Text),
    )],
};

impl Record for Address {
    fn field(&self, name: &str) -> FieldRef<'_> {
        match name {
            "street" => FieldRef::value(self.street.as_str()),
            _ => FieldRef::Missing,
        }
    }
}

impl Filterable for Address {
    fn model() -> &'static RecordModel {
        &ADDRESS_MODEL
    }
}

///
/// Company
///

#[derive(Clone, Debug)]
pub(crate) struct Company {
    pub(crate) name: String,
}

pub(crate) static COMPANY_MODEL: RecordModel = RecordModel {
    name: "Company",
    fields: &[FieldModel::new("name", FieldKind::Scalar(ScalarKind::Text))],
};

impl Record for Company {
    fn field(&self, name: &str) -> FieldRef<'_> {
        match name {
            "name" => FieldRef::value(self.name.as_str()),
            _ => FieldRef::Missing,
        }
    }
}

impl Filterable for Company {
    fn model() -> &'static RecordModel {
        &COMPANY_MODEL
    }
}

///
/// Node
///
/// Self-referencing record used to exercise cyclic models.
///

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) label: String,
    pub(crate) children: Vec<Node>,
}

pub(crate) static NODE_MODEL: RecordModel = RecordModel {
    name: "Node",
    fields: &[
        FieldModel::new("label", FieldKind::Scalar(ScalarKind::Text)),
        FieldModel::new("children", FieldKind::Collection(&NODE_MODEL)),
    ],
};

impl Record for Node {
    fn field(&self, name: &str) -> FieldRef<'_> {
        match name {
            "label" => FieldRef::value(self.label.as_str()),
            "children" => FieldRef::many(&self.children),
            _ => FieldRef::Missing,
        }
    }
}

impl Filterable for Node {
    fn model() -> &'static RecordModel {
        &NODE_MODEL
    }
}

/// The three demo users: Pascal, Michael and Raphael.
pub(crate) fn users() -> Vec<User> {
    let company = Company {
        name: "ChilliCream".to_string(),
    };

    vec![
        User {
            name: "Pascal".to_string(),
            direct_commits_to_master: 0,
            tags: vec!["core".to_string(), "filters".to_string()],
            addresses: vec![
                Address {
                    street: "A street".to_string(),
                },
                Address {
                    street: "Another street".to_string(),
                },
            ],
            company: Some(company.clone()),
        },
        User {
            name: "Michael".to_string(),
            direct_commits_to_master: 284,
            tags: vec!["core".to_string()],
            addresses: vec![Address {
                street: "Some Street".to_string(),
            }],
            company: Some(company.clone()),
        },
        User {
            name: "Raphael".to_string(),
            direct_commits_to_master: 0,
            tags: Vec::new(),
            addresses: vec![Address {
                street: "Sample Road".to_string(),
            }],
            company: None,
        },
    ]
}

/// Names of the users a predicate keeps, in input order.
pub(crate) fn names<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<&'a str> {
    users.into_iter().map(|user| user.name.as_str()).collect()
}
