//! Module: convention
//! Responsibility: assembling operations, descriptors and handlers into one
//! immutable filter configuration.
//! Does not own: parsing rules, handler semantics or program evaluation.
//! Boundary: hosts describe their conventions here once at startup; every
//! request afterwards only reads the resulting `Configuration`.

mod builder;
mod configuration;
mod provider;


use crate::{
    DEFAULT_ARGUMENT_NAME, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES,
    descriptor::DescriptorIssue,
    error::{ErrorClass, ErrorOrigin},
    filter::ParseLimits,
    handler::HandlerTableError,
    model::TypeRef,
    operation::{OperationId, RegistryError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

// re-exports
pub use builder::{ConventionBuilder, OperationBuilder, OperationSetBuilder};
pub use configuration::{Configuration, build_configuration, parse_and_compile};
pub use provider::ProviderBuilder;

///
/// ConventionOptions
///
/// Request-facing knobs of a configuration. Missing keys fall back to the
/// crate defaults, so hosts can load a partial table from their own config.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ConventionOptions {
    pub argument_name: String,
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl ConventionOptions {
    #[must_use]
    pub const fn limits(&self) -> ParseLimits {
        ParseLimits {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
        }
    }

    fn validate(&self, issues: &mut Vec<ConfigIssue>) {
        if self.argument_name.trim().is_empty() {
            issues.push(ConfigIssue::InvalidOption {
                option: "argument_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_depth == 0 {
            issues.push(ConfigIssue::InvalidOption {
                option: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_nodes == 0 {
            issues.push(ConfigIssue::InvalidOption {
                option: "max_nodes",
                reason: "must be at least 1".to_string(),
            });
        }
    }
}

impl Default for ConventionOptions {
    fn default() -> Self {
        Self {
            argument_name: DEFAULT_ARGUMENT_NAME.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

///
/// ConfigIssue
///
/// One problem found while finalizing a convention.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigIssue {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("operation {id} is new but was given no name")]
    MissingOperationName { id: OperationId },

    #[error("operation name '{name}' is claimed by ids {ids:?}")]
    DuplicateOperationName { name: String, ids: Vec<OperationId> },

    #[error(transparent)]
    Descriptor(#[from] DescriptorIssue),

    #[error("runtime type '{record}' is bound more than once")]
    DuplicateBinding { record: TypeRef },

    #[error(transparent)]
    Handler(#[from] HandlerTableError),

    #[error("option '{option}' {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}

///
/// ConfigurationError
///
/// Every issue found while finalizing a convention, fatal to startup.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("filter convention has {} issue(s): {}", .issues.len(), join_issues(.issues))]
pub struct ConfigurationError {
    pub issues: Vec<ConfigIssue>,
}

impl ConfigurationError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Convention
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
