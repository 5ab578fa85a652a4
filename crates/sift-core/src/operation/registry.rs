use crate::operation::{Operation, OperationId, ValueKind, default_operations};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("operation id {id} is already registered as '{existing}'")]
    DuplicateId { id: OperationId, existing: String },

    #[error("operation id {id} is not registered")]
    NotFound { id: OperationId },

    #[error("operation registry is frozen")]
    Frozen,
}

///
/// OperationRegistry
///
/// Id-keyed table of every operation a configuration knows about.
/// Mutable during assembly; `freeze` flips it read-only for good.
///

#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<OperationId, Operation>,
    frozen: AtomicBool,
}

impl OperationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in operations.
    #[must_use]
    pub fn with_defaults() -> Self {
        let operations = default_operations()
            .into_iter()
            .map(|op| (op.id, op))
            .collect();

        Self {
            operations,
            frozen: AtomicBool::new(false),
        }
    }

    pub fn register(&mut self, operation: Operation) -> Result<(), RegistryError> {
        self.ensure_mutable()?;

        if let Some(existing) = self.operations.get(&operation.id) {
            return Err(RegistryError::DuplicateId {
                id: operation.id,
                existing: existing.name.clone(),
            });
        }

        self.operations.insert(operation.id, operation);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(&id)
    }

    /// Resolve an operation by its current name.
    ///
    /// Names are checked for uniqueness when a configuration is built, so
    /// after that point the first match is the only match.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Operation> {
        self.operations.values().find(|op| op.name == name)
    }

    #[must_use]
    pub fn contains(&self, id: OperationId) -> bool {
        self.operations.contains_key(&id)
    }

    pub fn rename(&mut self, id: OperationId, name: impl Into<String>) -> Result<(), RegistryError> {
        self.get_mut(id)?.name = name.into();

        Ok(())
    }

    pub fn describe(
        &mut self,
        id: OperationId,
        description: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.get_mut(id)?.description = Some(description.into());

        Ok(())
    }

    pub fn set_accepts(&mut self, id: OperationId, accepts: ValueKind) -> Result<(), RegistryError> {
        self.get_mut(id)?.accepts = accepts;

        Ok(())
    }

    /// Mark the registry read-only.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn freeze(&self) -> bool {
        !self.frozen.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Names claimed by more than one id, with the ids claiming them.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<(String, Vec<OperationId>)> {
        let mut by_name: BTreeMap<&str, Vec<OperationId>> = BTreeMap::new();
        for op in self.operations.values() {
            by_name.entry(op.name.as_str()).or_default().push(op.id);
        }

        by_name
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, ids)| (name.to_string(), ids))
            .collect()
    }

    fn get_mut(&mut self, id: OperationId) -> Result<&mut Operation, RegistryError> {
        self.ensure_mutable()?;

        self.operations
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { id })
    }

    fn ensure_mutable(&self) -> Result<(), RegistryError> {
        if self.is_frozen() {
            return Err(RegistryError::Frozen);
        }

        Ok(())
    }
}
