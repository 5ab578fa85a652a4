use crate::{
    convention::ConfigIssue,
    handler::{HandlerTable, OperationHandler, Position},
};
use std::{fmt, sync::Arc};

///
/// ProviderBuilder
///
/// Collects the handlers of a configuration.
/// Custom handlers without an explicit position are placed ahead of the
/// default handlers, in registration order.
///

#[derive(Clone, Default)]
pub struct ProviderBuilder {
    defaults: bool,
    handlers: Vec<(Arc<dyn OperationHandler>, Option<Position>)>,
}

impl ProviderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with only the built-in handlers.
    #[must_use]
    pub fn standard() -> Self {
        Self::new().add_default_field_handlers()
    }

    #[must_use]
    pub const fn add_default_field_handlers(mut self) -> Self {
        self.defaults = true;

        self
    }

    #[must_use]
    pub fn add_field_handler(self, handler: impl OperationHandler + 'static) -> Self {
        self.add_shared_handler(Arc::new(handler), None)
    }

    #[must_use]
    pub fn add_field_handler_at(
        self,
        handler: impl OperationHandler + 'static,
        position: Position,
    ) -> Self {
        self.add_shared_handler(Arc::new(handler), Some(position))
    }

    /// Register a handler that is already shared elsewhere.
    #[must_use]
    pub fn add_shared_handler(
        mut self,
        handler: Arc<dyn OperationHandler>,
        position: Option<Position>,
    ) -> Self {
        self.handlers.push((handler, position));

        self
    }

    pub(crate) fn build(self, issues: &mut Vec<ConfigIssue>) -> HandlerTable {
        let mut table = if self.defaults {
            HandlerTable::with_defaults()
        } else {
            HandlerTable::new()
        };
        let first_default = table.ids().next().map(str::to_string);

        for (handler, position) in self.handlers {
            let position = position.unwrap_or_else(|| {
                first_default
                    .clone()
                    .map_or(Position::Append, Position::Before)
            });

            if let Err(err) = table.register(handler, position) {
                issues.push(err.into());
            }
        }

        table
    }
}

impl fmt::Debug for ProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("defaults", &self.defaults)
            .field(
                "handlers",
                &self
                    .handlers
                    .iter()
                    .map(|(handler, _)| handler.id())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
