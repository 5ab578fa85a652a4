use crate::{
    compile::{CompileContext, CompileError, ExpressionCompiler, Predicate},
    convention::{ConfigurationError, ConventionBuilder, ConventionOptions},
    descriptor::DescriptorSet,
    error::FilterError,
    filter::{FilterNode, ParseError, Parser},
    handler::HandlerTable,
    model::{Filterable, TypeRef},
    obs::sink::{MetricsEvent, record},
    operation::OperationRegistry,
};
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};

/// Assemble a configuration from a setup closure over a fresh builder.
pub fn build_configuration(
    setup: impl FnOnce(ConventionBuilder) -> ConventionBuilder,
) -> Result<Configuration, ConfigurationError> {
    setup(ConventionBuilder::new()).build()
}

/// Parse `raw` for record type `R` and compile it into a predicate.
pub fn parse_and_compile<R: Filterable>(
    config: &Configuration,
    raw: &JsonValue,
) -> Result<Predicate<R>, FilterError> {
    let record_type = TypeRef::of::<R>().name();

    let node = match config.parse::<R>(raw) {
        Ok(node) => node,
        Err(err) => {
            record(MetricsEvent::FilterRejected { record_type });
            tracing::debug!(record = record_type, error = %err, "filter rejected");

            return Err(err.into());
        }
    };
    record(MetricsEvent::FilterParsed {
        record_type,
        nodes: node.node_count() as u64,
    });

    match config.compile::<R>(&node) {
        Ok(predicate) => {
            record(MetricsEvent::FilterCompiled { record_type });

            Ok(predicate)
        }
        Err(err) => {
            record(MetricsEvent::CompileFailed { record_type });

            Err(err.into())
        }
    }
}

///
/// Configuration
///
/// Frozen result of a convention: registry, descriptors, handlers and
/// compiler. Cheap to clone; shared freely across threads.
///

#[derive(Clone)]
pub struct Configuration {
    inner: Arc<Inner>,
}

struct Inner {
    registry: OperationRegistry,
    descriptors: DescriptorSet,
    handlers: HandlerTable,
    compiler: Arc<dyn ExpressionCompiler>,
    options: ConventionOptions,
}

impl Configuration {
    pub(crate) fn new(
        registry: OperationRegistry,
        descriptors: DescriptorSet,
        handlers: HandlerTable,
        compiler: Arc<dyn ExpressionCompiler>,
        options: ConventionOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                descriptors,
                handlers,
                compiler,
                options,
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.inner.registry
    }

    #[must_use]
    pub fn descriptors(&self) -> &DescriptorSet {
        &self.inner.descriptors
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerTable {
        &self.inner.handlers
    }

    #[must_use]
    pub fn options(&self) -> &ConventionOptions {
        &self.inner.options
    }

    #[must_use]
    pub fn argument_name(&self) -> &str {
        &self.inner.options.argument_name
    }

    /// The filter inside a host argument map, read from the configured
    /// argument name. An explicit `null` counts as no filter.
    #[must_use]
    pub fn filter_argument<'a>(&self, args: &'a JsonValue) -> Option<&'a JsonValue> {
        args.get(self.argument_name()).filter(|raw| !raw.is_null())
    }

    /// Predicate for the filter inside `args`; keeps everything when the
    /// argument is absent.
    pub fn predicate_from_args<R: Filterable>(
        &self,
        args: &JsonValue,
    ) -> Result<Predicate<R>, FilterError> {
        match self.filter_argument(args) {
            Some(raw) => parse_and_compile(self, raw),
            None => Ok(Predicate::always()),
        }
    }

    pub fn parse<R: Filterable>(&self, raw: &JsonValue) -> Result<FilterNode, ParseError> {
        Parser::new(self.registry(), self.descriptors(), self.options().limits())
            .parse_for(TypeRef::of::<R>(), raw)
    }

    pub fn compile<R: Filterable>(&self, node: &FilterNode) -> Result<Predicate<R>, CompileError> {
        let record = TypeRef::of::<R>();
        let root = self
            .descriptors()
            .for_type(record)
            .ok_or(CompileError::UnknownRecordType { record })?;
        let cx = CompileContext {
            registry: self.registry(),
            descriptors: self.descriptors(),
            handlers: self.handlers(),
            root,
        };

        self.inner.compiler.compile(&cx, node).map(Predicate::new)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("operations", &self.registry().len())
            .field("descriptors", &self.descriptors().len())
            .field("handlers", self.handlers())
            .field("options", self.options())
            .finish_non_exhaustive()
    }
}
