use crate::{
    compile::program::{Program, Subject},
    model::{Filterable, TypeRef},
    obs::sink::{MetricsEvent, record},
};
use std::{
    fmt,
    marker::PhantomData,
    ops::{BitAnd, BitOr, Not},
    sync::Arc,
};

///
/// Predicate
///
/// Compiled, immutable filter over records of type `R`.
/// Cheap to clone and safe to share across threads.
///

pub struct Predicate<R> {
    program: Arc<Program>,
    _marker: PhantomData<fn(&R) -> bool>,
}

impl<R: Filterable> Predicate<R> {
    pub(crate) fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
            _marker: PhantomData,
        }
    }

    /// Predicate that keeps every record.
    #[must_use]
    pub fn always() -> Self {
        Self::new(Program::True)
    }

    /// Predicate that keeps no record.
    #[must_use]
    pub fn never() -> Self {
        Self::new(Program::False)
    }

    #[must_use]
    pub fn record_type() -> TypeRef {
        TypeRef::of::<R>()
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn matches(&self, record: &R) -> bool {
        self.program.eval(Subject::Record(record))
    }

    /// Lazily keep the matching records of `records`.
    pub fn filter<'a, I>(&'a self, records: I) -> impl Iterator<Item = &'a R> + 'a
    where
        I: IntoIterator<Item = &'a R>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |record| self.matches(record))
    }

    /// Keep the matching records of a slice, in order, and report the scan.
    pub fn apply<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        let matched: Vec<&R> = records.iter().filter(|record| self.matches(record)).collect();

        record(MetricsEvent::RecordsEvaluated {
            record_type: Self::record_type().name(),
            scanned: records.len() as u64,
            matched: matched.len() as u64,
        });

        matched
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            _marker: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.program).finish()
    }
}

impl<R: Filterable> BitAnd for Predicate<R> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::new(unwrap_program(self).and(unwrap_program(rhs)))
    }
}

impl<R: Filterable> BitOr for Predicate<R> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::new(unwrap_program(self).or(unwrap_program(rhs)))
    }
}

impl<R: Filterable> Not for Predicate<R> {
    type Output = Self;

    fn not(self) -> Self {
        Self::new(unwrap_program(self).negate())
    }
}

// Take the program out of its Arc, cloning only when it is shared.
fn unwrap_program<R>(predicate: Predicate<R>) -> Program {
    Arc::try_unwrap(predicate.program).unwrap_or_else(|shared| (*shared).clone())
}
