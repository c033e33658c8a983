use std::{cell::Cell, fmt, rc::Rc};

/// A term of the formulation whose value depends on simulated time.
///
/// Boundary conditions, sources, and trap densities that vary in time are
/// re-evaluated through this trait before each solve attempt.
///
/// Closures taking the time as `f64` implement `TimeDependent` directly.
pub trait TimeDependent {
    /// Re-evaluates the term at `time`.
    fn update(&mut self, time: f64);
}

impl<F> TimeDependent for F
where
    F: FnMut(f64),
{
    fn update(&mut self, time: f64) {
        self(time);
    }
}

/// An ordered collection of time-dependent terms updated together.
///
/// The time-stepping driver owns one registry and updates every term with the
/// end time of each step it attempts.
#[derive(Default)]
pub struct TimeDependentRegistry {
    terms: Vec<Box<dyn TimeDependent>>,
}

impl TimeDependentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term; terms are updated in registration order.
    pub fn register(&mut self, term: impl TimeDependent + 'static) {
        self.terms.push(Box::new(term));
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, term: impl TimeDependent + 'static) -> Self {
        self.register(term);
        self
    }

    /// Returns the number of registered terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if no terms are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl TimeDependent for TimeDependentRegistry {
    fn update(&mut self, time: f64) {
        for term in &mut self.terms {
            term.update(time);
        }
    }
}

impl fmt::Debug for TimeDependentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeDependentRegistry")
            .field("terms", &self.terms.len())
            .finish()
    }
}

/// A shared, read-only handle to the current value of a [`TimeExpression`].
///
/// The registry owns the expression and updates it; the solve adapter keeps a
/// `TimeValue` and reads the latest value when assembling.
#[derive(Debug, Clone, Default)]
pub struct TimeValue(Rc<Cell<f64>>);

impl TimeValue {
    /// Returns the value computed at the most recent update.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.0.get()
    }
}

/// A scalar expression of time, such as a ramped boundary concentration.
pub struct TimeExpression<F> {
    expression: F,
    value: TimeValue,
}

impl<F> TimeExpression<F>
where
    F: Fn(f64) -> f64,
{
    /// Creates an expression evaluated at `t = 0` and returns it along with a
    /// handle to its value.
    pub fn new(expression: F) -> (Self, TimeValue) {
        let value = TimeValue(Rc::new(Cell::new(expression(0.0))));
        let handle = value.clone();
        (Self { expression, value }, handle)
    }
}

impl<F> TimeDependent for TimeExpression<F>
where
    F: Fn(f64) -> f64,
{
    fn update(&mut self, time: f64) {
        self.value.0.set((self.expression)(time));
    }
}
