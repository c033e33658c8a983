use permeate_core::{
    ExportContext, Exporter, Fields, Observer, SteadyProblem, TimeDependent,
    TimeDependentRegistry, TransientProblem,
};
use permeate_exports::{DerivedQuantities, ExportError, Exports};
use permeate_observers::ProgressLogger;
use permeate_solvers::{
    steady,
    transient::adaptive::{self, Action, Event, Solution},
};
use tracing::info;

use crate::{Parameters, RunError};

/// A configured simulation: parameters, time-dependent terms, and exports.
///
/// The problem itself (the assembled formulation and its nonlinear solver) is
/// passed to [`run`](Self::run) or [`run_steady`](Self::run_steady).
pub struct Simulation<S> {
    parameters: Parameters,
    terms: TimeDependentRegistry,
    exports: Exports<S>,
    derived: Option<DerivedQuantities>,
}

impl<S: Fields + 'static> Simulation<S> {
    /// Sets up the exports described by `parameters`.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if an export cannot be built.
    pub fn new(parameters: Parameters) -> Result<Self, RunError> {
        let exports = parameters.txt_exports()?;
        let derived = parameters.derived_quantities()?;
        Ok(Self {
            parameters,
            terms: TimeDependentRegistry::new(),
            exports,
            derived,
        })
    }

    /// Adds a term re-evaluated at the end time of every attempted step.
    #[must_use]
    pub fn with_term(mut self, term: impl TimeDependent + 'static) -> Self {
        self.terms.register(term);
        self
    }

    /// Adds an exporter consulted alongside the configured ones.
    #[must_use]
    pub fn with_exporter(
        mut self,
        exporter: impl Exporter<S, Error = ExportError> + 'static,
    ) -> Self {
        self.exports.push(exporter);
        self
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The derived quantities table, with every row recorded so far.
    #[must_use]
    pub fn derived_quantities(&self) -> Option<&DerivedQuantities> {
        self.derived.as_ref()
    }

    /// Runs a transient simulation, logging progress.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if the parameters lack transient settings or the
    /// driver fails.
    pub fn run<P>(&mut self, problem: &mut P, initial: S) -> Result<Solution<S>, RunError>
    where
        P: TransientProblem<State = S>,
    {
        let final_time = self.parameters.driver_config()?.final_time;
        self.run_observed(problem, initial, ProgressLogger::new(final_time))
    }

    /// Runs a transient simulation with a custom observer.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if the parameters lack transient settings or the
    /// driver fails.
    pub fn run_observed<P, Obs>(
        &mut self,
        problem: &mut P,
        initial: S,
        observer: Obs,
    ) -> Result<Solution<S>, RunError>
    where
        P: TransientProblem<State = S>,
        Obs: for<'a> Observer<Event<'a, S>, Action>,
    {
        let stepsize = self.parameters.stepsize()?;
        let config = self.parameters.driver_config()?;
        info!(
            final_time = config.final_time,
            exports = self.exports.len(),
            terms = self.terms.len(),
            "running transient simulation"
        );

        let mut outputs = Outputs {
            exports: &mut self.exports,
            derived: self.derived.as_mut(),
        };
        let solution = adaptive::solve(
            problem,
            initial,
            stepsize,
            &mut self.terms,
            &mut outputs,
            &config,
            observer,
        )?;
        Ok(solution)
    }

    /// Runs a steady simulation and exports the result in steady mode.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if the solve diverges or an export fails.
    pub fn run_steady<P>(
        &mut self,
        problem: &mut P,
        initial: &S,
    ) -> Result<steady::Solution<S>, RunError>
    where
        P: SteadyProblem<State = S>,
    {
        info!("running steady simulation");
        let mut outputs = Outputs {
            exports: &mut self.exports,
            derived: self.derived.as_mut(),
        };
        Ok(steady::solve(problem, initial, &mut outputs)?)
    }
}

/// The configured exports and the derived quantities table of one run.
struct Outputs<'a, S> {
    exports: &'a mut Exports<S>,
    derived: Option<&'a mut DerivedQuantities>,
}

impl<S: Fields> Exporter<S> for Outputs<'_, S> {
    type Error = ExportError;

    fn export(&mut self, state: &S, context: &ExportContext) -> Result<(), Self::Error> {
        self.exports.export(state, context)?;
        if let Some(derived) = self.derived.as_deref_mut() {
            derived.write(state, context)?;
        }
        Ok(())
    }

    fn next_time(&self, time: f64) -> Option<f64> {
        let derived = self
            .derived
            .as_deref()
            .and_then(|derived| Exporter::<S>::next_time(derived, time));
        let exports = self.exports.next_time(time);
        match (exports, derived) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
