//! Adaptive implicit time stepping with retries on divergence.
//!
//! The driver advances a [`TransientProblem`] from the start time to the final
//! time. Each step is planned from the [`Stepsize`] controller's proposal,
//! shortened if needed to land exactly on the final time (and, optionally, on
//! the exporter's next target time).
//!
//! # Algorithm
//!
//! 1. **Stepping.** Plan `dt`, update every time-dependent term to the end of
//!    the step, solve the coupled field (once per accepted time; retries
//!    reuse it), and attempt the step.
//!    - Converged: take the new state, advance the clock, let the controller
//!      react to the iteration count, go to **Exporting**.
//!    - Diverged: shrink `dt` and retry from the same time and state. Falling
//!      under `dt_min`, or exceeding the retry bound, aborts the run.
//! 2. **Exporting.** Hand the accepted state to the exporter, notify the
//!    observer, and go back to **Stepping** unless the final time is reached.
//!
//! A diverged coupled solve is fatal: no retry policy applies to it.
//!
//! # Observer
//!
//! The observer receives an [`Event`] for every accepted step and every
//! diverged attempt, and may return [`Action::StopEarly`] to end the run with
//! the last accepted state.
//!
//! # Example
//!
//! ```ignore
//! use permeate_solvers::transient::{adaptive, AdaptivePolicy, Stepsize};
//!
//! let policy = AdaptivePolicy::new(1.1, 0.5, [5, 10], 1e-3)?;
//! let stepsize = Stepsize::adaptive(0.5, policy)?;
//! let config = adaptive::Config::new(2.0);
//!
//! let solution = adaptive::solve_unobserved(&mut problem, initial, stepsize, &config)?;
//! ```

mod action;
mod config;
mod error;
mod event;
mod solution;


pub use action::Action;
pub use config::{Config, DEFAULT_MAX_RETRIES};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status, StepRecord};

use permeate_core::{
    CouplingOutcome, ExportContext, Exporter, Observer, SolveOutcome, TimeDependent,
    TimeDependentRegistry, TransientProblem,
};
use tracing::{debug, info, warn};

use super::{
    Stepsize,
    clock::{Clock, Plan},
};

/// Where the driver is within a step.
enum Phase {
    Stepping,
    Exporting { plan: Plan, iterations: usize },
    Done,
}

/// Advances a transient problem from `config.start_time` to `config.final_time`.
///
/// `terms` are updated to the end time of every attempted step before the
/// coupled and main solves. `exporter` is consulted after every accepted step.
///
/// See the [module docs](self) for the stepping algorithm and observer events.
///
/// # Errors
///
/// Returns an [`Error`] if the config is invalid, the step size falls below its
/// minimum or is too small to advance the time, a fixed step diverges, the
/// coupled solve diverges, the retry bound is exceeded, the problem reports an
/// error, or an export fails.
#[allow(clippy::too_many_lines)]
pub fn solve<P, X, Obs>(
    problem: &mut P,
    initial: P::State,
    mut stepsize: Stepsize,
    terms: &mut TimeDependentRegistry,
    exporter: &mut X,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<P::State>, Error>
where
    P: TransientProblem,
    X: Exporter<P::State>,
    Obs: for<'a> Observer<Event<'a, P::State>, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    let mut clock = Clock::new(config.start_time, config.final_time);
    let mut state = initial;
    let mut history = Vec::new();
    let mut retries = 0;
    let mut total_retries = 0;
    let mut coupled = false;

    info!(
        start_time = config.start_time,
        final_time = config.final_time,
        dt = stepsize.propose(),
        "time stepping"
    );

    let mut phase = if clock.is_finished() {
        Phase::Done
    } else {
        Phase::Stepping
    };

    loop {
        phase = match phase {
            Phase::Stepping => {
                let milestone = if config.hit_export_times {
                    exporter.next_time(clock.time())
                } else {
                    None
                };
                let plan = clock.plan(stepsize.propose(), milestone);
                let time = clock.time();

                if plan.end <= time {
                    return Err(Error::Stalled { time, dt: plan.dt });
                }

                terms.update(plan.end);

                if !coupled {
                    let coupling = problem
                        .solve_coupling(time, plan.dt)
                        .map_err(Error::problem)?;
                    if coupling == CouplingOutcome::Diverged {
                        return Err(Error::CouplingSolveFailed { time });
                    }
                    coupled = true;
                }

                match problem
                    .attempt_step(&state, time, plan.dt)
                    .map_err(Error::problem)?
                {
                    SolveOutcome::Converged {
                        state: next,
                        iterations,
                    } => {
                        state = next;
                        clock.advance(&plan);
                        stepsize.on_success(iterations, clock.time());
                        retries = 0;
                        coupled = false;

                        history.push(StepRecord {
                            time: clock.time(),
                            dt: plan.dt,
                            iterations,
                        });
                        debug!(
                            time = clock.time(),
                            dt = plan.dt,
                            iterations,
                            next_dt = stepsize.propose(),
                            "step accepted"
                        );

                        Phase::Exporting { plan, iterations }
                    }

                    SolveOutcome::Diverged => {
                        stepsize.cap(plan.dt);
                        let next_dt = stepsize
                            .on_failure()
                            .map_err(|err| Error::shrink(err, time))?;

                        retries += 1;
                        total_retries += 1;
                        warn!(time, dt = plan.dt, next_dt, retry = retries, "step diverged");

                        if retries > config.max_retries {
                            return Err(Error::RetryLimit {
                                time,
                                dt: plan.dt,
                                retries,
                            });
                        }

                        let event = Event::Diverged {
                            time,
                            dt: plan.dt,
                            retry: retries,
                            next_dt,
                        };
                        if let Some(Action::StopEarly) = observer.observe(&event) {
                            return Ok(Solution {
                                status: Status::StoppedByObserver,
                                state,
                                time: clock.time(),
                                dt: stepsize.propose(),
                                steps: history.len(),
                                retries: total_retries,
                                history,
                            });
                        }

                        Phase::Stepping
                    }
                }
            }

            Phase::Exporting { plan, iterations } => {
                let context = ExportContext::transient(clock.time(), history.len());
                exporter
                    .export(&state, &context)
                    .map_err(|err| Error::export(err, context.time))?;

                let event = Event::Accepted {
                    step: context.step,
                    time: context.time,
                    dt: plan.dt,
                    iterations,
                    next_dt: stepsize.propose(),
                    state: &state,
                };
                if let Some(Action::StopEarly) = observer.observe(&event) {
                    return Ok(Solution {
                        status: Status::StoppedByObserver,
                        state,
                        time: clock.time(),
                        dt: stepsize.propose(),
                        steps: history.len(),
                        retries: total_retries,
                        history,
                    });
                }

                if clock.is_finished() {
                    Phase::Done
                } else {
                    Phase::Stepping
                }
            }

            Phase::Done => {
                info!(
                    time = clock.time(),
                    steps = history.len(),
                    retries = total_retries,
                    "time stepping complete"
                );
                return Ok(Solution {
                    status: Status::Complete,
                    state,
                    time: clock.time(),
                    dt: stepsize.propose(),
                    steps: history.len(),
                    retries: total_retries,
                    history,
                });
            }
        };
    }
}

/// Advances a transient problem without time-dependent terms, exports, or
/// observation.
///
/// This is a convenience wrapper around [`solve`].
///
/// # Errors
///
/// Returns an [`Error`] under the same conditions as [`solve`], except export
/// failures, which cannot occur.
pub fn solve_unobserved<P>(
    problem: &mut P,
    initial: P::State,
    stepsize: Stepsize,
    config: &Config,
) -> Result<Solution<P::State>, Error>
where
    P: TransientProblem,
{
    solve(
        problem,
        initial,
        stepsize,
        &mut TimeDependentRegistry::new(),
        &mut (),
        config,
        (),
    )
}
