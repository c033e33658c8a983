//! Hydrogen permeation through a 1D membrane.
//!
//! Mobile hydrogen diffuses through `[0, L]` from a prescribed upstream
//! concentration at `x = 0` into vacuum (`c = 0`) at `x = L`, with optional
//! second-order recombination in the bulk:
//!
//! ```text
//! dc/dt = D d²c/dx² - k c²
//! ```
//!
//! Each step is implicit Euler in time, solved with Newton's method on the
//! three-point finite-difference system. Iteration counts are the real Newton
//! counts, so the adaptive stepsize reacts to them as it would to an external
//! finite-element solver.

use permeate::{
    config::NewtonSolver,
    core::{FieldView, Fields, Mesh1D, SolveOutcome, SteadyProblem, TimeValue, TransientProblem},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PermeationError {
    #[error("singular Jacobian at row {0}")]
    Singular(usize),

    #[error("state has {found} values but the mesh has {expected} vertices")]
    Size { expected: usize, found: usize },
}

/// Mobile hydrogen concentration at every mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Concentration {
    mesh: Mesh1D,
    solute: Vec<f64>,
}

impl Concentration {
    #[must_use]
    pub fn zeros(mesh: Mesh1D) -> Self {
        let solute = vec![0.0; mesh.vertices().len()];
        Self { mesh, solute }
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh1D {
        &self.mesh
    }

    #[must_use]
    pub fn solute(&self) -> &[f64] {
        &self.solute
    }
}

impl Fields for Concentration {
    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "solute" => FieldView::new(&self.mesh, &self.solute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Upstream {
    Constant(f64),
    Varying(TimeValue),
}

impl Upstream {
    fn value(&self) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Varying(value) => value.get(),
        }
    }
}

/// The permeation problem, advanced one implicit step at a time.
#[derive(Debug, Clone)]
pub struct Permeation {
    mesh: Mesh1D,
    diffusivity: f64,
    recombination: f64,
    upstream: Upstream,
    newton: NewtonSolver,
    stiff_limit: Option<f64>,
    attempts: usize,
}

impl Permeation {
    #[must_use]
    pub fn new(mesh: Mesh1D, diffusivity: f64, upstream: f64) -> Self {
        Self {
            mesh,
            diffusivity,
            recombination: 0.0,
            upstream: Upstream::Constant(upstream),
            newton: NewtonSolver::default(),
            stiff_limit: None,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn with_recombination(mut self, k: f64) -> Self {
        self.recombination = k;
        self
    }

    /// Reads the upstream concentration from a time-dependent term.
    #[must_use]
    pub fn with_upstream(mut self, value: TimeValue) -> Self {
        self.upstream = Upstream::Varying(value);
        self
    }

    #[must_use]
    pub fn with_newton(mut self, newton: NewtonSolver) -> Self {
        self.newton = newton;
        self
    }

    /// Reports divergence for every step longer than `dt`, as a Newton solve
    /// started too far from the solution would.
    #[must_use]
    pub fn with_stiff_limit(mut self, dt: f64) -> Self {
        self.stiff_limit = Some(dt);
        self
    }

    /// Number of transient steps attempted so far, diverged ones included.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Runs Newton's method from `previous`. A zero `inv_dt` drops the time
    /// derivative.
    fn newton(
        &self,
        previous: &[f64],
        inv_dt: f64,
    ) -> Result<SolveOutcome<Vec<f64>>, PermeationError> {
        let expected = self.mesh.vertices().len();
        if previous.len() != expected {
            return Err(PermeationError::Size {
                expected,
                found: previous.len(),
            });
        }

        let upstream = self.upstream.value();
        let mut solution = previous.to_vec();
        let mut first_norm = None;
        let mut iterations = 0;

        loop {
            let system = self.assemble(&solution, previous, inv_dt, upstream);
            let norm = system.residual_norm();
            if !norm.is_finite() {
                return Ok(SolveOutcome::Diverged);
            }

            let reference = *first_norm.get_or_insert(norm);
            if norm <= self.newton.absolute_tolerance + self.newton.relative_tolerance * reference
            {
                return Ok(SolveOutcome::converged(solution, iterations));
            }
            if iterations == self.newton.maximum_iterations {
                return Ok(SolveOutcome::Diverged);
            }

            let delta = system.solve()?;
            for (value, change) in solution.iter_mut().zip(delta) {
                *value += change;
            }
            iterations += 1;
        }
    }

    fn assemble(
        &self,
        current: &[f64],
        previous: &[f64],
        inv_dt: f64,
        upstream: f64,
    ) -> Tridiagonal {
        let x = self.mesh.vertices();
        let n = x.len();
        let mut system = Tridiagonal::zeros(n);

        system.diag[0] = 1.0;
        system.residual[0] = current[0] - upstream;
        system.diag[n - 1] = 1.0;
        system.residual[n - 1] = current[n - 1];

        for i in 1..n - 1 {
            let left = x[i] - x[i - 1];
            let right = x[i + 1] - x[i];
            let scale = 2.0 * self.diffusivity / (left + right);
            let u = current[i];

            let laplacian = (current[i + 1] - u) / right - (u - current[i - 1]) / left;
            system.residual[i] = inv_dt * (u - previous[i]) - scale * laplacian
                + self.recombination * u * u;
            system.lower[i] = -scale / left;
            system.upper[i] = -scale / right;
            system.diag[i] = inv_dt + scale * (left.recip() + right.recip())
                + 2.0 * self.recombination * u;
        }

        system
    }
}

impl TransientProblem for Permeation {
    type State = Concentration;
    type Error = PermeationError;

    fn attempt_step(
        &mut self,
        state: &Concentration,
        _time: f64,
        dt: f64,
    ) -> Result<SolveOutcome<Concentration>, Self::Error> {
        self.attempts += 1;
        if self.stiff_limit.is_some_and(|limit| dt > limit) {
            return Ok(SolveOutcome::Diverged);
        }

        Ok(match self.newton(&state.solute, dt.recip())? {
            SolveOutcome::Converged { state: solute, iterations } => SolveOutcome::converged(
                Concentration {
                    mesh: state.mesh.clone(),
                    solute,
                },
                iterations,
            ),
            SolveOutcome::Diverged => SolveOutcome::Diverged,
        })
    }
}

impl SteadyProblem for Permeation {
    type State = Concentration;
    type Error = PermeationError;

    fn solve(
        &mut self,
        initial: &Concentration,
    ) -> Result<SolveOutcome<Concentration>, Self::Error> {
        Ok(match self.newton(&initial.solute, 0.0)? {
            SolveOutcome::Converged { state: solute, iterations } => SolveOutcome::converged(
                Concentration {
                    mesh: initial.mesh.clone(),
                    solute,
                },
                iterations,
            ),
            SolveOutcome::Diverged => SolveOutcome::Diverged,
        })
    }
}

/// A tridiagonal Jacobian with the residual it was assembled with.
struct Tridiagonal {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    residual: Vec<f64>,
}

impl Tridiagonal {
    fn zeros(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            residual: vec![0.0; n],
        }
    }

    fn residual_norm(&self) -> f64 {
        self.residual.iter().fold(0.0_f64, |norm, r| norm.max(r.abs()))
    }

    /// Solves `J delta = -residual` with the Thomas algorithm.
    fn solve(&self) -> Result<Vec<f64>, PermeationError> {
        let n = self.diag.len();
        let mut upper = vec![0.0; n];
        let mut rhs = vec![0.0; n];

        let mut previous_upper = 0.0;
        let mut previous_rhs = 0.0;
        for i in 0..n {
            let pivot = self.diag[i] - self.lower[i] * previous_upper;
            if pivot.abs() <= f64::MIN_POSITIVE {
                return Err(PermeationError::Singular(i));
            }
            upper[i] = self.upper[i] / pivot;
            rhs[i] = (-self.residual[i] - self.lower[i] * previous_rhs) / pivot;
            previous_upper = upper[i];
            previous_rhs = rhs[i];
        }

        for i in (0..n - 1).rev() {
            rhs[i] -= upper[i] * rhs[i + 1];
        }
        Ok(rhs)
    }
}
