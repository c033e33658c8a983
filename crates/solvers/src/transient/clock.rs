/// Relative tolerance used to snap a step onto a target time.
const SNAP_RTOL: f64 = 1e-12;

/// Simulated time of a transient run, bounded by the final time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clock {
    time: f64,
    horizon: f64,
}

/// A step the driver is about to attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Plan {
    /// Step size handed to the solver.
    pub dt: f64,

    /// Time reached if the step is accepted.
    pub end: f64,
}

impl Clock {
    pub(crate) fn new(start: f64, horizon: f64) -> Self {
        Self {
            time: start,
            horizon,
        }
    }

    pub(crate) fn time(&self) -> f64 {
        self.time
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.time >= self.horizon
    }

    /// Plans a step of `proposed` size, shortened to land exactly on the
    /// horizon or on `milestone` when the step would reach or pass them.
    pub(crate) fn plan(&self, proposed: f64, milestone: Option<f64>) -> Plan {
        let mut plan = Plan {
            dt: proposed,
            end: self.time + proposed,
        };

        let targets = milestone
            .filter(|&m| m > self.time && m < self.horizon)
            .into_iter()
            .chain(Some(self.horizon));

        for target in targets {
            if plan.end >= target - SNAP_RTOL * target.abs().max(1.0) {
                plan = Plan {
                    dt: target - self.time,
                    end: target,
                };
                break;
            }
        }

        plan
    }

    /// Moves the clock to the end of an accepted step. Plans that do not
    /// advance the time are rejected by the driver before any attempt.
    pub(crate) fn advance(&mut self, plan: &Plan) {
        debug_assert!(plan.end > self.time, "time must strictly increase");
        self.time = plan.end;
    }
}
