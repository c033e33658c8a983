use std::{fs, path::Path, time::Duration};

use approx::assert_relative_eq;
use integration_tests::permeation::{Concentration, Permeation};
use permeate::{
    Parameters, RunError, Simulation,
    core::{Mesh1D, TimeExpression},
    observers::WallClockLimit,
    solvers::transient::adaptive::{Error, Event, Status},
};
use tempfile::tempdir;

fn mesh() -> Mesh1D {
    Mesh1D::uniform(0.0, 1.0, 20).unwrap()
}

fn transient_parameters(folder: &Path) -> Parameters {
    Parameters::from_toml_str(&format!(
        r#"
        [solving]
        final_time = 5.0
        initial_stepsize = 0.01
        hit_export_times = true

        [solving.adaptive_stepsize]
        stepsize_change_ratio = 1.5
        dt_min = 1e-6
        dt_max = 1.0

        [[exports.txt]]
        field = "solute"
        label = "mobile"
        folder = '{folder}'
        times = [0.1, 1.0, 5.0]

        [exports.derived_quantities]
        filename = '{folder}/derived_quantities.csv'

        [[exports.derived_quantities.surface_fluxes]]
        surface = {{ id = 1, x = 0.0 }}
        coefficient = 1.0

        [[exports.derived_quantities.surface_fluxes]]
        surface = {{ id = 2, x = 1.0 }}
        coefficient = 1.0

        [[exports.derived_quantities.volume_quantities]]
        kind = "total"
        field = "solute"
        volume = {{ id = 1, borders = [0.0, 1.0] }}
        "#,
        folder = folder.display()
    ))
    .unwrap()
}

#[test]
fn permeation_reaches_steady_flux() {
    let dir = tempdir().unwrap();
    let mut simulation = Simulation::new(transient_parameters(dir.path())).unwrap();
    let mut problem = Permeation::new(mesh(), 1.0, 1.0);

    let solution = simulation
        .run(&mut problem, Concentration::zeros(mesh()))
        .unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.time, 5.0);
    assert_eq!(solution.retries, 0);
    assert!(solution.history.windows(2).all(|w| w[0].time < w[1].time));
    assert!(solution.history.iter().all(|record| record.dt <= 1.0));
    for target in [0.1, 1.0] {
        assert!(
            solution.history.iter().any(|record| record.time == target),
            "no step landed on t = {target}"
        );
    }

    let transient = fs::read_to_string(dir.path().join("mobile_transient.txt")).unwrap();
    let lines: Vec<&str> = transient.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("t(s),x=0,x=0.05,"));
    let times: Vec<&str> = lines[1..]
        .iter()
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(times, ["0.1", "1", "5"]);

    let table = simulation.derived_quantities().unwrap();
    assert_eq!(
        table.titles(),
        [
            "t(s)",
            "Flux surface 1: solute",
            "Flux surface 2: solute",
            "Total solute volume 1"
        ]
    );
    assert_eq!(table.data().len(), solution.steps);

    // Linear profile: influx -D c0 / L upstream, outflux D c0 / L downstream.
    let last = table.data().last().unwrap();
    assert_relative_eq!(last[1], -1.0, max_relative = 1e-3);
    assert_relative_eq!(last[2], 1.0, max_relative = 1e-3);
    assert_relative_eq!(last[3], 0.5, max_relative = 1e-3);

    let derived = fs::read_to_string(dir.path().join("derived_quantities.csv")).unwrap();
    assert_eq!(derived.lines().count(), solution.steps + 1);
}

#[test]
fn ramped_upstream_concentration_is_tracked() {
    let parameters = Parameters::from_toml_str(
        r#"
        [solving]
        final_time = 2.0
        initial_stepsize = 0.1

        [solving.adaptive_stepsize]
        stepsize_change_ratio = 1.2
        dt_min = 1e-6
        "#,
    )
    .unwrap();

    let (ramp, upstream) = TimeExpression::new(|t: f64| t.min(1.0));
    let mut problem = Permeation::new(mesh(), 1.0, 0.0).with_upstream(upstream.clone());
    let mut simulation = Simulation::new(parameters).unwrap().with_term(ramp);

    let mut boundary = Vec::new();
    let observer = |event: &Event<'_, Concentration>| {
        if let Event::Accepted { time, state, .. } = event {
            boundary.push((*time, state.solute()[0]));
        }
        None
    };

    let solution = simulation
        .run_observed(&mut problem, Concentration::zeros(mesh()), observer)
        .unwrap();

    assert_relative_eq!(upstream.get(), 1.0);
    assert_relative_eq!(solution.state.solute()[0], 1.0, epsilon = 1e-12);
    for (time, value) in boundary {
        assert_relative_eq!(value, time.min(1.0), epsilon = 1e-12);
    }
}

#[test]
fn diverged_steps_are_retried_smaller() {
    let parameters = Parameters::from_toml_str(
        r#"
        [solving]
        final_time = 1.0
        initial_stepsize = 1.0

        [solving.adaptive_stepsize]
        stepsize_change_ratio = 2.0
        dt_min = 1e-3
        "#,
    )
    .unwrap();

    let mut problem = Permeation::new(mesh(), 1.0, 1.0).with_stiff_limit(0.3);
    let mut simulation: Simulation<Concentration> = Simulation::new(parameters).unwrap();

    let solution = simulation
        .run(&mut problem, Concentration::zeros(mesh()))
        .unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.time, 1.0);
    assert!(solution.retries > 0);
    assert_eq!(problem.attempts(), solution.steps + solution.retries);
    assert!(solution.history.iter().all(|record| record.dt <= 0.3));
}

#[test]
fn step_floor_aborts_the_run() {
    let parameters = Parameters::from_toml_str(
        r#"
        [solving]
        final_time = 1.0
        initial_stepsize = 0.5

        [solving.adaptive_stepsize]
        stepsize_change_ratio = 2.0
        dt_min = 0.1
        "#,
    )
    .unwrap();

    let mut problem = Permeation::new(mesh(), 1.0, 1.0).with_stiff_limit(0.01);
    let mut simulation: Simulation<Concentration> = Simulation::new(parameters).unwrap();

    let error = simulation
        .run(&mut problem, Concentration::zeros(mesh()))
        .unwrap_err();

    assert!(matches!(
        error,
        RunError::Transient(Error::StepTooSmall { .. })
    ));
}

#[test]
fn wall_clock_limit_stops_the_run() {
    let parameters = Parameters::from_toml_str(
        "[solving]\nfinal_time = 10.0\ninitial_stepsize = 0.1\n",
    )
    .unwrap();

    let mut problem = Permeation::new(mesh(), 1.0, 1.0);
    let mut simulation: Simulation<Concentration> = Simulation::new(parameters).unwrap();

    let solution = simulation
        .run_observed(
            &mut problem,
            Concentration::zeros(mesh()),
            WallClockLimit::new(Duration::ZERO),
        )
        .unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.steps, 1);
}

#[test]
fn steady_permeation_writes_steady_profile() {
    let dir = tempdir().unwrap();
    let parameters = Parameters::from_toml_str(&format!(
        r#"
        [solving]

        [[exports.txt]]
        field = "solute"
        label = "mobile"
        folder = '{}'
        "#,
        dir.path().display()
    ))
    .unwrap();

    let mut problem = Permeation::new(mesh(), 1.0, 1.0).with_recombination(20.0);
    let mut simulation: Simulation<Concentration> = Simulation::new(parameters).unwrap();

    let solution = simulation
        .run_steady(&mut problem, &Concentration::zeros(mesh()))
        .unwrap();

    assert!(solution.iterations > 1);

    let contents = fs::read_to_string(dir.path().join("mobile_steady.txt")).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("x,mobile"));

    let profile: Vec<(f64, f64)> = lines
        .map(|line| {
            let (x, c) = line.split_once(',').unwrap();
            (x.parse().unwrap(), c.parse().unwrap())
        })
        .collect();
    assert_eq!(profile.len(), 21);
    assert_relative_eq!(profile[0].1, 1.0, epsilon = 1e-12);
    assert_relative_eq!(profile[20].1, 0.0, epsilon = 1e-12);

    // Recombination pulls the profile under the linear one.
    for &(x, c) in &profile[1..20] {
        assert!(c < 1.0 - x, "c({x}) = {c}");
    }
}
