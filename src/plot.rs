//! Diagnostic PNG plots of a controller run and a battery size sweep.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::opt::SweepPoint;
use crate::sim::Simulation;

type PlotResult = Result<(), Box<dyn Error>>;

fn line<'a>(values: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    values.iter().enumerate().map(|(i, &y)| (i as f64, y))
}

fn bounds<'a>(series: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = series
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi > lo {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

/// Three stacked panels against interval index: PV and output power with
/// violation markers, battery state of charge as a fraction of capacity,
/// and battery and curtailed power.
///
/// # Errors
///
/// Returns the backend error if the image cannot be drawn or written.
pub fn plot_simulation(sim: &Simulation, battery_energy: f64, path: &Path) -> PlotResult {
    let root = BitMapBackend::new(path, (1200, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((3, 1));
    let x_range = 0f64..sim.len().max(1) as f64;

    let pv = sim.pv_power();
    let out = sim.out_power();
    let (lo, hi) = bounds(pv.iter().chain(&out));
    let mut power = ChartBuilder::on(&areas[0])
        .caption("Power", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), lo..hi)?;
    power.configure_mesh().y_desc("p.u.").draw()?;
    power
        .draw_series(LineSeries::new(line(&pv), &BLUE))?
        .label("PV")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));
    power
        .draw_series(LineSeries::new(line(&out), &BLACK))?
        .label("output")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLACK));
    power
        .draw_series(
            sim.results
                .iter()
                .enumerate()
                .filter(|(_, r)| r.violation)
                .map(|(i, r)| Circle::new((i as f64, r.out_power), 3, RED.filled())),
        )?
        .label("violation")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, RED.filled()));
    power.configure_series_labels().border_style(BLACK).draw()?;

    let soc: Vec<f64> = if battery_energy > 0.0 {
        sim.battery_soc().iter().map(|s| s / battery_energy).collect()
    } else {
        vec![0.0; sim.len()]
    };
    let mut charge = ChartBuilder::on(&areas[1])
        .caption("State of charge", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), 0f64..1f64)?;
    charge.configure_mesh().y_desc("fraction").draw()?;
    charge.draw_series(LineSeries::new(line(&soc), &GREEN))?;

    let battery = sim.battery_power();
    let curtailed = sim.curtailed_power();
    let (lo, hi) = bounds(battery.iter().chain(&curtailed));
    let mut flows = ChartBuilder::on(&areas[2])
        .caption("Battery and curtailment", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, lo..hi)?;
    flows.configure_mesh().x_desc("interval").y_desc("p.u.").draw()?;
    flows
        .draw_series(LineSeries::new(line(&battery), &MAGENTA))?
        .label("battery")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &MAGENTA));
    flows
        .draw_series(LineSeries::new(line(&curtailed), &RED))?
        .label("curtailed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));
    flows.configure_series_labels().border_style(BLACK).draw()?;

    root.present()?;
    Ok(())
}

/// Full-series violations and training score against battery size.
///
/// # Errors
///
/// Returns the backend error if the image cannot be drawn or written.
pub fn plot_sweep(points: &[SweepPoint], path: &Path) -> PlotResult {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.battery_energy.total_cmp(&b.battery_energy));
    let energies: Vec<f64> = sorted.iter().map(|p| p.battery_energy).collect();
    let violations: Vec<f64> = sorted.iter().map(|p| p.violations as f64).collect();
    let train: Vec<(f64, f64)> = sorted
        .iter()
        .filter_map(|p| p.train_score.map(|s| (p.battery_energy, s)))
        .collect();

    let (x_lo, x_hi) = bounds(&energies);
    let (_, y_hi) = bounds(violations.iter().chain(train.iter().map(|(_, s)| s)));
    let mut chart = ChartBuilder::on(&root)
        .caption("Violations vs battery size", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("battery energy (h)")
        .y_desc("violations")
        .draw()?;

    let full = energies.iter().copied().zip(violations.iter().copied());
    chart
        .draw_series(LineSeries::new(full.clone(), &BLUE))?
        .label("full series")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));
    chart.draw_series(full.map(|c| Circle::new(c, 4, BLUE.filled())))?;
    chart
        .draw_series(LineSeries::new(train, &RED))?
        .label("training score")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

    chart.configure_series_labels().border_style(BLACK).draw()?;
    root.present()?;
    Ok(())
}
