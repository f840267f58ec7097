//! Post-hoc KPI computation from a controller run.

use std::fmt;

use super::engine::Simulation;

/// Aggregate key performance indicators derived from a complete run.
///
/// Computed post-hoc from a [`Simulation`] to keep reported metrics
/// consistent with the per-interval records.
#[derive(Debug, Clone)]
pub struct KpiReport {
    /// Intervals flagged as ramp violations.
    pub violation_count: usize,
    /// Violations as a share of all intervals, night included (%).
    pub violation_pct: f64,
    /// Energy delivered to the grid (hours of nameplate).
    pub total_energy: f64,
    /// Delivered energy as a share of PV energy (%).
    pub delivered_pct: f64,
    /// Energy discarded by curtailment (hours of nameplate).
    pub curtailed_energy: f64,
    /// Battery energy throughput (sum of |power| * dt).
    pub battery_throughput: f64,
    /// Throughput / (2 * capacity).
    pub battery_equivalent_full_cycles: f64,
}

impl KpiReport {
    /// Computes all KPIs from a run.
    ///
    /// # Arguments
    ///
    /// * `sim` - Complete controller run
    /// * `battery_energy` - Battery capacity for cycle calculation
    pub fn from_simulation(sim: &Simulation, battery_energy: f64) -> Self {
        if sim.is_empty() {
            return Self {
                violation_count: 0,
                violation_pct: 0.0,
                total_energy: 0.0,
                delivered_pct: 0.0,
                curtailed_energy: 0.0,
                battery_throughput: 0.0,
                battery_equivalent_full_cycles: 0.0,
            };
        }

        let h = sim.interval_hours;
        let mut pv_energy = 0.0;
        let mut curtailed = 0.0;
        let mut throughput = 0.0;
        for r in &sim.results {
            pv_energy += r.pv_power * h;
            curtailed += r.curtailed_power * h;
            throughput += r.battery_power.abs() * h;
        }

        let delivered_pct = if pv_energy > 0.0 {
            100.0 * sim.total_energy / pv_energy
        } else {
            0.0
        };

        let cycles = if battery_energy > 0.0 {
            throughput / (2.0 * battery_energy)
        } else {
            0.0
        };

        Self {
            violation_count: sim.violation_count,
            violation_pct: 100.0 * sim.violation_count as f64 / sim.len() as f64,
            total_energy: sim.total_energy,
            delivered_pct,
            curtailed_energy: curtailed,
            battery_throughput: throughput,
            battery_equivalent_full_cycles: cycles,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Violations:            {}", self.violation_count)?;
        writeln!(f, "Violation share:       {:.2}%", self.violation_pct)?;
        writeln!(f, "Total energy:          {:.3} h", self.total_energy)?;
        writeln!(f, "Energy delivered:      {:.2}%", self.delivered_pct)?;
        writeln!(f, "Curtailed energy:      {:.3} h", self.curtailed_energy)?;
        write!(
            f,
            "Battery throughput:    {:.3} h ({:.2} equiv. cycles)",
            self.battery_throughput, self.battery_equivalent_full_cycles
        )
    }
}
