use crate::config::Settings;

/// A battery energy storage system backing the ramp controller.
///
/// `Battery` holds the physical limits only; state of charge is owned by the
/// controller run and passed in explicitly, so one `Battery` can serve any
/// number of independent runs.
///
/// Energy is expressed in hours of PV nameplate and power as a fraction of
/// nameplate. Round-trip losses are split evenly between the two half-cycles:
/// charging stores `p * sqrt(eta)` and discharging draws `p / sqrt(eta)`.
///
/// # Power Flow Convention (Terminal)
/// - Positive power: Discharging (adds to the PV output)
/// - Negative power: Charging (absorbs PV output)
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    /// Energy capacity (hours of nameplate).
    pub energy: f64,

    /// Symmetric charge/discharge power rating (fraction of nameplate).
    pub power: f64,

    /// Efficiency of one half-cycle, `sqrt(round_trip_efficiency)`.
    pub half_eff: f64,

    /// Duration of one ramp interval in hours.
    interval_hours: f64,
}

impl Battery {
    /// Creates a new battery with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `energy` - Energy capacity in hours of nameplate (>= 0)
    /// * `power` - Power rating as a fraction of nameplate (>= 0)
    /// * `round_trip_efficiency` - Round-trip efficiency (0..=1.0)
    /// * `interval_hours` - Ramp interval length in hours (> 0)
    ///
    /// # Panics
    ///
    /// Panics if any argument is outside its range.
    pub fn new(energy: f64, power: f64, round_trip_efficiency: f64, interval_hours: f64) -> Self {
        assert!(energy >= 0.0);
        assert!(power >= 0.0);
        assert!(round_trip_efficiency > 0.0 && round_trip_efficiency <= 1.0);
        assert!(interval_hours > 0.0);

        Self {
            energy,
            power,
            half_eff: round_trip_efficiency.sqrt(),
            interval_hours,
        }
    }

    /// Builds the battery described by validated controller settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let b = &settings.battery;
        Self::new(
            b.energy,
            b.power,
            b.round_trip_efficiency,
            settings.ramp.interval_hours(),
        )
    }

    /// Returns the terminal power actually achievable for a requested power.
    ///
    /// First limits the request so the interval neither overfills nor drains
    /// the battery past empty, landing exactly on full or empty when it binds,
    /// then enforces the symmetric power rating.
    pub fn feasible_power(&self, soc: f64, requested: f64) -> f64 {
        let h = self.interval_hours;
        let mut p = requested;

        if soc - p * self.half_eff * h > self.energy {
            // Charging would overflow: only fill the remaining headroom.
            p = -(self.energy - soc) / h / self.half_eff;
        } else if soc - p * h / self.half_eff < 0.0 {
            // Discharging would overdraw: deliver what is stored, net of losses.
            p = soc * self.half_eff / h;
        }

        p.clamp(-self.power, self.power)
    }

    /// State of charge after holding terminal power `p` for one interval.
    pub fn next_soc(&self, soc: f64, p: f64) -> f64 {
        let h = self.interval_hours;
        let next = if p > 0.0 {
            soc - p * h / self.half_eff
        } else if p < 0.0 {
            soc - p * self.half_eff * h
        } else {
            soc
        };
        next.clamp(0.0, self.energy)
    }

    /// Duration of one interval in hours.
    pub fn interval_hours(&self) -> f64 {
        self.interval_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_battery() {
        let battery = Battery::new(0.2, 1.0, 0.81, 0.5);
        assert_eq!(battery.energy, 0.2);
        assert_eq!(battery.power, 1.0);
        assert_relative_eq!(battery.half_eff, 0.9);
        assert_eq!(battery.interval_hours(), 0.5);
    }

    #[test]
    #[should_panic]
    fn test_invalid_efficiency() {
        Battery::new(0.2, 1.0, 0.0, 0.5);
    }

    #[test]
    #[should_panic]
    fn test_invalid_energy() {
        Battery::new(-0.1, 1.0, 0.9, 0.5);
    }

    #[test]
    fn test_power_limit_both_directions() {
        let battery = Battery::new(10.0, 0.5, 1.0, 1.0);
        assert_eq!(battery.feasible_power(5.0, 2.0), 0.5);
        assert_eq!(battery.feasible_power(5.0, -2.0), -0.5);
    }

    #[test]
    fn test_discharge_soc_limit_lands_on_empty() {
        // 0.1 stored, 0.5h interval, eta = 0.81: at most 0.1 * 0.9 / 0.5 = 0.18 deliverable
        let battery = Battery::new(1.0, 1.0, 0.81, 0.5);
        let p = battery.feasible_power(0.1, 0.5);
        assert_relative_eq!(p, 0.18, epsilon = 1e-12);
        assert_relative_eq!(battery.next_soc(0.1, p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_charge_soc_limit_lands_on_full() {
        // 0.1 headroom, 0.5h interval, half_eff 0.9: at most 0.1 / 0.5 / 0.9 absorbed
        let battery = Battery::new(1.0, 1.0, 0.81, 0.5);
        let p = battery.feasible_power(0.9, -0.5);
        assert_relative_eq!(p, -0.1 / 0.5 / 0.9, epsilon = 1e-12);
        assert_relative_eq!(battery.next_soc(0.9, p), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_efficiency_split_per_half_cycle() {
        let battery = Battery::new(10.0, 1.0, 0.81, 1.0);
        // Charge 1.0 for 1h stores 0.9
        assert_relative_eq!(battery.next_soc(5.0, -1.0), 5.9, epsilon = 1e-12);
        // Discharge 0.9 for 1h draws 1.0
        assert_relative_eq!(battery.next_soc(5.0, 0.9), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_capacity_passes_nothing() {
        let battery = Battery::new(0.0, 1.0, 0.9, 1.0 / 6.0);
        assert_eq!(battery.feasible_power(0.0, -0.9).abs(), 0.0);
        assert_eq!(battery.feasible_power(0.0, 0.9), 0.0);
        assert_eq!(battery.next_soc(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_complete_charge_discharge_cycle() {
        let battery = Battery::new(1.0, 0.25, 0.81, 1.0);
        let mut soc = 0.0;

        while soc < 1.0 - 1e-9 {
            let p = battery.feasible_power(soc, -0.25);
            soc = battery.next_soc(soc, p);
        }

        let mut energy_delivered = 0.0;
        while soc > 1e-9 {
            let p = battery.feasible_power(soc, 0.25);
            energy_delivered += p * battery.interval_hours();
            soc = battery.next_soc(soc, p);
        }

        // Full capacity back out at the discharge half-cycle efficiency
        assert_relative_eq!(energy_delivered, 0.9, epsilon = 1e-9);
    }
}
