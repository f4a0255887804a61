//! Tunable solver and integration constants.
//!
//! No file format of its own — just a plain `Default`-derived struct with
//! sane defaults a consumer can override before constructing a
//! [`crate::World`].

/// Continuous collision detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CcdMode {
    /// No continuous collision detection; fast bodies may tunnel.
    None,
    /// Only bodies with [`crate::body::Body::bullet`] set are swept.
    BulletsOnly,
    /// Every dynamic body is swept against slower/static bodies.
    #[default]
    All,
}

/// All tunable constants for a [`crate::World`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Fixed step frequency used by `World::step_fixed`, in seconds.
    pub step_frequency: f64,
    /// Maximum translation a body may undergo in a single step, in meters.
    pub max_translation: f64,
    /// Maximum rotation a body may undergo in a single step, in radians.
    pub max_rotation: f64,
    /// Linear speed below which a body is a sleep candidate, in m/s.
    pub max_at_rest_linear_velocity: f64,
    /// Angular speed below which a body is a sleep candidate, in rad/s.
    pub max_at_rest_angular_velocity: f64,
    /// Time a body must stay under both at-rest thresholds before sleeping.
    pub min_at_rest_time: f64,
    /// Sequential-impulse velocity iterations per step.
    pub velocity_iterations: usize,
    /// Baumgarte position iterations per step.
    pub position_iterations: usize,
    /// Whether warm-starting is applied on the first velocity iteration.
    pub warm_starting_enabled: bool,
    /// Maximum distance a contact point may have moved and still be warm-started.
    pub max_warm_start_distance: f64,
    /// Minimum approach velocity for restitution to apply.
    pub restitution_velocity_threshold: f64,
    /// Linear tolerance used by the narrow phase and position solver.
    pub linear_tolerance: f64,
    /// Angular tolerance used by the narrow phase.
    pub angular_tolerance: f64,
    /// Maximum per-iteration positional correction.
    pub max_linear_correction: f64,
    /// Maximum per-iteration angular correction.
    pub max_angular_correction: f64,
    /// Baumgarte stabilization factor in `[0, 1]`.
    pub baumgarte: f64,
    /// Extra slop subtracted from penetration depth before correcting.
    pub linear_slop: f64,
    /// Fat-AABB expansion margin used by the broad-phase tree.
    pub broadphase_margin: f64,
    /// Continuous collision detection mode.
    pub ccd_mode: CcdMode,
    /// Maximum conservative-advancement iterations per CCD sweep.
    pub max_toi_iterations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_frequency: 1.0 / 60.0,
            max_translation: 2.0,
            max_rotation: std::f64::consts::FRAC_PI_2,
            max_at_rest_linear_velocity: 0.01,
            max_at_rest_angular_velocity: 2.0f64.to_radians(),
            min_at_rest_time: 0.5,
            velocity_iterations: 10,
            position_iterations: 10,
            warm_starting_enabled: true,
            max_warm_start_distance: 0.01,
            restitution_velocity_threshold: 1.0,
            linear_tolerance: 0.005,
            angular_tolerance: 2.0f64.to_radians(),
            max_linear_correction: 0.2,
            max_angular_correction: 8.0f64.to_radians(),
            baumgarte: 0.2,
            linear_slop: 0.005,
            broadphase_margin: 0.2,
            ccd_mode: CcdMode::All,
            max_toi_iterations: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.velocity_iterations, 10);
        assert_eq!(settings.position_iterations, 10);
        assert!((settings.step_frequency - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(settings.ccd_mode, CcdMode::All);
    }
}
