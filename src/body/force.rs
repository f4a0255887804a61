use crate::math::Vector2;

/// A force or torque that expires on its own, so "apply this push for the
/// next half second" doesn't need a caller to remember to cancel it.
///
/// A body holds a list of these instead of one persistent accumulator, so
/// multiple pushes can be layered and expire independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedForce<T> {
    pub value: T,
    /// Seconds remaining before this entry is dropped. `f64::INFINITY` for
    /// a force that lasts until explicitly cleared or consumed.
    pub remaining_life: f64,
}

impl<T> TimedForce<T> {
    pub fn new(value: T, remaining_life: f64) -> Self {
        Self {
            value,
            remaining_life,
        }
    }
}

/// Accumulated forces and torques for one body, each entry auto-expiring.
#[derive(Debug, Clone, Default)]
pub struct ForceAccumulator {
    forces: Vec<TimedForce<Vector2>>,
    torques: Vec<TimedForce<f64>>,
}

impl ForceAccumulator {
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty() && self.torques.is_empty()
    }

    pub fn push_force(&mut self, force: Vector2, remaining_life: f64) {
        self.forces.push(TimedForce::new(force, remaining_life));
    }

    pub fn push_torque(&mut self, torque: f64, remaining_life: f64) {
        self.torques.push(TimedForce::new(torque, remaining_life));
    }

    pub fn clear(&mut self) {
        self.forces.clear();
        self.torques.clear();
    }

    /// Sum of all currently live forces.
    pub fn net_force(&self) -> Vector2 {
        self.forces
            .iter()
            .fold(Vector2::ZERO, |acc, f| acc + f.value)
    }

    /// Sum of all currently live torques.
    pub fn net_torque(&self) -> f64 {
        self.torques.iter().fold(0.0, |acc, t| acc + t.value)
    }

    /// Age every entry by `dt` and drop any whose life has expired.
    pub fn advance(&mut self, dt: f64) {
        for force in &mut self.forces {
            force.remaining_life -= dt;
        }
        for torque in &mut self.torques {
            torque.remaining_life -= dt;
        }
        self.forces.retain(|f| f.remaining_life > 0.0);
        self.torques.retain(|t| t.remaining_life > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_force_is_dropped_after_advance() {
        let mut acc = ForceAccumulator::default();
        acc.push_force(Vector2::new(1.0, 0.0), 0.5);
        acc.advance(0.6);
        assert!(acc.is_empty());
        assert_eq!(acc.net_force(), Vector2::ZERO);
    }

    #[test]
    fn infinite_life_force_survives_many_advances() {
        let mut acc = ForceAccumulator::default();
        acc.push_force(Vector2::new(0.0, -9.8), f64::INFINITY);
        for _ in 0..1000 {
            acc.advance(1.0 / 60.0);
        }
        assert!(!acc.is_empty());
    }
}
