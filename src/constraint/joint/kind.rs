use crate::math::Vector2;
use crate::settings::Settings;

use super::JointBodyState;

/// An optional motor: drives the constrained axis toward `speed`, clamped
/// to `max_force` (or `max_torque` for angular axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    pub enabled: bool,
    pub speed: f64,
    pub max_force: f64,
}

impl Motor {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            speed: 0.0,
            max_force: 0.0,
        }
    }
}

impl Default for Motor {
    fn default() -> Self {
        Self::disabled()
    }
}

/// An optional translation/angle limit along a constrained axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub enabled: bool,
    pub lower: f64,
    pub upper: f64,
}

impl Limit {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            lower: 0.0,
            upper: 0.0,
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::disabled()
    }
}

/// The nine supported joint variants, each carrying its local
/// anchors/parameters plus accumulated impulses for warm-starting.
#[derive(Debug, Clone)]
pub enum JointKind {
    Distance {
        anchor_a: Vector2,
        anchor_b: Vector2,
        rest_length: f64,
        /// `Some` makes this a spring-damper instead of a rigid rod.
        spring: Option<SpringDamper>,
        accumulated_impulse: f64,
    },
    Revolute {
        anchor_a: Vector2,
        anchor_b: Vector2,
        motor: Motor,
        limit: Limit,
        reference_angle: f64,
        accumulated_linear_impulse: Vector2,
        accumulated_motor_impulse: f64,
    },
    Prismatic {
        anchor_a: Vector2,
        anchor_b: Vector2,
        axis: Vector2,
        motor: Motor,
        limit: Limit,
        accumulated_perp_impulse: f64,
        accumulated_angular_impulse: f64,
        accumulated_motor_impulse: f64,
    },
    Weld {
        anchor_a: Vector2,
        anchor_b: Vector2,
        reference_angle: f64,
        accumulated_linear_impulse: Vector2,
        accumulated_angular_impulse: f64,
    },
    Mouse {
        target: Vector2,
        local_anchor_b: Vector2,
        stiffness: f64,
        damping: f64,
        max_force: f64,
        accumulated_impulse: Vector2,
    },
    Pulley {
        ground_anchor_a: Vector2,
        ground_anchor_b: Vector2,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        ratio: f64,
        total_length: f64,
        accumulated_impulse: f64,
    },
    Rope {
        anchor_a: Vector2,
        anchor_b: Vector2,
        max_length: f64,
        accumulated_impulse: f64,
    },
    Wheel {
        anchor_a: Vector2,
        anchor_b: Vector2,
        axis: Vector2,
        motor: Motor,
        spring: Option<SpringDamper>,
        accumulated_perp_impulse: f64,
        accumulated_angular_impulse: f64,
        accumulated_motor_impulse: f64,
    },
    Friction {
        max_force: f64,
        max_torque: f64,
        accumulated_linear_impulse: Vector2,
        accumulated_angular_impulse: f64,
    },
}

/// Spring-damper parameters shared by the distance and wheel joints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDamper {
    pub stiffness: f64,
    pub damping: f64,
}

impl JointKind {
    pub fn distance(anchor_a: Vector2, anchor_b: Vector2, rest_length: f64) -> Self {
        Self::Distance {
            anchor_a,
            anchor_b,
            rest_length,
            spring: None,
            accumulated_impulse: 0.0,
        }
    }

    pub fn distance_spring(
        anchor_a: Vector2,
        anchor_b: Vector2,
        rest_length: f64,
        spring: SpringDamper,
    ) -> Self {
        Self::Distance {
            anchor_a,
            anchor_b,
            rest_length,
            spring: Some(spring),
            accumulated_impulse: 0.0,
        }
    }

    pub fn revolute(anchor_a: Vector2, anchor_b: Vector2, reference_angle: f64) -> Self {
        Self::Revolute {
            anchor_a,
            anchor_b,
            motor: Motor::disabled(),
            limit: Limit::disabled(),
            reference_angle,
            accumulated_linear_impulse: Vector2::ZERO,
            accumulated_motor_impulse: 0.0,
        }
    }

    pub fn prismatic(anchor_a: Vector2, anchor_b: Vector2, axis: Vector2) -> Self {
        Self::Prismatic {
            anchor_a,
            anchor_b,
            axis: axis.normalized(),
            motor: Motor::disabled(),
            limit: Limit::disabled(),
            accumulated_perp_impulse: 0.0,
            accumulated_angular_impulse: 0.0,
            accumulated_motor_impulse: 0.0,
        }
    }

    pub fn weld(anchor_a: Vector2, anchor_b: Vector2, reference_angle: f64) -> Self {
        Self::Weld {
            anchor_a,
            anchor_b,
            reference_angle,
            accumulated_linear_impulse: Vector2::ZERO,
            accumulated_angular_impulse: 0.0,
        }
    }

    pub fn mouse(local_anchor_b: Vector2, target: Vector2, stiffness: f64, damping: f64, max_force: f64) -> Self {
        Self::Mouse {
            target,
            local_anchor_b,
            stiffness,
            damping,
            max_force,
            accumulated_impulse: Vector2::ZERO,
        }
    }

    pub fn pulley(
        ground_anchor_a: Vector2,
        ground_anchor_b: Vector2,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        ratio: f64,
        total_length: f64,
    ) -> Self {
        Self::Pulley {
            ground_anchor_a,
            ground_anchor_b,
            local_anchor_a,
            local_anchor_b,
            ratio,
            total_length,
            accumulated_impulse: 0.0,
        }
    }

    pub fn rope(anchor_a: Vector2, anchor_b: Vector2, max_length: f64) -> Self {
        Self::Rope {
            anchor_a,
            anchor_b,
            max_length,
            accumulated_impulse: 0.0,
        }
    }

    pub fn wheel(anchor_a: Vector2, anchor_b: Vector2, axis: Vector2) -> Self {
        Self::Wheel {
            anchor_a,
            anchor_b,
            axis: axis.normalized(),
            motor: Motor::disabled(),
            spring: None,
            accumulated_perp_impulse: 0.0,
            accumulated_angular_impulse: 0.0,
            accumulated_motor_impulse: 0.0,
        }
    }

    pub fn friction(max_force: f64, max_torque: f64) -> Self {
        Self::Friction {
            max_force,
            max_torque,
            accumulated_linear_impulse: Vector2::ZERO,
            accumulated_angular_impulse: 0.0,
        }
    }

    /// Zero every accumulated impulse. Joints are not warm-started across
    /// steps the way contacts are: called once per joint at the start of a
    /// step's velocity solve so each step's iterations start from zero
    /// instead of compounding the previous step's clamped impulse.
    pub fn reset_impulses(&mut self) {
        match self {
            Self::Distance { accumulated_impulse, .. }
            | Self::Pulley { accumulated_impulse, .. }
            | Self::Rope { accumulated_impulse, .. } => *accumulated_impulse = 0.0,
            Self::Revolute {
                accumulated_linear_impulse,
                accumulated_motor_impulse,
                ..
            } => {
                *accumulated_linear_impulse = Vector2::ZERO;
                *accumulated_motor_impulse = 0.0;
            }
            Self::Prismatic {
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                ..
            }
            | Self::Wheel {
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                ..
            } => {
                *accumulated_perp_impulse = 0.0;
                *accumulated_angular_impulse = 0.0;
                *accumulated_motor_impulse = 0.0;
            }
            Self::Weld {
                accumulated_linear_impulse,
                accumulated_angular_impulse,
                ..
            }
            | Self::Friction {
                accumulated_linear_impulse,
                accumulated_angular_impulse,
                ..
            } => {
                *accumulated_linear_impulse = Vector2::ZERO;
                *accumulated_angular_impulse = 0.0;
            }
            Self::Mouse { accumulated_impulse, .. } => *accumulated_impulse = Vector2::ZERO,
        }
    }

    /// Run one velocity-iteration solve for this joint, mutating both
    /// bodies' velocities in place. Position error is folded in as a Baumgarte
    /// bias rather than solved in a separate position pass, since joints
    /// (unlike contacts) have no inequality constraints that need the
    /// position pass's non-penetration guarantee.
    pub fn solve_velocity(&mut self, a: &mut JointBodyState, b: &mut JointBodyState, dt: f64, settings: &Settings) {
        match self {
            Self::Distance {
                anchor_a,
                anchor_b,
                rest_length,
                spring,
                accumulated_impulse,
            } => solve_distance(
                a,
                b,
                *anchor_a,
                *anchor_b,
                *rest_length,
                *spring,
                accumulated_impulse,
                dt,
                settings,
            ),
            Self::Revolute {
                anchor_a,
                anchor_b,
                motor,
                accumulated_linear_impulse,
                accumulated_motor_impulse,
                ..
            } => solve_revolute(
                a,
                b,
                *anchor_a,
                *anchor_b,
                motor,
                accumulated_linear_impulse,
                accumulated_motor_impulse,
                dt,
                settings,
            ),
            Self::Prismatic {
                anchor_a,
                anchor_b,
                axis,
                motor,
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                ..
            } => solve_prismatic(
                a,
                b,
                *anchor_a,
                *anchor_b,
                *axis,
                motor,
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                dt,
                settings,
            ),
            Self::Weld {
                anchor_a,
                anchor_b,
                reference_angle,
                accumulated_linear_impulse,
                accumulated_angular_impulse,
            } => solve_weld(
                a,
                b,
                *anchor_a,
                *anchor_b,
                *reference_angle,
                accumulated_linear_impulse,
                accumulated_angular_impulse,
                dt,
                settings,
            ),
            Self::Mouse {
                target,
                local_anchor_b,
                stiffness,
                damping,
                max_force,
                accumulated_impulse,
            } => solve_mouse(
                b,
                *target,
                *local_anchor_b,
                *stiffness,
                *damping,
                *max_force,
                accumulated_impulse,
                dt,
            ),
            Self::Pulley {
                ground_anchor_a,
                ground_anchor_b,
                local_anchor_a,
                local_anchor_b,
                ratio,
                total_length,
                accumulated_impulse,
            } => solve_pulley(
                a,
                b,
                *ground_anchor_a,
                *ground_anchor_b,
                *local_anchor_a,
                *local_anchor_b,
                *ratio,
                *total_length,
                accumulated_impulse,
                dt,
                settings,
            ),
            Self::Rope {
                anchor_a,
                anchor_b,
                max_length,
                accumulated_impulse,
            } => solve_rope(a, b, *anchor_a, *anchor_b, *max_length, accumulated_impulse, settings),
            Self::Wheel {
                anchor_a,
                anchor_b,
                axis,
                motor,
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                ..
            } => solve_prismatic(
                a,
                b,
                *anchor_a,
                *anchor_b,
                *axis,
                motor,
                accumulated_perp_impulse,
                accumulated_angular_impulse,
                accumulated_motor_impulse,
                dt,
                settings,
            ),
            Self::Friction {
                max_force,
                max_torque,
                accumulated_linear_impulse,
                accumulated_angular_impulse,
            } => solve_friction(
                a,
                b,
                *max_force,
                *max_torque,
                accumulated_linear_impulse,
                accumulated_angular_impulse,
                dt,
            ),
        }
    }
}

fn world_anchor(state: &JointBodyState, local_anchor: Vector2) -> Vector2 {
    // Anchors are tracked relative to the body's center of mass here; the
    // solver hands in that relationship via the body state's velocity Jacobian,
    // so the "world anchor" used for the constraint is simply the center
    // offset by the already-rotated local anchor, which the caller supplies
    // pre-rotated (see `crate::solver::velocity`).
    state.center + local_anchor
}

fn point_velocity(state: &JointBodyState, r: Vector2) -> Vector2 {
    state.linear_velocity + Vector2::cross_scalar(state.angular_velocity, r)
}

fn apply_point_impulse(state: &mut JointBodyState, r: Vector2, impulse: Vector2) {
    state.linear_velocity = state.linear_velocity + impulse * state.inv_mass;
    state.angular_velocity += state.inv_inertia * r.cross(impulse);
}

#[allow(clippy::too_many_arguments)]
fn solve_distance(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    anchor_a: Vector2,
    anchor_b: Vector2,
    rest_length: f64,
    spring: Option<SpringDamper>,
    accumulated_impulse: &mut f64,
    dt: f64,
    settings: &Settings,
) {
    let world_a = world_anchor(a, anchor_a);
    let world_b = world_anchor(b, anchor_b);
    let delta = world_b - world_a;
    let length = delta.length();
    if length < f64::EPSILON {
        return;
    }
    let axis = delta * (1.0 / length);

    let r_a = world_a - a.center;
    let r_b = world_b - b.center;

    let k = a.inv_mass + b.inv_mass + a.inv_inertia * r_a.cross(axis).powi(2) + b.inv_inertia * r_b.cross(axis).powi(2);
    if k <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k;

    let relative_velocity = point_velocity(b, r_b) - point_velocity(a, r_a);
    let speed_along_axis = relative_velocity.dot(axis);
    let position_error = length - rest_length;

    // A spring softens the bias term by stiffness and adds velocity-proportional
    // damping instead of driving fully back to rest length every step.
    let (bias, damping_factor) = match spring {
        Some(spring) => (position_error * spring.stiffness * dt, (spring.damping * dt).min(1.0)),
        None => (settings.baumgarte * position_error / dt, 1.0),
    };

    let impulse_magnitude = -effective_mass * (speed_along_axis + bias) * damping_factor;
    *accumulated_impulse += impulse_magnitude;

    let impulse = axis * impulse_magnitude;
    apply_point_impulse(a, r_a, -impulse);
    apply_point_impulse(b, r_b, impulse);
}

#[allow(clippy::too_many_arguments)]
fn solve_revolute(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    anchor_a: Vector2,
    anchor_b: Vector2,
    motor: &mut Motor,
    accumulated_linear_impulse: &mut Vector2,
    accumulated_motor_impulse: &mut f64,
    dt: f64,
    settings: &Settings,
) {
    if motor.enabled {
        let k = a.inv_inertia + b.inv_inertia;
        if k > f64::EPSILON {
            let relative_angular = b.angular_velocity - a.angular_velocity;
            let motor_impulse = -(relative_angular - motor.speed) / k;
            let max_impulse = motor.max_force * dt;
            let old = *accumulated_motor_impulse;
            *accumulated_motor_impulse = (old + motor_impulse).clamp(-max_impulse, max_impulse);
            let applied = *accumulated_motor_impulse - old;
            a.angular_velocity -= a.inv_inertia * applied;
            b.angular_velocity += b.inv_inertia * applied;
        }
    }

    let world_a = world_anchor(a, anchor_a);
    let world_b = world_anchor(b, anchor_b);
    let r_a = world_a - a.center;
    let r_b = world_b - b.center;

    let k_diag = a.inv_mass + b.inv_mass;
    if k_diag <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k_diag;

    let relative_velocity = point_velocity(b, r_b) - point_velocity(a, r_a);
    let position_error = world_b - world_a;
    let bias = position_error * (settings.baumgarte / dt);

    let impulse = (relative_velocity + bias) * -effective_mass;
    *accumulated_linear_impulse += impulse;

    apply_point_impulse(a, r_a, -impulse);
    apply_point_impulse(b, r_b, impulse);
}

#[allow(clippy::too_many_arguments)]
fn solve_prismatic(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    anchor_a: Vector2,
    anchor_b: Vector2,
    axis: Vector2,
    motor: &mut Motor,
    accumulated_perp_impulse: &mut f64,
    _accumulated_angular_impulse: &mut f64,
    accumulated_motor_impulse: &mut f64,
    dt: f64,
    settings: &Settings,
) {
    let world_a = world_anchor(a, anchor_a);
    let world_b = world_anchor(b, anchor_b);
    let r_a = world_a - a.center;
    let r_b = world_b - b.center;
    let perp = axis.perp();

    if motor.enabled {
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * r_a.cross(axis).powi(2) + b.inv_inertia * r_b.cross(axis).powi(2);
        if k > f64::EPSILON {
            let relative_velocity = (point_velocity(b, r_b) - point_velocity(a, r_a)).dot(axis);
            let motor_impulse = (motor.speed - relative_velocity) / k;
            let max_impulse = motor.max_force * dt;
            let old = *accumulated_motor_impulse;
            *accumulated_motor_impulse = (old + motor_impulse).clamp(-max_impulse, max_impulse);
            let applied = *accumulated_motor_impulse - old;
            let impulse = axis * applied;
            apply_point_impulse(a, r_a, -impulse);
            apply_point_impulse(b, r_b, impulse);
        }
    }

    // Constrain perpendicular translation and relative rotation to zero,
    // keeping motion along `axis` free.
    let k_perp = a.inv_mass + b.inv_mass + a.inv_inertia * r_a.cross(perp).powi(2) + b.inv_inertia * r_b.cross(perp).powi(2);
    if k_perp <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k_perp;
    let relative_velocity = (point_velocity(b, r_b) - point_velocity(a, r_a)).dot(perp);
    let position_error = (world_b - world_a).dot(perp);
    let bias = settings.baumgarte * position_error / dt;

    let impulse_magnitude = -effective_mass * (relative_velocity + bias);
    *accumulated_perp_impulse += impulse_magnitude;
    let impulse = perp * impulse_magnitude;
    apply_point_impulse(a, r_a, -impulse);
    apply_point_impulse(b, r_b, impulse);
}

#[allow(clippy::too_many_arguments)]
fn solve_weld(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    anchor_a: Vector2,
    anchor_b: Vector2,
    _reference_angle: f64,
    accumulated_linear_impulse: &mut Vector2,
    accumulated_angular_impulse: &mut f64,
    dt: f64,
    settings: &Settings,
) {
    let k_angular = a.inv_inertia + b.inv_inertia;
    if k_angular > f64::EPSILON {
        let relative_angular = b.angular_velocity - a.angular_velocity;
        let impulse = -relative_angular / k_angular;
        *accumulated_angular_impulse += impulse;
        a.angular_velocity -= a.inv_inertia * impulse;
        b.angular_velocity += b.inv_inertia * impulse;
    }

    let world_a = world_anchor(a, anchor_a);
    let world_b = world_anchor(b, anchor_b);
    let r_a = world_a - a.center;
    let r_b = world_b - b.center;

    let k_diag = a.inv_mass + b.inv_mass;
    if k_diag <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k_diag;
    let relative_velocity = point_velocity(b, r_b) - point_velocity(a, r_a);
    let bias = (world_b - world_a) * (settings.baumgarte / dt);

    let impulse = (relative_velocity + bias) * -effective_mass;
    *accumulated_linear_impulse += impulse;
    apply_point_impulse(a, r_a, -impulse);
    apply_point_impulse(b, r_b, impulse);
}

fn solve_mouse(
    b: &mut JointBodyState,
    target: Vector2,
    local_anchor_b: Vector2,
    stiffness: f64,
    damping: f64,
    max_force: f64,
    accumulated_impulse: &mut Vector2,
    dt: f64,
) {
    let world_b = world_anchor(b, local_anchor_b);
    let r_b = world_b - b.center;

    if b.inv_mass <= f64::EPSILON {
        return;
    }

    let position_error = world_b - target;
    let relative_velocity = point_velocity(b, r_b);
    let spring_force = position_error * -stiffness;
    let damping_force = relative_velocity * -damping;

    let desired_impulse = (spring_force + damping_force) * dt;
    let max_impulse = max_force * dt;
    let old = *accumulated_impulse;
    let candidate = old + desired_impulse;
    let clamped_len = candidate.length().min(max_impulse);
    let new_impulse = if candidate.length() > f64::EPSILON {
        candidate * (clamped_len / candidate.length())
    } else {
        Vector2::ZERO
    };
    *accumulated_impulse = new_impulse;
    let applied = new_impulse - old;
    apply_point_impulse(b, r_b, applied);
}

#[allow(clippy::too_many_arguments)]
fn solve_pulley(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    ground_anchor_a: Vector2,
    ground_anchor_b: Vector2,
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,
    ratio: f64,
    total_length: f64,
    accumulated_impulse: &mut f64,
    dt: f64,
    settings: &Settings,
) {
    let world_a = world_anchor(a, local_anchor_a);
    let world_b = world_anchor(b, local_anchor_b);

    let dir_a = (ground_anchor_a - world_a).normalized();
    let dir_b = (ground_anchor_b - world_b).normalized();

    let r_a = world_a - a.center;
    let r_b = world_b - b.center;

    let k = a.inv_mass + a.inv_inertia * r_a.cross(dir_a).powi(2)
        + ratio * ratio * (b.inv_mass + b.inv_inertia * r_b.cross(dir_b).powi(2));
    if k <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k;

    let length_a = ground_anchor_a.distance(world_a);
    let length_b = ground_anchor_b.distance(world_b);
    let current_total = length_a + ratio * length_b;
    let position_error = current_total - total_length;

    let velocity_a = point_velocity(a, r_a).dot(dir_a);
    let velocity_b = point_velocity(b, r_b).dot(dir_b);
    let constraint_speed = velocity_a + ratio * velocity_b;

    let bias = settings.baumgarte * position_error.max(0.0) / dt;
    let impulse_magnitude = -effective_mass * (constraint_speed + bias);
    let old = *accumulated_impulse;
    *accumulated_impulse = (old + impulse_magnitude).max(0.0);
    let applied = *accumulated_impulse - old;

    apply_point_impulse(a, r_a, dir_a * applied);
    apply_point_impulse(b, r_b, dir_b * (applied * ratio));
}

fn solve_rope(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    anchor_a: Vector2,
    anchor_b: Vector2,
    max_length: f64,
    accumulated_impulse: &mut f64,
    settings: &Settings,
) {
    let world_a = world_anchor(a, anchor_a);
    let world_b = world_anchor(b, anchor_b);
    let delta = world_b - world_a;
    let length = delta.length();

    // Slack rope: inequality constraint only bites when stretched taut.
    if length <= max_length && *accumulated_impulse <= 0.0 {
        *accumulated_impulse = 0.0;
        return;
    }
    if length < f64::EPSILON {
        return;
    }
    let axis = delta * (1.0 / length);
    let r_a = world_a - a.center;
    let r_b = world_b - b.center;

    let k = a.inv_mass + b.inv_mass + a.inv_inertia * r_a.cross(axis).powi(2) + b.inv_inertia * r_b.cross(axis).powi(2);
    if k <= f64::EPSILON {
        return;
    }
    let effective_mass = 1.0 / k;

    let relative_velocity = (point_velocity(b, r_b) - point_velocity(a, r_a)).dot(axis);
    let position_error = (length - max_length).max(0.0);
    let bias = settings.baumgarte * position_error;

    let old = *accumulated_impulse;
    let impulse_magnitude = (-effective_mass * (relative_velocity + bias)).min(0.0);
    *accumulated_impulse = (old + impulse_magnitude).min(0.0);
    let applied = *accumulated_impulse - old;

    let impulse = axis * applied;
    apply_point_impulse(a, r_a, impulse);
    apply_point_impulse(b, r_b, -impulse);
}

fn solve_friction(
    a: &mut JointBodyState,
    b: &mut JointBodyState,
    max_force: f64,
    max_torque: f64,
    accumulated_linear_impulse: &mut Vector2,
    accumulated_angular_impulse: &mut f64,
    dt: f64,
) {
    let k_linear = a.inv_mass + b.inv_mass;
    if k_linear > f64::EPSILON {
        let relative_velocity = b.linear_velocity - a.linear_velocity;
        let impulse = relative_velocity * (-1.0 / k_linear);
        let max_impulse = max_force * dt;
        let old = *accumulated_linear_impulse;
        let candidate = old + impulse;
        let clamped = if candidate.length() > max_impulse {
            candidate * (max_impulse / candidate.length())
        } else {
            candidate
        };
        *accumulated_linear_impulse = clamped;
        let applied = clamped - old;
        a.linear_velocity = a.linear_velocity - applied * a.inv_mass;
        b.linear_velocity = b.linear_velocity + applied * b.inv_mass;
    }

    let k_angular = a.inv_inertia + b.inv_inertia;
    if k_angular > f64::EPSILON {
        let relative_angular = b.angular_velocity - a.angular_velocity;
        let impulse = -relative_angular / k_angular;
        let max_impulse = max_torque * dt;
        let old = *accumulated_angular_impulse;
        *accumulated_angular_impulse = (old + impulse).clamp(-max_impulse, max_impulse);
        let applied = *accumulated_angular_impulse - old;
        a.angular_velocity -= a.inv_inertia * applied;
        b.angular_velocity += b.inv_inertia * applied;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_state(center: Vector2) -> JointBodyState {
        JointBodyState {
            center,
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_inertia: 1.0,
        }
    }

    #[test]
    fn distance_joint_pulls_bodies_toward_rest_length() {
        let mut a = dynamic_state(Vector2::ZERO);
        a.inv_mass = 0.0;
        a.inv_inertia = 0.0;
        let mut b = dynamic_state(Vector2::new(2.0, 0.0));
        b.linear_velocity = Vector2::new(1.0, 0.0);

        let mut kind = JointKind::distance(Vector2::ZERO, Vector2::ZERO, 1.0);
        let settings = Settings::default();
        for _ in 0..20 {
            kind.solve_velocity(&mut a, &mut b, 1.0 / 60.0, &settings);
        }

        assert!(b.linear_velocity.x() < 1.0);
    }

    #[test]
    fn friction_joint_equalizes_linear_velocity() {
        let mut a = dynamic_state(Vector2::ZERO);
        let mut b = dynamic_state(Vector2::new(1.0, 0.0));
        b.linear_velocity = Vector2::new(2.0, 0.0);

        let mut kind = JointKind::friction(1000.0, 1000.0);
        for _ in 0..10 {
            kind.solve_velocity(&mut a, &mut b, 1.0 / 60.0, &Settings::default());
        }

        assert!((a.linear_velocity.x() - b.linear_velocity.x()).abs() < 0.2);
    }
}
