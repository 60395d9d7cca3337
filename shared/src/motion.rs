//! Dead-reckoning laws shared by server and clients.
//!
//! Every moving quantity is stored as a value at an origin time plus a rate,
//! and these functions evaluate it after an elapsed span. Nothing here keeps
//! state, so evaluating the same origin twice always gives the same answer.

use std::time::Duration;

/// Fuel units regained per second.
pub const FUEL_RECHARGE_RATE: f32 = 1.0 / 3.0;
pub const FUEL_MAX: f32 = 10.0;

/// Fuel level after `elapsed`, starting from `initial`. Saturates at [`FUEL_MAX`].
pub fn fuel(initial: f32, elapsed: Duration) -> f32 {
    let level = initial + FUEL_RECHARGE_RATE * elapsed.as_secs_f32();
    level.min(FUEL_MAX)
}

/// Span of recharge needed to climb from empty to `level`.
///
/// A fuel origin placed this far before "now" makes [`fuel`] evaluate to
/// `level` at "now".
pub fn fuel_recharge_span(level: f32) -> Duration {
    Duration::from_secs_f32(level.max(0.0) / FUEL_RECHARGE_RATE)
}

/// Cannon position and rate after `elapsed`.
///
/// The cannon bounces between 0 and 1. Only one wall is reflected per call;
/// a span long enough to cross both walls is not folded back again.
pub fn cannon_position(initial: f32, rate: f32, elapsed: Duration) -> (f32, f32) {
    let x = initial + rate * elapsed.as_secs_f32();
    if x < 0.0 {
        (-x, -rate)
    } else if x > 1.0 {
        (2.0 - x, -rate)
    } else {
        (x, rate)
    }
}

/// Missile travel progress after `elapsed`, capped at 1 (far edge).
pub fn missile_travel(initial: f32, speed: f32, elapsed: Duration) -> f32 {
    let progress = initial + speed * elapsed.as_secs_f32();
    progress.min(1.0)
}
