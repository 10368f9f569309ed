//! Cubic ease-in-out curve.
//!
//! The curve is flat near 0 and 1 and steep around 0.5, so small changes in
//! an already quiet or already saturated keyword don't make the output jitter.

/// Map a ratio in `[0, 1]` onto the cubic ease-in-out curve.
///
/// Input is not clamped; callers are expected to pass a value in range.
pub fn ease_in_out_cubic(x: f64) -> f64 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        let t = 2.0 * x - 2.0;
        (x - 1.0) * t * t + 1.0
    }
}
