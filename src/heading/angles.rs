//! Angle math on compass degrees (0-360, clockwise).
//!
//! Everything here is pure and total over finite inputs. The two range
//! conventions in play: headings live in [0,360), bearing errors in
//! (-180,180].

/// Reduce any finite angle in degrees to [0,360).
pub fn normalize_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Signed shortest-path error from `current` to `target`, in (-180, 180].
///
/// Positive means the target lies clockwise of the current heading (turn
/// right), negative counter-clockwise. 360-periodic in both arguments.
pub fn bearing_error(target_deg: f32, current_deg: f32) -> f32 {
    let error = (target_deg - current_deg).rem_euclid(360.0);
    if error > 180.0 { error - 360.0 } else { error }
}

/// Compass heading from a calibrated horizontal magnetometer vector.
///
/// Rounded to a whole degree; the sensor noise floor is well above 1 degree
/// so the rounding costs nothing and keeps the filter window integral.
pub fn heading_from_mag(mag_x: f32, mag_y: f32) -> f32 {
    mag_y.atan2(mag_x).to_degrees().round().rem_euclid(360.0)
}
