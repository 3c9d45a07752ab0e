//! Wraparound-safe angle arithmetic in degrees.
//!
//! All angles are normalized into (-180, 180].

use nalgebra::Vector4;

use crate::common::Configuration;

/// Wrap an angle in degrees into (-180, 180]
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Signed shortest difference `a - b` per joint, each in (-180, 180]
pub fn angle_difference(a: &Configuration, b: &Configuration) -> Vector4<f64> {
    (a.angles() - b.angles()).map(normalize_angle)
}

/// `n` configurations from `from` to `to` (both included), moving every
/// joint along its shortest angular path
pub fn angle_linspace(from: &Configuration, to: &Configuration, n: usize) -> Vec<Configuration> {
    match n {
        0 => Vec::new(),
        1 => vec![*from],
        _ => {
            let delta = angle_difference(to, from);
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| Configuration::from_vector(from.angles() + delta * (i as f64 / last)))
                .collect()
        }
    }
}
