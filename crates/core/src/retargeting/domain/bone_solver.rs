use std::f64::consts::PI;

use nalgebra::{Unit, UnitQuaternion, UnitVector3, Vector3};

const SLERP_EPSILON: f64 = 1e-6;

/// Smallest rotation taking `from` onto `to`.
///
/// Opposite vectors have no unique shortest arc; a half turn about an axis
/// orthogonal to `from` is used.
pub fn shortest_arc(from: &UnitVector3<f64>, to: &UnitVector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between_axis(from, to)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&orthogonal_axis(from), PI))
}

fn orthogonal_axis(v: &UnitVector3<f64>) -> UnitVector3<f64> {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    Unit::new_normalize(v.cross(&helper))
}

/// Spherical blend from `prior` toward `next`; `weight` 1.0 returns `next`.
pub fn blend(prior: &UnitQuaternion<f64>, next: &UnitQuaternion<f64>, weight: f64) -> UnitQuaternion<f64> {
    prior
        .try_slerp(next, weight, SLERP_EPSILON)
        .unwrap_or_else(|| prior.nlerp(next, weight))
}
