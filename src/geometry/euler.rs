//! Euler-angle conversions
//!
//! Yaw-pitch-roll (ZYX) angles for human-readable orientation I/O. Not used
//! inside the filter math; the manifold types carry quaternions.

use ::core::fmt;

use nalgebra::UnitQuaternion;

/// A ZYX yaw-pitch-roll orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    /// Rotation about the vertical axis
    pub yaw: f64,
    /// Rotation about the transverse axis
    pub pitch: f64,
    /// Rotation about the longitudinal axis
    pub roll: f64,
}

impl EulerAngles {
    /// Creates a new angle triple.
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }
}

impl fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Y: {} P: {} R: {}", self.yaw, self.pitch, self.roll)
    }
}

/// Extracts the ZYX Euler angles of a quaternion.
pub fn quaternion_to_euler(quat: &UnitQuaternion<f64>) -> EulerAngles {
    let (roll, pitch, yaw) = quat.euler_angles();
    EulerAngles { yaw, pitch, roll }
}

/// Builds the quaternion for a ZYX Euler angle triple.
pub fn euler_to_quaternion(angles: &EulerAngles) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(angles.roll, angles.pitch, angles.yaw)
}
