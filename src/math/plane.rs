use glam::Vec3;

/// Half-space `normal · p + constant >= 0`, the convention clip slots expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vec3::NEG_Y, 0.0)
    }
}
