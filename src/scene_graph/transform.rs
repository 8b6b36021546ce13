use glam::{Mat4, Quat, Vec3};
use std::cell::Cell;

#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Cell<Option<Mat4>>,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local_matrix: Cell::new(None),
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        if let Some(matrix) = self.local_matrix.get() {
            return matrix;
        }

        let matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.local_matrix.set(Some(matrix));
        matrix
    }

    fn invalidate(&self) {
        self.local_matrix.set(None);
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.invalidate();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(Vec3::ZERO)
    }
}
