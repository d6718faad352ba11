//! Node transformations.
//!
//! A [`Transform`] is the translation/rotation/scale of one scene node relative
//! to its parent. The scene graph composes the matrices of all ancestors to get
//! a node's world matrix.

use cgmath::One;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build from a glTF-style decomposition: translation, rotation as `[x, y, z, w]`, scale.
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        let [x, y, z, w] = rotation;
        Self {
            position: translation.into(),
            rotation: cgmath::Quaternion::new(w, x, y, z),
            scale: scale.into(),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<cgmath::Vector3<f32>> for Transform {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}
