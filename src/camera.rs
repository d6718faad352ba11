//! Camera, projection and viewport.
//!
//! The picker only needs a snapshot of these: where the eye is, how the
//! frustum is shaped, and how large the canvas is. Orbit/damping behaviour is
//! owned by whatever drives the camera and is not modelled here.

use cgmath::{InnerSpace, Rad};

/// Canvas size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: cgmath::Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<cgmath::Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> cgmath::Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        cgmath::Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    /// World to view matrix.
    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_to_rh(self.position, self.forward(), cgmath::Vector3::unit_y())
    }
}

impl Default for Camera {
    /// Slightly in front of the origin looking down -Z, as the living room preset expects.
    fn default() -> Self {
        Self::new((0.0, 0.0, 1.0), cgmath::Deg(-90.0), cgmath::Deg(0.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// View to clip matrix with OpenGL depth (`[-1, 1]`), which is what unprojection expects.
    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(1280, 720, cgmath::Deg(75.0), 0.1, 1000.0)
    }
}
