//! Fixed perspective camera and click-ray generation.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Mat4, Vec2, Vec3};
use orrery_sim::Ray;

/// Camera data shared by every pipeline at group 0, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// World-space camera right, for billboard expansion. `w` unused.
    pub right: [f32; 4],
    /// World-space camera up. `w` unused.
    pub up: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CameraUniform>(), 96);

/// A camera looking at a fixed target with a reverse-Z perspective projection.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 80.0, 80.0),
            target: Vec3::ZERO,
            fov_y: 50f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl Camera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Reverse-Z: near maps to depth 1, far to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio after a resize. Ignores zero heights.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            right: self.right().extend(0.0).to_array(),
            up: self.up().extend(0.0).to_array(),
        }
    }

    /// Pixel position (origin top-left) to normalized device coordinates.
    pub fn cursor_to_ndc(cursor: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            cursor.x / viewport.x * 2.0 - 1.0,
            1.0 - cursor.y / viewport.y * 2.0,
        )
    }

    /// World-space click ray from the camera through `ndc`.
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect_ratio;
        let direction = self.forward()
            + self.right() * ndc.x * half_width
            + self.up() * ndc.y * half_height;
        Ray::new(self.position.as_dvec3(), direction.as_dvec3())
    }

    /// World-space click ray through a cursor position in pixels.
    pub fn ray_through_cursor(&self, cursor: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        self.ray_through_ndc(Self::cursor_to_ndc(cursor, viewport))
    }

    /// Project a world point to NDC, `None` if behind the camera.
    pub fn project(&self, world: DVec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * world.as_vec3().extend(1.0);
        (clip.w > 0.0).then(|| Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}
