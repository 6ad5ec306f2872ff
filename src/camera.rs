use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
}

impl Camera {
    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    pub fn looking_at_origin(eye: Vec3, fov_y_degrees: f32) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees,
        }
    }

    pub fn get_vp_matrix(&self, resolution: Vec2) -> Mat4 {
        let aspect = if resolution.y > 0.0 {
            resolution.x / resolution.y
        } else {
            1.0
        };

        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let projection =
            Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, Self::NEAR, Self::FAR);
        projection * view
    }

    /// Projects a world position to window coordinates with the origin at the top left.
    /// Returns `None` for points behind the camera.
    pub fn world_to_screen(&self, point: Vec3, resolution: Vec2) -> Option<Vec2> {
        let clip = self.get_vp_matrix(resolution) * point.extend(1.0);

        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip.truncate() / clip.w;

        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * resolution.x,
            (1.0 - ndc.y) * 0.5 * resolution.y,
        ))
    }
}
