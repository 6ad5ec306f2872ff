use std::f32::consts::FRAC_PI_4;

use glam::{EulerRot, Quat, Vec2};

/// Drag-to-rotate for the product group. Rotation is limited to a cone in front of
/// the camera so the product can be inspected but never turned away.
#[derive(Debug, Clone)]
pub struct PresentationControls {
    /// x = polar (about X), y = azimuth (about Y), radians.
    rotation: Vec2,
    polar_limits: (f32, f32),
    azimuth_limits: (f32, f32),
    speed: f32,
    dragging: bool,
}

impl PresentationControls {
    pub fn new(speed: f32) -> Self {
        Self {
            rotation: Vec2::ZERO,
            polar_limits: (-FRAC_PI_4, FRAC_PI_4),
            azimuth_limits: (-FRAC_PI_4, FRAC_PI_4),
            speed,
            dragging: false,
        }
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    #[allow(dead_code)]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// `delta` is the pointer movement in pixels since the last event.
    pub fn drag(&mut self, delta: Vec2) {
        if !self.dragging {
            return;
        }

        // Horizontal movement turns around Y, vertical movement tilts around X
        let polar = self.rotation.x + delta.y * self.speed;
        let azimuth = self.rotation.y + delta.x * self.speed;

        self.rotation = Vec2::new(
            polar.clamp(self.polar_limits.0, self.polar_limits.1),
            azimuth.clamp(self.azimuth_limits.0, self.azimuth_limits.1),
        );
    }

    #[allow(dead_code)]
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_movement_without_drag() {
        let mut controls = PresentationControls::new(0.01);

        controls.drag(Vec2::new(40.0, 20.0));

        assert_eq!(controls.rotation(), Vec2::ZERO);
    }

    #[test]
    fn drag_rotates_by_speed() {
        let mut controls = PresentationControls::new(0.01);

        controls.begin_drag();
        controls.drag(Vec2::new(10.0, -20.0));

        assert!(controls.rotation().abs_diff_eq(Vec2::new(-0.2, 0.1), 1e-6));
    }

    #[test]
    fn rotation_stays_within_quarter_turn() {
        let mut controls = PresentationControls::new(0.01);

        controls.begin_drag();
        for _ in 0..100 {
            controls.drag(Vec2::new(500.0, -500.0));
        }

        assert_eq!(controls.rotation(), Vec2::new(-FRAC_PI_4, FRAC_PI_4));

        controls.drag(Vec2::new(-5000.0, 5000.0));
        assert_eq!(controls.rotation(), Vec2::new(FRAC_PI_4, -FRAC_PI_4));
    }

    #[test]
    fn end_drag_stops_rotation() {
        let mut controls = PresentationControls::new(0.01);

        controls.begin_drag();
        controls.drag(Vec2::new(10.0, 0.0));
        controls.end_drag();
        controls.drag(Vec2::new(10.0, 0.0));

        assert!((controls.rotation().y - 0.1).abs() < 1e-6);
        assert!(!controls.is_dragging());
    }

    #[test]
    fn zero_rotation_is_identity() {
        let controls = PresentationControls::new(0.01);

        assert!(controls.rotation_quat().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
