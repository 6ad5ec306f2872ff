use std::path::PathBuf;

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub asset_path: PathBuf,

    pub window_title: String,
    pub window_size: (f64, f64),

    pub camera_position: Vec3,
    pub camera_fov_y_degrees: f32,

    pub ambient_intensity: f32,
    pub spot_light_position: Vec3,

    /// Un-exploded position of the product group.
    pub base_position: Vec3,
    /// World position the product details card is pinned to.
    pub details_anchor: Vec3,

    /// Radians per dragged pixel.
    pub drag_rotation_speed: f32,

    /// Paint the model with the selected swatch instead of its own material colour.
    pub tint_model_with_active_color: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("assets/3d/duck.glb"),
            window_title: String::from("Product Showcase"),
            window_size: (1280.0, 800.0),
            camera_position: Vec3::new(0.0, 0.0, 5.0),
            camera_fov_y_degrees: 50.0,
            ambient_intensity: 0.5,
            spot_light_position: Vec3::new(10.0, 10.0, 10.0),
            base_position: Vec3::ZERO,
            details_anchor: Vec3::new(1.5, 0.0, 0.0),
            drag_rotation_speed: 0.005,
            tint_model_with_active_color: false,
        }
    }
}

impl ViewerConfig {
    /// Applies command line overrides. The only one is an optional asset path.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = args.next() {
            config.asset_path = PathBuf::from(path);
        }

        config
    }
}
