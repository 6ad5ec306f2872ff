use anyhow::Context;
use glam::Vec3;

use crate::{
    camera::Camera,
    config::ViewerConfig,
    model::Model,
    presentation_controls::PresentationControls,
    product::{ProductDetails, RUBBER_DUCK},
    scene_graph::{Object3D, ObjectId, Scene, SceneModel, Transform},
    viewer_state::{explode, ColorKey, ViewerStateController},
};

/// A top-level node of the product model and where it sits when not exploded.
pub struct Part {
    pub object: ObjectId,
    pub base_transform: Transform,
}

pub struct ShowcaseState {
    pub config: ViewerConfig,
    pub camera: Camera,
    pub start_time: std::time::Instant,
    pub controller: ViewerStateController,
    pub controls: PresentationControls,
    pub product: &'static ProductDetails,
    pub scene: Scene,
    product_root: ObjectId,
    parts: Vec<Part>,
}

impl ShowcaseState {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        let product_root = scene.add_object(Object3D::named("Product"));

        load_product_scene(&mut scene, product_root, &config)?;

        Ok(Self::from_scene(config, scene, product_root))
    }

    pub fn from_scene(config: ViewerConfig, scene: Scene, product_root: ObjectId) -> Self {
        let camera = Camera::looking_at_origin(config.camera_position, config.camera_fov_y_degrees);
        let controls = PresentationControls::new(config.drag_rotation_speed);

        let parts = scene
            .get_object(product_root)
            .map(|root| {
                root.child_ids
                    .iter()
                    .filter_map(|&id| {
                        scene.get_object(id).map(|object| Part {
                            object: id,
                            base_transform: object.transform,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut state = Self {
            config,
            camera,
            start_time: std::time::Instant::now(),
            controller: ViewerStateController::new(),
            controls,
            product: &RUBBER_DUCK,
            scene,
            product_root,
            parts,
        };

        state.update();
        state
    }

    #[allow(dead_code)]
    pub fn product_root(&self) -> ObjectId {
        self.product_root
    }

    #[allow(dead_code)]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Colour the renderer should paint the model with, if any.
    pub fn tint(&self) -> Option<[f32; 4]> {
        self.config
            .tint_model_with_active_color
            .then(|| self.controller.active_color().linear_rgba())
    }

    /// Pushes the derived viewer transform into the scene graph.
    pub fn update(&mut self) {
        let params = self.controller.transform(self.config.base_position);
        let rotation = self.controls.rotation_quat() * params.rotation_quat();

        self.scene.set_object_transform(
            self.product_root,
            Transform::new(params.position, rotation, params.scale),
        );

        let exploded = self.controller.exploded();
        for part in &self.parts {
            let transform = Transform {
                translation: explode(part.base_transform.translation, exploded),
                ..part.base_transform
            };
            self.scene.set_object_transform(part.object, transform);
        }
    }
}

fn load_product_scene(
    scene: &mut Scene,
    product_root: ObjectId,
    config: &ViewerConfig,
) -> anyhow::Result<()> {
    let path = &config.asset_path;

    if !path.exists() {
        log::warn!(
            "Product asset {} not found, showing a placeholder",
            path.display()
        );
        spawn_placeholder(scene, product_root);
        return Ok(());
    }

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to import {}", path.display()))?;
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in gltf")?;

    let parts = scene.spawn_gltf_scene(&buffers, &gltf_scene, Some(product_root))?;

    log::info!(
        "Loaded {} with {} parts and {} models",
        path.display(),
        parts.len(),
        scene.models.len()
    );

    Ok(())
}

fn spawn_placeholder(scene: &mut Scene, product_root: ObjectId) {
    let body = scene.add_model(SceneModel::new(Model::placeholder_cube(
        "Placeholder body",
        0.5,
        ColorKey::Yellow.linear_rgba(),
    )));
    let head = scene.add_model(SceneModel::new(Model::placeholder_cube(
        "Placeholder head",
        0.3,
        ColorKey::Yellow.linear_rgba(),
    )));

    for (name, model_id, translation) in [
        ("Body", body, Vec3::new(0.0, -0.25, 0.0)),
        ("Head", head, Vec3::new(0.4, 0.6, 0.0)),
    ] {
        let object = scene.add_object(Object3D {
            model_id: Some(model_id),
            transform: Transform::from_translation(translation),
            ..Object3D::named(name)
        });
        scene.set_object_parent(object, Some(product_root));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use glam::{Mat4, Vec2};

    use super::*;
    use crate::viewer_state::EXPLODE_FACTOR;

    pub(crate) fn placeholder_showcase(config: ViewerConfig) -> ShowcaseState {
        let config = ViewerConfig {
            asset_path: PathBuf::from("does/not/exist.glb"),
            ..config
        };
        ShowcaseState::new(config).unwrap()
    }

    fn world_matrix(state: &ShowcaseState, id: ObjectId) -> Mat4 {
        state
            .scene
            .world_matrices()
            .into_iter()
            .find(|(object_id, _)| *object_id == id)
            .map(|(_, matrix)| matrix)
            .unwrap()
    }

    #[test]
    fn missing_asset_falls_back_to_placeholder_parts() {
        let state = placeholder_showcase(ViewerConfig::default());

        assert_eq!(state.parts().len(), 2);
        assert_eq!(state.scene.models.len(), 2);
        assert!(state.scene.get_object_by_name("Head").is_some());
    }

    #[test]
    fn zoom_scales_the_product_root() {
        let mut state = placeholder_showcase(ViewerConfig::default());

        state.controller.set_zoom(2.0);
        state.update();

        let root = state.scene.get_object_transform(state.product_root()).unwrap();
        assert_eq!(root.scale, Vec3::splat(2.0));
    }

    #[test]
    fn exploding_moves_parts_outward_and_back() {
        let mut state = placeholder_showcase(ViewerConfig::default());
        let head = state.parts()[1].object;
        let base = state.parts()[1].base_transform.translation;

        state.controller.toggle_exploded();
        state.update();
        let translation = state.scene.get_object_transform(head).unwrap().translation;
        assert_eq!(translation, base * EXPLODE_FACTOR);

        state.controller.toggle_exploded();
        state.update();
        let translation = state.scene.get_object_transform(head).unwrap().translation;
        assert_eq!(translation, base);
    }

    #[test]
    fn exploding_moves_the_group_from_its_base_position() {
        let base_position = Vec3::new(0.0, 1.0, -2.0);
        let mut state = placeholder_showcase(ViewerConfig {
            base_position,
            ..Default::default()
        });

        let root = state.product_root();
        let origin = world_matrix(&state, root).transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(base_position, 1e-6));

        state.controller.toggle_exploded();
        state.update();

        let origin = world_matrix(&state, root).transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(base_position * 1.5, 1e-6));
    }

    #[test]
    fn drag_rotation_is_applied_to_the_root() {
        let mut state = placeholder_showcase(ViewerConfig::default());

        state.controls.begin_drag();
        state.controls.drag(Vec2::new(100.0, 0.0));
        state.update();

        let rotation = state
            .scene
            .get_object_transform(state.product_root())
            .unwrap()
            .rotation;
        assert!(!rotation.abs_diff_eq(glam::Quat::IDENTITY, 1e-4));
    }

    #[test]
    fn tint_is_only_reported_when_enabled() {
        let mut state = placeholder_showcase(ViewerConfig::default());
        state.controller.set_active_color(ColorKey::Blue);
        assert_eq!(state.tint(), None);

        let mut state = placeholder_showcase(ViewerConfig {
            tint_model_with_active_color: true,
            ..Default::default()
        });
        state.controller.set_active_color(ColorKey::Blue);
        assert_eq!(state.tint(), Some(ColorKey::Blue.linear_rgba()));
    }
}
