use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};
use wgpu::BufferUsages;

use crate::scene_graph::{Scene, SceneModelId};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Instance {
    pub model: Mat4,
    /// rgb replaces the material colour in proportion to a.
    pub tint: Vec4,
    /// Columns of the inverse-transpose of the upper 3x3 of `model`, w unused.
    pub normal: [Vec4; 3],
}

impl Instance {
    pub fn new(model: Mat4, tint: Option<[f32; 4]>) -> Self {
        let tint = match tint {
            Some([r, g, b, _]) => Vec4::new(r, g, b, 1.0),
            None => Vec4::ZERO,
        };

        let normal = normal_matrix(model);

        Self {
            model,
            tint,
            normal: [normal.x_axis, normal.y_axis, normal.z_axis].map(|axis| axis.extend(0.0)),
        }
    }

    pub fn descriptor() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            9 => Float32x4,
            10 => Float32x4,
            11 => Float32x4,
            12 => Float32x4
        ];

        wgpu::VertexBufferLayout {
            array_stride: size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

fn normal_matrix(model: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(model);

    // Degenerate scale, nothing sensible to invert
    if linear.determinant().abs() <= f32::EPSILON {
        return linear;
    }

    linear.inverse().transpose()
}

/// Instances of every model in the scene, from the objects that reference it.
pub fn collect_instances(
    scene: &Scene,
    tint: Option<[f32; 4]>,
) -> HashMap<SceneModelId, Vec<Instance>> {
    let mut instances: HashMap<SceneModelId, Vec<Instance>> = HashMap::new();

    for (object_id, world_matrix) in scene.world_matrices() {
        let Some(model_id) = scene.get_object(object_id).and_then(|object| object.model_id) else {
            continue;
        };

        instances
            .entry(model_id)
            .or_default()
            .push(Instance::new(world_matrix, tint));
    }

    instances
}

pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    len: u32,
}

impl InstanceBuffer {
    pub const MAX_INSTANCES: usize = 128;

    pub fn new(device: &wgpu::Device, name: &str) -> Self {
        let label = format!("Instance buffer ({})", name);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: (size_of::<Instance>() * Self::MAX_INSTANCES) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer, len: 0 }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, instances: &[Instance]) {
        if instances.len() > Self::MAX_INSTANCES {
            log::warn!(
                "Dropping {} instances over the limit of {}",
                instances.len() - Self::MAX_INSTANCES,
                Self::MAX_INSTANCES
            );
        }

        let instances = &instances[..instances.len().min(Self::MAX_INSTANCES)];
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        self.len = instances.len() as u32;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn should_render(&self) -> bool {
        self.len > 0
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        model::Model,
        scene_graph::{Object3D, SceneModel, Transform},
    };

    #[test]
    fn objects_sharing_a_model_become_instances_of_it() {
        let mut scene = Scene::new();
        let cube = scene.add_model(SceneModel::new(Model::placeholder_cube("cube", 1.0, [1.0; 4])));

        for x in [-1.0, 1.0] {
            scene.add_object(Object3D {
                model_id: Some(cube),
                transform: Transform::from_translation(Vec3::new(x, 0.0, 0.0)),
                ..Object3D::named("cube")
            });
        }
        scene.add_object(Object3D::named("empty"));

        let instances = collect_instances(&scene, None);

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[&cube].len(), 2);
        assert_eq!(instances[&cube][0].tint, Vec4::ZERO);
    }

    #[test]
    fn tint_is_fully_opaque() {
        let instance = Instance::new(Mat4::IDENTITY, Some([0.2, 0.4, 0.6, 0.0]));

        assert_eq!(instance.tint, Vec4::new(0.2, 0.4, 0.6, 1.0));
    }

    #[test]
    fn instance_layout_matches_vertex_attributes() {
        let layout = Instance::descriptor();

        assert_eq!(layout.array_stride, 128);
        assert_eq!(layout.attributes[4].offset, 64);
        assert_eq!(layout.attributes.last().unwrap().offset, 112);
    }

    #[test]
    fn normals_stay_perpendicular_under_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let instance = Instance::new(model, None);

        // Surface of the plane x + y = 0, stretched along X
        let tangent = model.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        let [x, y, z] = instance.normal.map(|column| column.truncate());
        let normal = Mat3::from_cols(x, y, z) * Vec3::new(1.0, 1.0, 0.0);

        assert!(normal.dot(tangent).abs() < 1e-5);
        // Transforming the normal with the model matrix itself would skew it
        let skewed = model.transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert!(skewed.dot(tangent).abs() > 1.0);
    }

    #[test]
    fn degenerate_scale_does_not_produce_nan_normals() {
        let instance = Instance::new(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)), None);

        assert!(instance.normal.iter().all(|column| column.is_finite()));
    }
}
