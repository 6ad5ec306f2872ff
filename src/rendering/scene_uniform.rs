use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::{camera::Camera, rendering::global_uniform::uniform_bind_group_layout};

/// Camera and lighting shared by every model draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniformState {
    view_proj: Mat4,
    camera_position: Vec4,
    light: Vec4,
}

impl SceneUniformState {
    pub fn new(
        resolution: PhysicalSize<u32>,
        camera: &Camera,
        light_position: Vec3,
        ambient_intensity: f32,
    ) -> Self {
        let resolution = Vec2::new(resolution.width as f32, resolution.height as f32);

        Self {
            view_proj: camera.get_vp_matrix(resolution),
            camera_position: camera.eye.extend(1.0),
            light: light_position.extend(ambient_intensity),
        }
    }
}

pub struct SceneUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl SceneUniform {
    pub fn new(device: &wgpu::Device, initial_state: SceneUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = uniform_bind_group_layout(
            device,
            "Scene uniform bind group layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: SceneUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_light_and_ambient_together() {
        let camera = Camera::looking_at_origin(Vec3::new(0.0, 0.0, 5.0), 50.0);
        let state = SceneUniformState::new(
            PhysicalSize::new(800, 600),
            &camera,
            Vec3::new(10.0, 10.0, 10.0),
            0.5,
        );

        assert_eq!(std::mem::size_of::<SceneUniformState>(), 96);
        assert_eq!(state.light, Vec4::new(10.0, 10.0, 10.0, 0.5));
        assert_eq!(state.camera_position, Vec4::new(0.0, 0.0, 5.0, 1.0));
    }
}
