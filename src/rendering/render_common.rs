use std::sync::RwLock;

use anyhow::Context;
use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::rendering::{
    global_uniform::{uniform_bind_group_layout, GlobalUniform, GlobalUniformState},
    scene_uniform::{SceneUniform, SceneUniformState},
};

pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub global_uniform: GlobalUniform,
    pub scene_uniform: SceneUniform,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
        initial_scene: SceneUniformState,
    ) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface is not compatible with the adapter")?;

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);
        log::info!(
            "Configured surface {}x{} ({:?})",
            output_surface_config.width,
            output_surface_config.height,
            surface_format
        );

        let global_uniform = GlobalUniform::new(device, GlobalUniformState::new(size, 0.0));
        let scene_uniform = SceneUniform::new(device, initial_scene);
        let material_bind_group_layout = uniform_bind_group_layout(
            device,
            "Material bind group layout",
            wgpu::ShaderStages::FRAGMENT,
        );

        Ok(Self {
            output_surface_config: RwLock::new(output_surface_config),
            global_uniform,
            scene_uniform,
            material_bind_group_layout,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.output_surface_config
            .read()
            .map(|config| config.format)
            .unwrap_or_else(|poisoned| poisoned.into_inner().format)
    }
}
