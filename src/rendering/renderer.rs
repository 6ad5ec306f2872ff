use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    rendering::{
        global_uniform::GlobalUniformState,
        imgui_renderer::ImguiRendererState,
        instance::collect_instances,
        passes::{
            background_pass::{BackgroundPass, BackgroundPassTextureViews},
            model_pass::{ModelPass, ModelPassTextureViews},
            pass::Pass,
        },
        render_common::RenderCommon,
        render_model::{render_model_instances, RenderModel},
        scene_uniform::SceneUniformState,
        texture::DepthTexture,
    },
    scene_graph::SceneModelId,
    showcase::ShowcaseState,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_models: HashMap<SceneModelId, RenderModel>,

    background_pass: BackgroundPass,
    model_pass: ModelPass,
    imgui_renderer: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        state: &ShowcaseState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request device")?;

        let common = RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            scene_uniform_state(size, state),
        )?;
        let common = Arc::new(common);

        let depth_texture = {
            let config = common
                .output_surface_config
                .read()
                .map_err(|_| anyhow::anyhow!("Surface config lock poisoned"))?;
            DepthTexture::new(&device, &config, "Depth Texture")
        };

        let background_pass = BackgroundPass::create(&device, common.clone())?;
        let model_pass = ModelPass::create(&device, common.clone())?;

        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, common.surface_format(), imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_models: HashMap::new(),
            background_pass,
            model_pass,
            imgui_renderer,
        })
    }

    pub fn load_models(&mut self, state: &ShowcaseState) {
        for (model_id, scene_model) in state.scene.models.iter() {
            let render_model = RenderModel::from_model(
                &self.device,
                &self.common.material_bind_group_layout,
                &scene_model.model,
            );
            self.render_models.insert(model_id, render_model);

            log::info!(
                "Loaded model {} with {} primitives",
                scene_model.model.name,
                scene_model.model.primitives.len()
            );
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let Ok(mut config) = self.common.output_surface_config.write() else {
            log::error!("Surface config lock poisoned, skipping resize");
            return;
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.surface.configure(&self.device, &config);
        self.depth_texture.resize(&self.device, &config);
    }

    pub fn render(
        &mut self,
        state: &ShowcaseState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.common
            .scene_uniform
            .update(&self.queue, scene_uniform_state(self.size, state));
        self.common.global_uniform.update(
            &self.queue,
            GlobalUniformState::new(self.size, state.start_time.elapsed().as_secs_f32()),
        );

        let instances = collect_instances(&state.scene, state.tint());
        for (model_id, render_model) in self.render_models.iter_mut() {
            match instances.get(model_id) {
                Some(model_instances) => render_model.instances.write(&self.queue, model_instances),
                None => render_model.instances.clear(),
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.background_pass.render(
            &BackgroundPassTextureViews {
                color: view.clone(),
            },
            &mut encoder,
            |_| {},
        );

        self.model_pass.render(
            &ModelPassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            |render_pass| {
                for render_model in self.render_models.values() {
                    if !render_model.instances.should_render() {
                        continue;
                    }

                    render_model_instances(render_pass, render_model);
                }
            },
        );

        if let Err(e) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:?}", e);
        }

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }
}

fn scene_uniform_state(size: PhysicalSize<u32>, state: &ShowcaseState) -> SceneUniformState {
    SceneUniformState::new(
        size,
        &state.camera,
        state.config.spot_light_position,
        state.config.ambient_intensity,
    )
}
