use std::sync::Arc;

use wgpu::{Device, MultisampleState, PipelineCompilationOptions, RenderPass, RenderPassDescriptor};

use crate::rendering::{
    passes::pass::Pass,
    render_common::RenderCommon,
    shader::{create_render_pipeline, BACKGROUND_SHADER},
};

/// Clears the frame with a studio-style vertical gradient.
pub struct BackgroundPass {
    pipeline: wgpu::RenderPipeline,
    common: Arc<RenderCommon>,
}

pub struct BackgroundPassTextureViews {
    pub color: wgpu::TextureView,
}

impl Pass for BackgroundPass {
    type TextureViews = BackgroundPassTextureViews;

    fn create(device: &Device, common: Arc<RenderCommon>) -> anyhow::Result<BackgroundPass> {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&common.global_uniform.bind_group_layout],
            push_constant_ranges: &[],
        });

        let format = common.surface_format();

        let pipeline = create_render_pipeline(device, &BACKGROUND_SHADER, |device, shader| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Background Pass Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(Self { pipeline, common })
    }

    fn render<'a, F>(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        render_callback: F,
    ) where
        F: FnOnce(&mut RenderPass) + 'a,
    {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Background Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.common.global_uniform.bind_group, &[]);
        render_pass.draw(0..3, 0..1);

        render_callback(&mut render_pass);
    }
}
