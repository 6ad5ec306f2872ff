use anyhow::Context;
use pollster::block_on;
use wgpu::{PollType, ShaderSource};

#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub source: &'static str,
}

pub(crate) const BACKGROUND_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Background Shader",
    source: include_str!("../../assets/shaders/background.wgsl"),
};

pub(crate) const MODEL_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Model Shader",
    source: include_str!("../../assets/shaders/model.wgsl"),
};

/// Compiles `shader_def` and builds a pipeline from it, turning wgpu validation errors
/// into a `Result` instead of the default panic.
pub(crate) fn create_render_pipeline<F>(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    factory: F,
) -> anyhow::Result<wgpu::RenderPipeline>
where
    F: FnOnce(&wgpu::Device, &wgpu::ShaderModule) -> wgpu::RenderPipeline,
{
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader_def.name),
        source: ShaderSource::Wgsl(shader_def.source.into()),
    });

    let pipeline = factory(device, &shader);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            shader_def.name,
            error
        ));
    }

    log::debug!("Compiled {}", shader_def.name);

    Ok(pipeline)
}
