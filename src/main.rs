use anyhow::Result;

mod camera;
mod config;
mod engine;
mod model;
mod presentation_controls;
mod product;
mod rendering;
mod scene_graph;
mod showcase;
mod ui;
mod viewer_state;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::ViewerConfig::from_args(std::env::args().skip(1));
    log::info!("Starting product showcase with {}", config.asset_path.display());

    pollster::block_on(window::run(config))?;

    Ok(())
}
