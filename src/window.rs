use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig, engine, rendering::renderer::Renderer, showcase::ShowcaseState,
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    showcase: ShowcaseState,
    mouse_pos: Vec2,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn from_showcase(showcase: ShowcaseState) -> Self {
        Self {
            renderer: None,
            showcase,
            mouse_pos: Vec2::ZERO,
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Viewer state is not persisted, neither is the widget layout
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.showcase.config.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(self.showcase.config.window_title.clone())
            .with_inner_size(LogicalSize::new(width, height));
        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        let mut imgui = Self::setup_imgui(&window);

        let mut renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.showcase,
            &mut imgui.context,
        ))?;
        renderer.load_models(&self.showcase);

        self.imgui = Some(imgui);
        self.renderer = Some(renderer);

        Ok(())
    }

    fn handle_pointer(&mut self, event: &WindowEvent, ui_wants_mouse: bool) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match drag_action(*state, ui_wants_mouse) {
                Some(DragAction::Begin) => self.showcase.controls.begin_drag(),
                Some(DragAction::End) => self.showcase.controls.end_drag(),
                None => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                let mouse_pos = Vec2::new(position.x as f32, position.y as f32);
                self.showcase.controls.drag(mouse_pos - self.mouse_pos);
                self.mouse_pos = mouse_pos;
            }
            _ => (),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum DragAction {
    Begin,
    End,
}

/// Presses the UI has captured never reach the presentation controls. Releases always do.
fn drag_action(state: ElementState, ui_wants_mouse: bool) -> Option<DragAction> {
    match state {
        ElementState::Pressed if ui_wants_mouse => None,
        ElementState::Pressed => Some(DragAction::Begin),
        ElementState::Released => Some(DragAction::End),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.create_renderer(event_loop) {
            log::error!("Failed to start renderer: {:?}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let ui_wants_mouse = match self.imgui.as_ref() {
            Some(imgui) => imgui.context.io().want_capture_mouse,
            None => return,
        };

        self.handle_pointer(&event, ui_wants_mouse);

        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                renderer.resize(*new_size);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                imgui
                    .context
                    .io_mut()
                    .update_delta_time(now - self.last_frame);
                self.last_frame = now;

                renderer.window.request_redraw();

                if let Err(e) = imgui
                    .platform
                    .prepare_frame(imgui.context.io_mut(), &renderer.window)
                {
                    log::error!("Failed to prepare Imgui frame: {}", e);
                    return;
                }

                let ui = imgui.context.new_frame();
                engine::update(&mut self.showcase, ui);
                imgui.platform.prepare_render(ui, &renderer.window);

                match renderer.render(&self.showcase, &mut imgui.context) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            _ => (),
        }

        imgui.platform.handle_event::<()>(
            imgui.context.io_mut(),
            &renderer.window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

pub async fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let showcase = ShowcaseState::new(config).context("Failed to create showcase state")?;
    let mut app = App::from_showcase(showcase);
    event_loop.run_app(&mut app)?;

    Ok(())
}
