use glam::Vec2;
use imgui::{Condition, StyleColor, StyleVar, WindowFlags};

use crate::{
    product::ProductDetails,
    showcase::ShowcaseState,
    viewer_state::{
        ColorKey, ViewerEvent, ViewerState, COLOR_MAPPING, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP,
    },
};

const PANEL_HEIGHT: f32 = 190.0;
const DETAILS_WIDTH: f32 = 256.0;
const SWATCH_SIZE: f32 = 48.0;

/// Draws every widget for the frame and returns what the user changed.
pub fn draw(ui: &imgui::Ui, state: &ShowcaseState) -> Vec<ViewerEvent> {
    let mut events = Vec::new();
    let display_size = Vec2::from(ui.io().display_size);

    draw_control_panel(ui, state.controller.state(), state.product, display_size, &mut events);

    // The panel is drawn over the scene, so the 3D viewport spans the whole display
    if let Some(anchor) = state
        .camera
        .world_to_screen(state.config.details_anchor, display_size)
    {
        draw_product_details(ui, state.product, anchor);
    }

    events
}

/// Rounds a slider value to the nearest zoom step.
pub fn snap_zoom(value: f32) -> f32 {
    (value / ZOOM_STEP).round() * ZOOM_STEP
}

fn draw_control_panel(
    ui: &imgui::Ui,
    viewer: &ViewerState,
    product: &ProductDetails,
    display_size: Vec2,
    events: &mut Vec<ViewerEvent>,
) {
    ui.window("Controls")
        .position([0.0, display_size.y - PANEL_HEIGHT], Condition::Always)
        .size([display_size.x, PANEL_HEIGHT], Condition::Always)
        .flags(WindowFlags::NO_DECORATION | WindowFlags::NO_MOVE)
        .build(|| {
            let Some(_tab_bar) = ui.tab_bar("viewer_tabs") else {
                return;
            };

            if let Some(_tab) = ui.tab_item("View Options") {
                draw_view_options(ui, viewer, events);
            }

            if let Some(_tab) = ui.tab_item("Color") {
                draw_color_swatches(ui, viewer, events);
            }

            if let Some(_tab) = ui.tab_item("Information") {
                draw_information(ui, product);
            }
        });
}

fn draw_view_options(ui: &imgui::Ui, viewer: &ViewerState, events: &mut Vec<ViewerEvent>) {
    ui.text("Zoom");
    ui.same_line();
    ui.text_disabled(format!("{:.1}x", viewer.zoom));

    let mut zoom = viewer.zoom;
    if ui
        .slider_config("##zoom", MIN_ZOOM, MAX_ZOOM)
        .display_format("%.1fx")
        .build(&mut zoom)
    {
        let zoom = snap_zoom(zoom);
        if zoom != viewer.zoom {
            events.push(ViewerEvent::SetZoom(zoom));
        }
    }

    ui.spacing();
    ui.text("Exploded View");
    ui.same_line();
    draw_exploded_toggle(ui, viewer, events);
}

fn draw_exploded_toggle(ui: &imgui::Ui, viewer: &ViewerState, events: &mut Vec<ViewerEvent>) {
    let label = if viewer.exploded {
        "Enabled##exploded"
    } else {
        "Disabled##exploded"
    };

    let _exploded_style = viewer
        .exploded
        .then(|| ui.push_style_color(StyleColor::Button, [0.26, 0.59, 0.98, 1.0]));

    if ui.button(label) {
        events.push(ViewerEvent::ToggleExploded);
    }
}

fn draw_color_swatches(ui: &imgui::Ui, viewer: &ViewerState, events: &mut Vec<ViewerEvent>) {
    for (index, (key, _hex)) in COLOR_MAPPING.iter().enumerate() {
        if index > 0 {
            ui.same_line();
        }

        draw_color_swatch(ui, *key, *key == viewer.active_color, events);
    }
}

fn draw_color_swatch(
    ui: &imgui::Ui,
    key: ColorKey,
    active: bool,
    events: &mut Vec<ViewerEvent>,
) {
    let _border = active.then(|| ui.push_style_var(StyleVar::FrameBorderSize(3.0)));
    let _border_color =
        active.then(|| ui.push_style_color(StyleColor::Border, [1.0, 1.0, 1.0, 1.0]));

    let clicked = ui
        .color_button_config(format!("Select {} color", key.name()), key.rgba())
        .size([SWATCH_SIZE, SWATCH_SIZE])
        .build();

    // Re-selecting the active colour is not a change
    if clicked && !active {
        events.push(ViewerEvent::SetActiveColor(key));
    }
}

fn draw_information(ui: &imgui::Ui, product: &ProductDetails) {
    ui.columns(2, "product_information", false);

    for (label, value) in product.info {
        ui.text(label);
        ui.next_column();
        ui.text(value);
        ui.next_column();
    }

    ui.columns(1, "product_information", false);
}

fn draw_product_details(ui: &imgui::Ui, product: &ProductDetails, anchor: Vec2) {
    ui.window("Product Details")
        .position(anchor.to_array(), Condition::Always)
        .size([DETAILS_WIDTH, 0.0], Condition::Always)
        .flags(
            WindowFlags::NO_MOVE
                | WindowFlags::NO_RESIZE
                | WindowFlags::NO_COLLAPSE
                | WindowFlags::NO_SAVED_SETTINGS,
        )
        .build(|| {
            ui.text(product.name);
            ui.separator();
            ui.text_wrapped(product.description);
            ui.spacing();

            ui.text(product.price);
            ui.same_line();
            if ui.small_button("Add to Cart") {
                log::info!("{} added to cart at {}", product.name, product.price);
            }
        });
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Mutex, MutexGuard};

    use super::*;
    use crate::{config::ViewerConfig, showcase::tests::placeholder_showcase};

    // Dear ImGui has one global context, so tests that create one take turns
    static IMGUI_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) struct Headless {
        pub context: imgui::Context,
        _lock: MutexGuard<'static, ()>,
    }

    pub(crate) fn headless() -> Headless {
        let lock = IMGUI_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.io_mut().display_size = [1280.0, 800.0];
        context.fonts().build_rgba32_texture();

        Headless {
            context,
            _lock: lock,
        }
    }

    const WIDGET_ORIGIN: [f32; 2] = [100.0, 100.0];

    /// Draws `widget` at `WIDGET_ORIGIN` for one frame with the given mouse state.
    fn widget_frame(
        context: &mut imgui::Context,
        mouse_pos: [f32; 2],
        mouse_down: bool,
        widget: &impl Fn(&imgui::Ui, &mut Vec<ViewerEvent>),
    ) -> Vec<ViewerEvent> {
        context.io_mut().mouse_pos = mouse_pos;
        context.io_mut().mouse_down[0] = mouse_down;

        let mut events = Vec::new();
        let ui = &*context.new_frame();
        ui.window("Widget")
            .position([0.0, 0.0], Condition::Always)
            .size([400.0, 400.0], Condition::Always)
            .build(|| {
                ui.set_cursor_screen_pos(WIDGET_ORIGIN);
                widget(ui, &mut events);
            });
        context.render();

        events
    }

    /// Hovers, presses and releases the left button just inside the widget's top-left corner.
    fn click_widget(widget: impl Fn(&imgui::Ui, &mut Vec<ViewerEvent>)) -> Vec<ViewerEvent> {
        let mut headless = headless();
        let target = [WIDGET_ORIGIN[0] + 5.0, WIDGET_ORIGIN[1] + 5.0];

        let mut events = Vec::new();
        for mouse_down in [false, false, true, false, false] {
            events.extend(widget_frame(
                &mut headless.context,
                target,
                mouse_down,
                &widget,
            ));
        }

        events
    }

    #[test]
    fn zoom_snaps_to_tenths() {
        assert!((snap_zoom(1.04) - 1.0).abs() < 1e-6);
        assert!((snap_zoom(1.06) - 1.1).abs() < 1e-6);
        assert!((snap_zoom(MAX_ZOOM) - MAX_ZOOM).abs() < 1e-6);
    }

    #[test]
    fn clicking_the_exploded_button_toggles() {
        let viewer = ViewerState::default();

        let events = click_widget(|ui, events| draw_exploded_toggle(ui, &viewer, events));

        assert_eq!(events, vec![ViewerEvent::ToggleExploded]);
    }

    #[test]
    fn clicking_another_swatch_selects_its_color() {
        let viewer = ViewerState::default();
        assert_eq!(viewer.active_color, ColorKey::Yellow);

        let events = click_widget(|ui, events| {
            draw_color_swatch(ui, ColorKey::Blue, ColorKey::Blue == viewer.active_color, events)
        });

        assert_eq!(events, vec![ViewerEvent::SetActiveColor(ColorKey::Blue)]);
    }

    #[test]
    fn clicking_the_active_swatch_changes_nothing() {
        let viewer = ViewerState::default();

        let events = click_widget(|ui, events| {
            draw_color_swatch(ui, ColorKey::Yellow, ColorKey::Yellow == viewer.active_color, events)
        });

        assert!(events.is_empty());
    }

    #[test]
    fn idle_frames_report_no_events() {
        let mut headless = headless();
        let state = placeholder_showcase(ViewerConfig::default());

        for _ in 0..3 {
            let ui = headless.context.new_frame();
            let events = draw(ui, &state);
            headless.context.render();

            assert!(events.is_empty());
        }
    }
}
