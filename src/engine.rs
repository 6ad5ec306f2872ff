use crate::{showcase::ShowcaseState, ui, viewer_state::ViewerEvent};

/// Runs the widgets for this frame, feeds their events to the viewer state and pushes
/// the derived transform into the scene.
pub fn update(state: &mut ShowcaseState, imgui_ui: &imgui::Ui) {
    let events = ui::draw(imgui_ui, state);
    apply_events(state, events);
}

pub fn apply_events(state: &mut ShowcaseState, events: impl IntoIterator<Item = ViewerEvent>) {
    for event in events {
        match event {
            ViewerEvent::SetZoom(zoom) => state.controller.set_zoom(zoom),
            ViewerEvent::ToggleExploded => state.controller.toggle_exploded(),
            ViewerEvent::SetActiveColor(key) => state.controller.set_active_color(key),
        }
    }

    state.update();
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        config::ViewerConfig,
        showcase::tests::placeholder_showcase,
        ui::tests::headless,
        viewer_state::{ColorKey, ViewerState, EXPLODE_FACTOR},
    };

    #[test]
    fn events_change_state_and_product_transform() {
        let mut state = placeholder_showcase(ViewerConfig::default());

        apply_events(
            &mut state,
            [
                ViewerEvent::SetZoom(1.5),
                ViewerEvent::ToggleExploded,
                ViewerEvent::SetActiveColor(ColorKey::Blue),
            ],
        );

        assert_eq!(
            *state.controller.state(),
            ViewerState {
                zoom: 1.5,
                exploded: true,
                active_color: ColorKey::Blue,
            }
        );

        let root = state.scene.get_object_transform(state.product_root()).unwrap();
        assert_eq!(root.scale, Vec3::splat(1.5));
        assert_eq!(root.translation, state.config.base_position * EXPLODE_FACTOR);
    }

    #[test]
    fn out_of_range_zoom_is_clamped_before_reaching_the_scene() {
        let mut state = placeholder_showcase(ViewerConfig::default());

        apply_events(&mut state, [ViewerEvent::SetZoom(7.0)]);

        let root = state.scene.get_object_transform(state.product_root()).unwrap();
        assert_eq!(root.scale, Vec3::splat(2.0));
    }

    #[test]
    fn frame_update_pushes_controller_changes_into_the_scene() {
        let mut headless = headless();
        let mut state = placeholder_showcase(ViewerConfig::default());
        state.controller.set_zoom(0.5);

        let ui = headless.context.new_frame();
        update(&mut state, ui);
        headless.context.render();

        let root = state.scene.get_object_transform(state.product_root()).unwrap();
        assert_eq!(root.scale, Vec3::splat(0.5));
        assert_eq!(state.controller.state().zoom, 0.5);
    }
}
