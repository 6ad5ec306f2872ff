//! Interactive state of the product viewer and the transform derived from it.
//!
//! Widgets never mutate [`ViewerState`] directly. They emit [`ViewerEvent`]s which
//! go through [`reduce`], and the transform fed to the scene is recomputed from the
//! state every time it is read.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use glam::{Quat, Vec3};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.1;

pub const EXPLODE_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorKey {
    Yellow,
    Blue,
    Red,
    Green,
}

/// Swatch colours in display order.
pub const COLOR_MAPPING: [(ColorKey, &str); 4] = [
    (ColorKey::Yellow, "#FFD700"),
    (ColorKey::Blue, "#4169E1"),
    (ColorKey::Red, "#DC143C"),
    (ColorKey::Green, "#2E8B57"),
];

impl ColorKey {
    pub fn name(self) -> &'static str {
        match self {
            ColorKey::Yellow => "yellow",
            ColorKey::Blue => "blue",
            ColorKey::Red => "red",
            ColorKey::Green => "green",
        }
    }

    pub fn hex(self) -> &'static str {
        COLOR_MAPPING
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, hex)| *hex)
            .unwrap_or("#FFFFFF")
    }

    /// sRGB-encoded RGBA in 0..1, as written in the mapping.
    pub fn rgba(self) -> [f32; 4] {
        parse_hex_color(self.hex()).unwrap_or([1.0; 4])
    }

    pub fn linear_rgba(self) -> [f32; 4] {
        let [r, g, b, a] = self.rgba();
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COLOR_MAPPING
            .iter()
            .map(|(key, _)| *key)
            .find(|key| key.name() == s)
            .ok_or_else(|| anyhow!("Unknown color key: {s:?}"))
    }
}

fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .ok()
            .map(|value| value as f32 / 255.0)
    };

    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0])
}

fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub zoom: f32,
    pub exploded: bool,
    pub active_color: ColorKey,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            exploded: false,
            active_color: ColorKey::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    SetZoom(f32),
    ToggleExploded,
    SetActiveColor(ColorKey),
}

/// Scale, position and Euler rotation (XYZ, radians) handed to the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl TransformParameters {
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

/// Position of something at `base` after the exploded-view offset is applied.
pub fn explode(base: Vec3, exploded: bool) -> Vec3 {
    if exploded {
        base * EXPLODE_FACTOR
    } else {
        base
    }
}

pub fn reduce(state: &ViewerState, event: ViewerEvent) -> ViewerState {
    match event {
        ViewerEvent::SetZoom(zoom) if zoom.is_finite() => ViewerState {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..*state
        },
        // NaN and infinities never reach the scene
        ViewerEvent::SetZoom(_) => *state,
        ViewerEvent::ToggleExploded => ViewerState {
            exploded: !state.exploded,
            ..*state
        },
        ViewerEvent::SetActiveColor(active_color) => ViewerState {
            active_color,
            ..*state
        },
    }
}

#[derive(Debug, Default)]
pub struct ViewerStateController {
    state: ViewerState,
}

impl ViewerStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn dispatch(&mut self, event: ViewerEvent) {
        let next = reduce(&self.state, event);

        if next != self.state {
            log::debug!("Viewer state {:?} -> {:?}", self.state, next);
        }

        self.state = next;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.dispatch(ViewerEvent::SetZoom(zoom));
    }

    pub fn toggle_exploded(&mut self) {
        self.dispatch(ViewerEvent::ToggleExploded);
    }

    pub fn set_active_color(&mut self, key: ColorKey) {
        self.dispatch(ViewerEvent::SetActiveColor(key));
    }

    /// Looks up `name` in the colour mapping. Unknown names leave the state untouched.
    #[allow(dead_code)]
    pub fn set_active_color_by_name(&mut self, name: &str) -> anyhow::Result<()> {
        let key = name.parse()?;
        self.set_active_color(key);
        Ok(())
    }

    #[allow(dead_code)]
    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn exploded(&self) -> bool {
        self.state.exploded
    }

    pub fn active_color(&self) -> ColorKey {
        self.state.active_color
    }

    #[allow(dead_code)]
    pub fn active_color_value(&self) -> &'static str {
        self.state.active_color.hex()
    }

    pub fn transform(&self, base_position: Vec3) -> TransformParameters {
        TransformParameters {
            scale: Vec3::splat(self.state.zoom),
            position: explode(base_position, self.state.exploded),
            rotation: Vec3::ZERO,
        }
    }
}
