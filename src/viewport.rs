//! Canvas sizing: logical window size times a capped pixel ratio.

use crate::config::TunnelConfig;

/// Effective backing-store scale derived from `devicePixelRatio`.
///
/// The tunnel renders at half the device ratio to keep the raymarcher cheap on
/// dense displays, but never below one backing pixel per CSS pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale(f64);

impl PixelScale {
    pub fn from_device_ratio(ratio: f64, config: &TunnelConfig) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        Self((config.pixel_ratio_factor * ratio).max(config.min_pixel_ratio))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Pixel dimensions of the canvas backing store and GL viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_window(
        inner_width: f64,
        inner_height: f64,
        device_pixel_ratio: f64,
        config: &TunnelConfig,
    ) -> Self {
        let scale = PixelScale::from_device_ratio(device_pixel_ratio, config).get();
        Self {
            width: to_pixels(inner_width * scale),
            height: to_pixels(inner_height * scale),
        }
    }

    /// `[width, height]` as written to the `resolution` uniform.
    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
