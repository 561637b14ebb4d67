use crate::error::RenderError;

/// Knobs for the tunnel demo. Built in code; there is no config file.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelConfig {
    /// `id` of the `<canvas>` element in the hosting page.
    pub canvas_id: String,
    /// Multiplier applied to `devicePixelRatio` before clamping.
    pub pixel_ratio_factor: f64,
    /// Lower bound of the effective pixel scale.
    pub min_pixel_ratio: f64,
    /// Colour the buffer is cleared to before every draw.
    pub clear_color: [f32; 4],
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".to_string(),
            pixel_ratio_factor: 0.5,
            min_pixel_ratio: 1.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl TunnelConfig {
    /// Returns a copy targeting a different canvas element.
    pub fn with_canvas_id(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = id.into();
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.canvas_id.trim().is_empty() {
            return Err(RenderError::InvalidConfig("canvas id is empty".into()));
        }
        if !(self.pixel_ratio_factor.is_finite() && self.pixel_ratio_factor > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "pixel ratio factor must be positive, got {}",
                self.pixel_ratio_factor
            )));
        }
        if !(self.min_pixel_ratio.is_finite() && self.min_pixel_ratio > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "minimum pixel ratio must be positive, got {}",
                self.min_pixel_ratio
            )));
        }
        Ok(())
    }
}
