//! Viewport state and the reaction to window size and scale changes.

use crate::{
    effects::render_context::RenderContext,
    materials::{UniformValue, names},
    render::GraphicsContext,
};

/// `device` clamped into `[0, max]`.
pub fn clamp_pixel_ratio(device: f32, max: f32) -> f32 {
    device.max(0.0).min(max)
}

/// Pixel size of the drawing buffer for a logical size and a clamped pixel
/// ratio. Point sizes are expressed in these pixels.
pub fn drawing_buffer_size(width: u32, height: u32, pixel_ratio: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * pixel_ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Size of the drawable area in logical pixels plus the device scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
    pub max_pixel_ratio: f32,
}

impl ViewportState {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio,
        }
    }

    /// The ratio the renderer and point-size math actually use.
    pub fn pixel_ratio(&self) -> f32 {
        clamp_pixel_ratio(self.device_pixel_ratio, self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Applies a new viewport size to the camera, the render target and the
/// pixel-ratio uniform. Zero-sized viewports (minimised windows) are ignored.
pub fn on_resize(
    ctx: &mut RenderContext,
    graphics: &mut dyn GraphicsContext,
    width: u32,
    height: u32,
) {
    if width == 0 || height == 0 {
        log::debug!("ignoring resize to {}x{}", width, height);
        return;
    }
    ctx.viewport.width = width;
    ctx.viewport.height = height;
    ctx.camera.aspect = ctx.viewport.aspect();
    ctx.camera.update_projection_matrix();
    graphics.set_size(width, height);
    apply_pixel_ratio(ctx, graphics);
}

/// Applies a new device pixel ratio, e.g. after the window moved to another
/// monitor.
pub fn on_scale_factor(ctx: &mut RenderContext, graphics: &mut dyn GraphicsContext, ratio: f32) {
    ctx.viewport.device_pixel_ratio = ratio.max(0.0);
    apply_pixel_ratio(ctx, graphics);
}

fn apply_pixel_ratio(ctx: &mut RenderContext, graphics: &mut dyn GraphicsContext) {
    let ratio = ctx.viewport.pixel_ratio();
    graphics.set_pixel_ratio(ratio);
    if let Some(particles) = ctx.effects.particles {
        if let Err(e) = ctx
            .materials
            .set_uniform(particles, names::PIXEL_RATIO, UniformValue::Float(ratio))
        {
            log::warn!("pixel ratio not applied: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.25, 2.0), 1.25);
        assert_eq!(clamp_pixel_ratio(0.0, 2.0), 0.0);
        assert_eq!(clamp_pixel_ratio(-1.0, 2.0), 0.0);
    }

    #[test]
    fn drawing_buffer_follows_clamped_ratio() {
        assert_eq!(drawing_buffer_size(800, 600, 2.0), (1600, 1200));
        assert_eq!(drawing_buffer_size(801, 601, 1.5), (1202, 902));
        assert_eq!(drawing_buffer_size(0, 600, 1.0), (1, 600));
    }

    #[test]
    fn aspect_survives_zero_height() {
        let viewport = ViewportState::new(800, 0, 1.0, 2.0);
        assert_eq!(viewport.aspect(), 800.0);
    }
}
