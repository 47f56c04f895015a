//! The per-frame tick.
//!
//! One tick reads the clock, animates, pushes the time uniforms, steps the
//! camera controls, renders and asks for the next frame. Ticks never block
//! and never stop the loop: a failed render only costs that frame.

use crate::{
    camera::CameraControls,
    effects::render_context::RenderContext,
    render::GraphicsContext,
    time::Clock,
};

/// Whatever calls `tick` again on the next display refresh.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// The render submission failed; the next frame is scheduled anyway.
    Skipped,
}

pub struct FrameUpdater<C: Clock> {
    clock: C,
}

impl<C: Clock> FrameUpdater<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tick(
        &mut self,
        ctx: &mut RenderContext,
        controls: &mut dyn CameraControls,
        graphics: &mut dyn GraphicsContext,
        scheduler: &mut dyn FrameScheduler,
    ) -> TickOutcome {
        let elapsed = self.clock.elapsed_seconds();
        let delta = ctx.frame.advance(elapsed);

        for mixer in ctx.mixers.iter_mut() {
            mixer.update(delta, &mut ctx.scene);
        }

        ctx.materials.set_time(elapsed as f32);

        controls.update(&mut ctx.camera);

        let outcome = match graphics.render(&ctx.scene, &ctx.materials, &ctx.camera) {
            Ok(()) => TickOutcome::Rendered,
            Err(e) => {
                log::warn!("frame {} skipped: {}", ctx.frame.frame_index, e);
                TickOutcome::Skipped
            }
        };

        scheduler.request_frame();
        outcome
    }
}
