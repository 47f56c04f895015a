//! The effects pipeline: what happens to the scene when assets arrive, when
//! the window changes size and on every frame.
//!
//! - `render_context` owns the scene state all other parts borrow
//! - `fire` puts the fire material on named parts of the scene asset
//! - `outline` duplicates meshes into back-face silhouettes
//! - `frame` runs the per-frame tick
//! - `resize` reacts to viewport and pixel-ratio changes

pub mod fire;
pub mod frame;
pub mod outline;
pub mod render_context;
pub mod resize;

pub use frame::{FrameScheduler, FrameUpdater, TickOutcome};
pub use outline::{OutlineOptions, OutlinePair, apply_outline};
pub use render_context::{EffectHandles, RenderContext};
pub use resize::{ViewportState, on_resize, on_scale_factor};
