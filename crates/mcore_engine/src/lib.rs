//! mcore engine
//!
//! Ties the paint, text, input and accessibility crates to a host surface
//! and exposes the whole core through a C ABI (see `include/mcore.h`).
//!
//! A frame is recorded between [`RenderContext::begin_frame`] and
//! [`RenderContext::end_frame_present`]: draw commands are queued, then
//! clipped, shaped and lowered into a [`RenderList`] that a
//! [`RenderBackend`] draws and presents.

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod pipeline;
pub mod surface;

pub use backend::{
    GlyphInstance, GlyphRun, RecordingBackend, RectInstance, RenderBackend, RenderList, RenderOp,
};
pub use config::{EngineConfig, ValidationMode};
pub use context::RenderContext;
pub use error::{BackendError, EngineError, Result};
pub use pipeline::{FramePipeline, FrameReport};
pub use surface::{SurfaceDesc, SurfaceHandle};

pub use mcore_a11y as a11y;
pub use mcore_input as input;
pub use mcore_paint as paint;
pub use mcore_text as text;
