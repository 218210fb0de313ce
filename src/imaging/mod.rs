//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Optimize** | Lanczos3 downscale to the width cap, JPEG re-encode |
//! | **Thumbnail** | fixed-width Lanczos3 resize, JPEG encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{OptimizeConfig, ThumbnailConfig, optimize, thumbnail};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
