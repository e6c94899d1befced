//! # retromode-render
//!
//! The Retromode software renderer. Resamples images through affine
//! matrices and composites priority-ordered drawables into a frame buffer.
//! Everything runs on the CPU, one pixel at a time.

pub mod compositor;
pub mod image_loader;
pub mod resample;
pub mod sprite;

pub use compositor::{Compositor, Drawable, PaintEntry, PaintId};
pub use image_loader::{load_image, load_image_from_bytes, save_png};
pub use resample::{Resampler, ScanlineTransform, UnclippedImage, MAX_UNCLIPPED_PIXELS};
pub use sprite::{FramedSprite, Sprite};
