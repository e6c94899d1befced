//! Image loading and saving.
//! Decodes PNG, JPEG, and other formats into FrameBuffers, and writes
//! rendered frames back out as PNG.

use std::path::Path;

use retromode_core::{EngineError, EngineResult, FrameBuffer};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> EngineResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        EngineError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_raw(width, height, rgba.into_raw())
}

/// Load an image from raw bytes (e.g., from an embedded asset).
pub fn load_image_from_bytes(data: &[u8]) -> EngineResult<FrameBuffer> {
    let img = image::load_from_memory(data)
        .map_err(|e| EngineError::asset(format!("failed to decode image: {}", e), "<memory>"))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_raw(width, height, rgba.into_raw())
}

/// Encode a frame as PNG at `path`.
pub fn save_png(frame: &FrameBuffer, path: &Path) -> EngineResult<()> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            EngineError::dimension(format!(
                "{} bytes do not describe a {}x{} frame",
                frame.data.len(),
                frame.width,
                frame.height
            ))
        })?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| {
            EngineError::asset(
                format!("failed to write image '{}': {}", path.display(), e),
                path,
            )
        })?;
    tracing::debug!(
        path = %path.display(),
        width = frame.width,
        height = frame.height,
        "frame saved"
    );
    Ok(())
}
