//! Bridge between encoded image files and [`ImageBuffer`].
//!
//! Decoding accepts PNG and JPEG. Whatever the source layout, the
//! result is either single-channel luma or R, G, B interleaved, so the
//! filters never have to care about the file's native channel order.
//! Encoding always produces PNG, which is lossless and deterministic for
//! a given buffer.

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::types::{Channels, DecodeError, EncodeError, ImageBuffer};

/// Decode PNG or JPEG bytes into an [`ImageBuffer`].
///
/// Images without color information (luma, with or without alpha)
/// decode to [`Channels::Gray`]; everything else decodes to
/// [`Channels::Rgb`]. Alpha is discarded.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if `bytes` is empty,
/// [`DecodeError::UnsupportedFormat`] if the data is not PNG or JPEG, and
/// [`DecodeError::Image`] if the codec rejects the data.
pub fn decode(bytes: &[u8]) -> Result<ImageBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(DecodeError::UnsupportedFormat);
    }

    let image = image::load_from_memory_with_format(bytes, format)?;
    Ok(from_dynamic(image))
}

fn from_dynamic(image: DynamicImage) -> ImageBuffer {
    if image.color().has_color() {
        ImageBuffer::from(image.into_rgb8())
    } else {
        ImageBuffer::from(image.into_luma8())
    }
}

/// Encode an [`ImageBuffer`] as PNG.
///
/// # Errors
///
/// Returns [`EncodeError`] if the PNG encoder rejects the buffer (for
/// example a zero-sized image).
pub fn encode(image: &ImageBuffer) -> Result<Vec<u8>, EncodeError> {
    let color = match image.channels() {
        Channels::Gray => ExtendedColorType::L8,
        Channels::Rgb => ExtendedColorType::Rgb8,
    };
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(image.as_raw(), image.width(), image.height(), color)?;
    Ok(buf)
}
