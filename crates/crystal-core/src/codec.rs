use std::io::Cursor;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use crate::tensor::{ImageTensor, TensorError};

/// Encode a float tensor as PNG bytes.
///
/// The PNG color type follows the channel count: luma for 1, RGB for 3,
/// RGBA for 4. No resizing or color conversion happens here.
pub fn encode_png(tensor: &ImageTensor) -> Result<Vec<u8>, ImageError> {
    let (w, h) = (tensor.width(), tensor.height());
    let pixels = tensor.to_u8();

    let image = match tensor.channels() {
        1 => GrayImage::from_raw(w, h, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(w, h, pixels).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w, h, pixels).map(DynamicImage::ImageRgba8),
        _ => None,
    }
    .ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
    })?;

    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Decode any supported image format and force three-channel color.
pub fn decode_rgb(bytes: &[u8]) -> Result<ImageTensor, ImageError> {
    let rgb = image::load_from_memory(bytes)?.into_rgb8();
    let (w, h) = rgb.dimensions();

    ImageTensor::from_u8(h, w, 3, rgb.as_raw()).map_err(tensor_to_image_error)
}

fn tensor_to_image_error(err: TensorError) -> ImageError {
    log::error!("Decoded image does not fit a tensor: {}", err);
    ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::Generic(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_round_trip() {
        let white = ImageTensor::filled(2, 2, 3, 1.0).unwrap();
        let png = encode_png(&white).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = decode_rgb(&png).unwrap();
        assert_eq!((decoded.height(), decoded.width(), decoded.channels()), (2, 2, 3));
        for (a, b) in decoded.data().iter().zip(white.data()) {
            assert!((a - b).abs() <= 1.0 / 255.0);
        }
    }

    #[test]
    fn test_rgba_input_decodes_to_rgb() {
        let data = vec![1.0, 0.0, 0.0, 0.5];
        let rgba = ImageTensor::new(1, 1, 4, data).unwrap();
        let decoded = decode_rgb(&encode_png(&rgba).unwrap()).unwrap();
        assert_eq!(decoded.channels(), 3);
        assert_eq!(decoded.pixel(0, 0), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_gray_input_expands_to_rgb() {
        let gray = ImageTensor::filled(3, 2, 1, 0.0).unwrap();
        let decoded = decode_rgb(&encode_png(&gray).unwrap()).unwrap();
        assert_eq!((decoded.height(), decoded.width()), (3, 2));
        assert!(decoded.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(decode_rgb(b"<html>not found</html>").is_err());
    }
}
