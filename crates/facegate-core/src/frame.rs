//! Frame type and still-image decoding.

use thiserror::Error;

/// A captured 8-bit grayscale frame.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

impl Frame {
    /// Wrap raw grayscale pixels, checking that the buffer covers the frame.
    pub fn from_gray(
        data: Vec<u8>,
        width: u32,
        height: u32,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence,
        })
    }

    /// Decode an encoded still (PNG, JPEG, ...) into a grayscale frame.
    pub fn decode(bytes: &[u8], sequence: u32) -> Result<Self, FrameError> {
        let gray = image::load_from_memory(bytes)?.to_luma8();
        let (width, height) = gray.dimensions();
        Self::from_gray(gray.into_raw(), width, height, sequence)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    #[test]
    fn test_from_gray_checks_length() {
        let err = Frame::from_gray(vec![0u8; 5], 2, 3, 0).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidLength { expected: 6, actual: 5 }
        ));
    }

    #[test]
    fn test_decode_png_to_gray() {
        let img = GrayImage::from_pixel(4, 2, Luma([200u8]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let frame = Frame::decode(&bytes, 7).unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.sequence, 7);
        assert!(frame.data.iter().all(|&p| p == 200));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            Frame::decode(b"not an image", 0),
            Err(FrameError::Decode(_))
        ));
    }
}
