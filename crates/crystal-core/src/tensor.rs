use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("Image of {height}x{width}x{channels} values is too large to address")]
    TooLarge { height: u32, width: u32, channels: usize },
    #[error("Unsupported channel count {0}, expected 1, 3 or 4")]
    UnsupportedChannels(usize),
    #[error("Tensor holds {actual} values but {height}x{width}x{channels} needs {expected}")]
    LengthMismatch {
        height: u32,
        width: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },
}

/// A single image in the host's float layout: row-major `H x W x C`,
/// values nominally in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    height: u32,
    width: u32,
    channels: usize,
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(height: u32, width: u32, channels: usize, data: Vec<f32>) -> Result<Self, TensorError> {
        if width == 0 || height == 0 {
            return Err(TensorError::EmptyDimensions { width, height });
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(TensorError::UnsupportedChannels(channels));
        }

        let expected = element_count(height, width, channels)?;
        if data.len() != expected {
            return Err(TensorError::LengthMismatch {
                height,
                width,
                channels,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { height, width, channels, data })
    }

    /// Tensor with every value set to `value`
    pub fn filled(height: u32, width: u32, channels: usize, value: f32) -> Result<Self, TensorError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(TensorError::UnsupportedChannels(channels));
        }
        let len = element_count(height, width, channels)?;
        Self::new(height, width, channels, vec![value; len])
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Values of the pixel at (`x`, `y`), one per channel
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * self.channels;
        Some(&self.data[start..start + self.channels])
    }

    /// Quantize to 8 bits per channel.
    ///
    /// Values are clamped to `[0, 1]` and truncated after scaling, so
    /// `1.0` maps to 255 and anything just below a step rounds down.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| float_to_byte(v)).collect()
    }

    /// Build a tensor from 8-bit samples, scaling each into `[0, 1]`.
    pub fn from_u8(height: u32, width: u32, channels: usize, bytes: &[u8]) -> Result<Self, TensorError> {
        let data = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Self::new(height, width, channels, data)
    }
}

fn element_count(height: u32, width: u32, channels: usize) -> Result<usize, TensorError> {
    (height as usize)
        .checked_mul(width as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(TensorError::TooLarge { height, width, channels })
}

fn float_to_byte(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

/// Batch of images as exchanged with the host. Every observed
/// invocation carries exactly one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageBatch {
    images: Vec<ImageTensor>,
}

impl ImageBatch {
    pub fn new(images: Vec<ImageTensor>) -> Self {
        Self { images }
    }

    pub fn single(image: ImageTensor) -> Self {
        Self { images: vec![image] }
    }

    pub fn first(&self) -> Option<&ImageTensor> {
        self.images.first()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
