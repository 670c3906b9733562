use std::io;
use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::ImageError;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::DatasetError;

pub const IMAGE_SIZE: u32 = 224;

/// Resampling filter used when stretching to the canonical size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum FilterKind {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::Triangle
    }
}

impl From<FilterKind> for FilterType {
    fn from(f: FilterKind) -> Self {
        match f {
            FilterKind::Nearest => FilterType::Nearest,
            FilterKind::Triangle => FilterType::Triangle,
            FilterKind::CatmullRom => FilterType::CatmullRom,
            FilterKind::Gaussian => FilterType::Gaussian,
            FilterKind::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Range of the channel values handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum PixelScale {
    /// [0, 1]
    Unit,
    /// [0, 255]
    Byte,
}

impl Default for PixelScale {
    fn default() -> Self {
        PixelScale::Unit
    }
}

impl PixelScale {
    fn factor(&self) -> f32 {
        match self {
            PixelScale::Unit => 1.0 / 255.0,
            PixelScale::Byte => 1.0,
        }
    }
}

/// Decodes image files into `[S, S, 3]` RGB arrays.
/// Images are stretched to the square side, aspect ratio is not kept.
/// Channels default to [0, 1], not the files' own [0, 255]; use `PixelScale::Byte` for the latter.
/// TODO: center crop before resizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLoader {
    pub side: u32,
    pub filter: FilterKind,
    pub scale: PixelScale,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(IMAGE_SIZE)
    }
}

impl ImageLoader {
    pub fn new(side: u32) -> Self {
        Self { side, filter: FilterKind::default(), scale: PixelScale::default() }
    }

    pub fn with_filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_scale(mut self, scale: PixelScale) -> Self {
        self.scale = scale;
        self
    }

    /// Shape of every array this loader produces
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.side as usize, self.side as usize, 3)
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Array3<f32>, DatasetError> {
        let path = path.as_ref();
        let io_err = |source: io::Error| DatasetError::Io { path: path.to_path_buf(), source };

        let img = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?
            .decode()
            .map_err(|e| match e {
                ImageError::IoError(source) => DatasetError::Io { path: path.to_path_buf(), source },
                source => DatasetError::ImageDecode { path: path.to_path_buf(), source },
            })?;

        let img = img.resize_exact(self.side, self.side, self.filter.into()).into_rgb8();
        let factor = self.scale.factor();
        let arr = Array3::from_shape_fn(self.shape(), |(r, c, k)| {
            f32::from(img.get_pixel(c as u32, r as u32)[k]) * factor
        });
        Ok(arr)
    }
}
