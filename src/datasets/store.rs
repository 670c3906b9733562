use std::path::PathBuf;

use ndarray::prelude::*;

use super::{stack_images, DatasetError, ImageLoader};

/// Backing storage for the images of a partition. Row `i` of the store is
/// always paired with row `i` of the partition's labels.
pub trait ImageStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// New store holding the given rows, in the given order,
    /// new row `i` is old row `rows[i]`
    fn gather(&self, rows: &[usize]) -> Self
    where
        Self: Sized;

    /// Rows `[start, end)` as a `[B, S, S, 3]` array
    fn fetch(&self, start: usize, end: usize) -> Result<Array4<f32>, DatasetError>;
}

/// All images decoded and held in memory
impl ImageStore for Array4<f32> {
    fn len(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn gather(&self, rows: &[usize]) -> Self {
        ArrayBase::select(self, Axis(0), rows)
    }

    fn fetch(&self, start: usize, end: usize) -> Result<Array4<f32>, DatasetError> {
        Ok(self.slice(s![start..end, .., .., ..]).to_owned())
    }
}

/// Images left on disk and decoded only when a batch asks for them,
/// for datasets that do not fit in memory
#[derive(Debug, Clone)]
pub struct LazyImages {
    paths: Vec<PathBuf>,
    loader: ImageLoader,
}

impl LazyImages {
    pub fn new(paths: Vec<PathBuf>, loader: ImageLoader) -> Self {
        Self { paths, loader }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }
}

impl ImageStore for LazyImages {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn gather(&self, rows: &[usize]) -> Self {
        let paths = rows.iter().map(|&i| self.paths[i].clone()).collect();
        Self { paths, loader: self.loader }
    }

    fn fetch(&self, start: usize, end: usize) -> Result<Array4<f32>, DatasetError> {
        let imgs = self.paths[start..end]
            .iter()
            .map(|p| self.loader.load(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stack_images(&imgs, self.loader.shape()))
    }
}
