//! Loading of multi-label image datasets and the batching of their partitions.
//!
//! A dataset directory holds a vocabulary file (one tag per line), a manifest
//! naming each image and its tags, and the images themselves. Building it yields a
//! train and a validation [`DataSet`], each serving shuffled batches epoch after epoch.

use ndarray::prelude::*;

pub mod batch;
pub mod builder;
pub mod error;
pub mod labels;
pub mod loader;
pub mod manifest;
pub mod store;
pub mod vocab;

pub use batch::{Batch, DataSet};
pub use builder::{build_dataset, DatasetBuilder, ErrorPolicy, SplitPolicy, TagDataSplits, TagDatasetParams};
pub use error::{DatasetError, RecordError};
pub use labels::LabelEncoder;
pub use loader::{FilterKind, ImageLoader, PixelScale, IMAGE_SIZE};
pub use manifest::ManifestEntry;
pub use store::{ImageStore, LazyImages};
pub use vocab::TagVocabulary;

/// Stacks same sized images along a new first axis, [H, W, C] -> [B, H, W, C].
/// `shape` is the per image shape, used as is when `imgs` is empty.
pub fn stack_images(imgs: &[Array3<f32>], shape: (usize, usize, usize)) -> Array4<f32> {
    let mut out = Array4::<f32>::zeros((imgs.len(), shape.0, shape.1, shape.2));
    for (mut slot, img) in out.outer_iter_mut().zip(imgs) {
        slot.assign(img);
    }
    out
}

/// Label rows to a [B, V] matrix
pub fn stack_labels(rows: &[Array1<f32>], width: usize) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros((rows.len(), width));
    for (mut slot, row) in out.outer_iter_mut().zip(rows) {
        slot.assign(row);
    }
    out
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn stack_keeps_order() {
        let imgs: Vec<_> = (0..3).map(|i| Array3::from_elem((2, 2, 3), i as f32)).collect();
        let stacked = stack_images(&imgs, (2, 2, 3));
        assert_eq!(stacked.dim(), (3, 2, 2, 3));
        for i in 0..3 {
            assert!(stacked.slice(s![i, .., .., ..]).iter().all(|x| *x == i as f32));
        }
    }

    #[test]
    fn stack_empty() {
        assert_eq!(stack_images(&[], (4, 4, 3)).dim(), (0, 4, 4, 3));
        assert_eq!(stack_labels(&[], 5).dim(), (0, 5));
    }

    #[test]
    fn stack_label_rows() {
        let rows = vec![array![1.0f32, 0.0, 1.0], array![0.0, 1.0, 0.0]];
        let labels = stack_labels(&rows, 3);
        assert_eq!(labels, array![[1.0f32, 0.0, 1.0], [0.0, 1.0, 0.0]]);
    }
}
