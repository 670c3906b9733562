use log::debug;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{DatasetError, ImageStore};

/// One batch served by [`DataSet::next_batch`], row `i` of `images`
/// is tagged by row `i` of `labels`.
#[derive(Debug, Clone)]
pub struct Batch {
    /// [B, S, S, 3]
    pub images: Array4<f32>,
    /// [B, V]
    pub labels: Array2<f32>,
    /// manifest position of every row
    pub indices: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A single partition (train or validation) of a tagged image dataset.
///
/// Serves batches sequentially from the current ordering of its records. When a
/// batch would run past the last record, the epoch is over: the records are
/// reshuffled with the partition's own rng and the batch is taken from the start
/// of the new ordering. Records left over at the end of the old ordering are
/// not served in that epoch.
#[derive(Debug)]
pub struct DataSet<S: ImageStore = Array4<f32>> {
    images: S,
    labels: Array2<f32>,
    order: Vec<usize>,
    index_in_epoch: usize,
    epochs_completed: usize,
    rng: StdRng,
}

impl<S: ImageStore> DataSet<S> {
    /// Shuffles draw from an entropy seeded rng
    pub fn new(images: S, labels: Array2<f32>) -> Result<Self, DatasetError> {
        Self::with_rng(images, labels, StdRng::from_entropy())
    }

    /// Reproducible shuffles
    pub fn with_seed(images: S, labels: Array2<f32>, seed: u64) -> Result<Self, DatasetError> {
        Self::with_rng(images, labels, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(images: S, labels: Array2<f32>, rng: StdRng) -> Result<Self, DatasetError> {
        let n = labels.len_of(Axis(0));
        let order = (0..n).collect();
        Self::from_parts(images, labels, order, rng)
    }

    /// `order` gives the manifest position of each row
    pub(crate) fn from_parts(
        images: S,
        labels: Array2<f32>,
        order: Vec<usize>,
        rng: StdRng,
    ) -> Result<Self, DatasetError> {
        let n = labels.len_of(Axis(0));
        if images.len() != n || order.len() != n {
            return Err(DatasetError::MisalignedRecords { images: images.len(), labels: n });
        }
        Ok(Self { images, labels, order, index_in_epoch: 0, epochs_completed: 0, rng })
    }

    pub fn num_examples(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    pub fn index_in_epoch(&self) -> usize {
        self.index_in_epoch
    }

    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }

    /// Manifest positions of the records in their current order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn store(&self) -> &S {
        &self.images
    }

    /// The next `batch_size` records of the current epoch.
    ///
    /// On error the cursor, epoch counter and ordering are left as they were.
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Batch, DatasetError> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize);
        }
        let n = self.num_examples();
        let start = self.index_in_epoch;
        if batch_size <= n - start {
            let end = start + batch_size;
            let batch = take_rows(&self.images, &self.labels, &self.order, start, end)?;
            self.index_in_epoch = end;
            return Ok(batch);
        }
        if batch_size > n {
            return Err(DatasetError::BatchExceedsPartition { batch_size, num_examples: n });
        }

        // epoch boundary: one permutation for images, labels and order together
        let mut rng = self.rng.clone();
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(&mut rng);
        let images = self.images.gather(&perm);
        let labels = self.labels.select(Axis(0), &perm);
        let order: Vec<usize> = perm.iter().map(|&i| self.order[i]).collect();
        let batch = take_rows(&images, &labels, &order, 0, batch_size)?;

        self.images = images;
        self.labels = labels;
        self.order = order;
        self.rng = rng;
        self.epochs_completed += 1;
        self.index_in_epoch = batch_size;
        debug!("epoch {} finished, reshuffled {} records", self.epochs_completed, n);
        Ok(batch)
    }
}

fn take_rows<S: ImageStore>(
    images: &S,
    labels: &Array2<f32>,
    order: &[usize],
    start: usize,
    end: usize,
) -> Result<Batch, DatasetError> {
    let images = images.fetch(start, end)?;
    let labels = labels.slice(s![start..end, ..]).to_owned();
    let indices = order[start..end].to_vec();
    Ok(Batch { images, labels, indices })
}

impl DataSet<Array4<f32>> {
    /// [N, S, S, 3]
    pub fn images(&self) -> &Array4<f32> {
        &self.images
    }
}
