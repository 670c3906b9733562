use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::manifest::{read_manifest, ManifestEntry};
use super::{stack_images, stack_labels, DataSet, DatasetError, ImageLoader, ImageStore, LabelEncoder, LazyImages, RecordError, TagVocabulary};
use crate::Config;

/// How records are assigned to the train and validation partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum SplitPolicy {
    /// The first records of the manifest train, the last ones validate.
    /// Membership follows the manifest order, so a sorted manifest gives biased partitions.
    Positional,
    /// Same partition sizes, records drawn from a seeded permutation
    Random,
}

/// What a failing manifest record does to the build.
/// Either way no partition is produced when any record fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum ErrorPolicy {
    FailFast,
    /// Keep going and report every failed record at the end
    CollectAll,
}

/// Builds the train and validation partitions of a dataset
pub trait DatasetBuilder: Config {
    type Store: ImageStore;
    fn build(&self) -> Result<TagDataSplits<Self::Store>, DatasetError>;
}

/// The two partitions, and the vocabulary their label columns refer to
#[derive(Debug)]
pub struct TagDataSplits<S: ImageStore = Array4<f32>> {
    pub train: DataSet<S>,
    pub validation: DataSet<S>,
    pub vocabulary: TagVocabulary,
}

impl<S: ImageStore> TagDataSplits<S> {
    /// Column `i` of every label matrix is tag `index_to_tag()[i]`
    pub fn index_to_tag(&self) -> &[String] {
        self.vocabulary.index_to_tag()
    }
}

/// Main configuration parameters for a tagged image dataset.
///
/// `path` holds the vocabulary file (one tag per line), the manifest
/// (`<file_name> [tag1, tag2, ...]` per line) and the images the manifest names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagDatasetParams {
    pub path: PathBuf,
    pub vocabulary_file: String,
    pub manifest_file: String,
    /// in (0, 1)
    pub validation_fraction: f64,
    pub image: ImageLoader,
    pub split: SplitPolicy,
    pub errors: ErrorPolicy,
    /// seeds the split and both partitions' shuffles, entropy if `None`
    pub seed: Option<u64>,
    /// read at most this many manifest records
    pub max_records: Option<usize>,
}

impl Default for TagDatasetParams {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            vocabulary_file: "tag_map.txt".into(),
            manifest_file: "tags.txt".into(),
            validation_fraction: 0.25,
            image: ImageLoader::default(),
            split: SplitPolicy::Positional,
            errors: ErrorPolicy::FailFast,
            seed: None,
            max_records: None,
        }
    }
}

impl DatasetBuilder for TagDatasetParams {
    type Store = Array4<f32>;

    /// Decodes every image up front
    fn build(&self) -> Result<TagDataSplits<Array4<f32>>, DatasetError> {
        let (vocabulary, entries) = self.read_resources()?;
        let encoder = LabelEncoder::new(&vocabulary);

        let records = self.load_records(&entries, |entry| {
            let image = self.image.load(self.path.join(&entry.file_name))?;
            let label = encoder.encode(&entry.tags[..])?;
            Ok((image, label))
        })?;
        let (images, labels): (Vec<_>, Vec<_>) = records.into_iter().unzip();
        let images = stack_images(&images, self.image.shape());
        let labels = stack_labels(&labels, vocabulary.len());

        self.split_records(images, labels, vocabulary)
    }
}

impl TagDatasetParams {
    pub fn new<P: AsRef<Path>>(path: P, validation_fraction: f64) -> Self {
        Self { path: path.as_ref().to_path_buf(), validation_fraction, ..Default::default() }
    }

    pub fn from_ron_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("Cannot read config {:?}", path))?;
        let mut params = Self::default();
        params.load_config(&text)?;
        Ok(params)
    }

    /// Labels are encoded and checked now, images are decoded batch by batch
    pub fn build_lazy(&self) -> Result<TagDataSplits<LazyImages>, DatasetError> {
        let (vocabulary, entries) = self.read_resources()?;
        let encoder = LabelEncoder::new(&vocabulary);

        let records = self.load_records(&entries, |entry| {
            let label = encoder.encode(&entry.tags[..])?;
            Ok((self.path.join(&entry.file_name), label))
        })?;
        let (paths, labels): (Vec<_>, Vec<_>) = records.into_iter().unzip();
        let images = LazyImages::new(paths, self.image);
        let labels = stack_labels(&labels, vocabulary.len());

        self.split_records(images, labels, vocabulary)
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.path.join(&self.vocabulary_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(&self.manifest_file)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        let f = self.validation_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(DatasetError::InvalidFraction(f));
        }
        Ok(())
    }

    fn read_resources(&self) -> Result<(TagVocabulary, Vec<ManifestEntry>), DatasetError> {
        self.validate()?;
        let vocabulary = TagVocabulary::from_path(self.vocabulary_path())?;
        let entries = read_manifest(self.manifest_path(), self.max_records)?;
        if entries.is_empty() {
            return Err(DatasetError::EmptyManifest(self.manifest_path()));
        }
        Ok((vocabulary, entries))
    }

    /// Runs `load` over every entry in manifest order, applying the error policy
    fn load_records<T, F>(&self, entries: &[ManifestEntry], mut load: F) -> Result<Vec<T>, DatasetError>
    where
        F: FnMut(&ManifestEntry) -> Result<T, DatasetError>,
    {
        let mut records = Vec::with_capacity(entries.len());
        let mut failed = Vec::new();
        for entry in entries {
            match load(entry) {
                Ok(record) => records.push(record),
                Err(e) => match self.errors {
                    ErrorPolicy::FailFast => return Err(e.at_line(entry.line)),
                    ErrorPolicy::CollectAll => failed.push(RecordError {
                        line: entry.line,
                        file_name: entry.file_name.clone(),
                        error: e,
                    }),
                },
            }
        }
        if !failed.is_empty() {
            return Err(DatasetError::Records(failed));
        }
        Ok(records)
    }

    /// Number of (train, validation) records out of `total`
    pub fn split_sizes(&self, total: usize) -> (usize, usize) {
        let validation_count = (total as f64 * self.validation_fraction).floor() as usize;
        (total - validation_count, validation_count)
    }

    fn split_rows(&self, total: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
        let (train_count, _) = self.split_sizes(total);
        match self.split {
            SplitPolicy::Positional => ((0..train_count).collect(), (train_count..total).collect()),
            SplitPolicy::Random => {
                let mut perm: Vec<usize> = (0..total).collect();
                perm.shuffle(rng);
                let mut validation = perm.split_off(train_count);
                perm.sort_unstable();
                validation.sort_unstable();
                (perm, validation)
            }
        }
    }

    fn split_records<S: ImageStore>(
        &self,
        images: S,
        labels: Array2<f32>,
        vocabulary: TagVocabulary,
    ) -> Result<TagDataSplits<S>, DatasetError> {
        let total = labels.len_of(Axis(0));
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (train_rows, validation_rows) = self.split_rows(total, &mut rng);

        let partition = |rows: Vec<usize>, rng: StdRng| {
            DataSet::from_parts(images.gather(&rows), labels.select(Axis(0), &rows), rows, rng)
        };
        let train = partition(train_rows, StdRng::seed_from_u64(rng.gen()))?;
        let validation = partition(validation_rows, StdRng::seed_from_u64(rng.gen()))?;

        info!(
            "loaded {} records from {:?}: {} train, {} validation, {} tags",
            total,
            self.path,
            train.num_examples(),
            validation.num_examples(),
            vocabulary.len()
        );
        Ok(TagDataSplits { train, validation, vocabulary })
    }
}

/// Eagerly loads `path` with default parameters and a `validation_fraction` split
pub fn build_dataset<P: AsRef<Path>>(path: P, validation_fraction: f64) -> Result<TagDataSplits, DatasetError> {
    TagDatasetParams::new(path, validation_fraction).build()
}
