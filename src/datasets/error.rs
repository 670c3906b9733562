use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building a tagged dataset or serving
/// batches from one of its partitions.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The vocabulary or manifest resource is missing or unreadable.
    #[error("Cannot read resource {path:?}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot decode image {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A manifest tag is not part of the vocabulary.
    #[error("Tag {tag:?} is not in the vocabulary")]
    VocabularyMismatch { tag: String },

    #[error("Batch size {batch_size} exceeds the {num_examples} records of the partition")]
    BatchExceedsPartition { batch_size: usize, num_examples: usize },

    #[error("Batch size cannot be zero")]
    InvalidBatchSize,

    #[error("Validation fraction {0} is outside (0, 1)")]
    InvalidFraction(f64),

    #[error("Image records ({images}) and label records ({labels}) are not aligned")]
    MisalignedRecords { images: usize, labels: usize },

    #[error("Manifest {0:?} contains no records")]
    EmptyManifest(PathBuf),

    /// A single manifest record failed, `line` is 1-based.
    #[error("Manifest line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: Box<DatasetError>,
    },

    /// Every failing record, collected when the build does not stop at the first one.
    #[error("{} manifest records failed to load:\n{}", .0.len(), RecordList(.0))]
    Records(Vec<RecordError>),
}

impl DatasetError {
    pub(crate) fn at_line(self, line: usize) -> Self {
        DatasetError::Record { line, source: Box::new(self) }
    }
}

/// One failed manifest record.
#[derive(Debug)]
pub struct RecordError {
    pub line: usize,
    pub file_name: String,
    pub error: DatasetError,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.line, self.file_name, self.error)
    }
}

struct RecordList<'a>(&'a [RecordError]);

impl fmt::Display for RecordList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", record)?;
        }
        Ok(())
    }
}
