use ndarray::prelude::*;

use super::{DatasetError, TagVocabulary};

/// Turns tag lists into multi-hot vectors of the vocabulary's width and back.
#[derive(Clone, Copy)]
pub struct LabelEncoder<'a> {
    vocab: &'a TagVocabulary,
}

impl<'a> LabelEncoder<'a> {
    pub fn new(vocab: &'a TagVocabulary) -> Self {
        Self { vocab }
    }

    pub fn width(&self) -> usize {
        self.vocab.len()
    }

    /// A tag missing from the vocabulary is an error, never skipped.
    pub fn encode<S: AsRef<str>>(&self, tags: &[S]) -> Result<Array1<f32>, DatasetError> {
        let mut row = Array1::<f32>::zeros(self.width());
        for tag in tags {
            let tag = tag.as_ref();
            let i = self.vocab.index_of(tag).ok_or_else(|| DatasetError::VocabularyMismatch {
                tag: tag.to_string(),
            })?;
            row[i] = 1.0;
        }
        Ok(row)
    }

    /// Tags whose entry is set, in index order.
    pub fn decode(&self, row: ArrayView1<f32>) -> Vec<&'a str> {
        let vocab = self.vocab;
        row.iter()
            .enumerate()
            .filter(|(_, x)| **x == 1.0)
            .filter_map(|(i, _)| vocab.tag_of(i))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use itertools::Itertools;
    use ndarray::array;

    use super::*;

    fn vocab() -> TagVocabulary {
        TagVocabulary::from_lines(["cat", "dog", "bird"])
    }

    #[test]
    fn encode_multi_hot() {
        let vocab = vocab();
        let enc = LabelEncoder::new(&vocab);
        let row = enc.encode(&["cat", "bird"]).unwrap();
        assert_eq!(row, array![1.0f32, 0.0, 1.0]);
    }

    #[test]
    fn encode_is_order_independent_and_idempotent() {
        let vocab = vocab();
        let enc = LabelEncoder::new(&vocab);
        let a = enc.encode(&["bird", "cat"]).unwrap();
        let b = enc.encode(&["cat", "bird", "cat"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, enc.encode(&["bird", "cat"]).unwrap());
    }

    #[test]
    fn empty_tag_list_is_all_zero() {
        let vocab = vocab();
        let enc = LabelEncoder::new(&vocab);
        let row = enc.encode::<&str>(&[]).unwrap();
        assert_eq!(row, Array1::<f32>::zeros(3));
    }

    #[test]
    fn unknown_tag_fails() {
        let vocab = vocab();
        let enc = LabelEncoder::new(&vocab);
        match enc.encode(&["cat", "owl"]) {
            Err(DatasetError::VocabularyMismatch { tag }) => assert_eq!(tag, "owl"),
            other => panic!("expected a vocabulary mismatch, got {:?}", other),
        }
    }

    #[test]
    fn decode_round_trips_every_subset() {
        let vocab = TagVocabulary::from_lines(["a", "b", "c", "d", "e"]);
        let enc = LabelEncoder::new(&vocab);
        for k in 0..=vocab.len() {
            for subset in vocab.index_to_tag().iter().map(|x| x.as_str()).combinations(k) {
                let row = enc.encode(&subset[..]).unwrap();
                let decoded: BTreeSet<_> = enc.decode(row.view()).into_iter().collect();
                let expected: BTreeSet<_> = subset.into_iter().collect();
                assert_eq!(decoded, expected);
            }
        }
    }
}
