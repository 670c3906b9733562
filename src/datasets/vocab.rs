use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::warn;

use super::DatasetError;

/// Bidirectional mapping between tag strings and dense indices,
/// indices are handed out in file order starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    tag_to_index: HashMap<String, usize>,
    index_to_tag: Vec<String>,
}

impl TagVocabulary {
    /// Reads one tag per line, surrounding whitespace is trimmed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lines(text.lines()))
    }

    /// Every line becomes an entry. A repeated tag takes the later index in
    /// `tag_to_index` while its earlier slot in `index_to_tag` is left behind.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = TagVocabulary::default();
        for line in lines {
            let tag = line.as_ref().trim().to_string();
            let index = vocab.index_to_tag.len();
            if let Some(prev) = vocab.tag_to_index.insert(tag.clone(), index) {
                warn!("duplicate tag {:?} at index {} shadows index {}", tag, index, prev);
            }
            vocab.index_to_tag.push(tag);
        }
        vocab
    }

    /// Width of the label vectors built from this vocabulary.
    pub fn len(&self) -> usize {
        self.index_to_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_tag.is_empty()
    }

    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.tag_to_index.get(tag).copied()
    }

    pub fn tag_of(&self, index: usize) -> Option<&str> {
        self.index_to_tag.get(index).map(|x| x.as_str())
    }

    pub fn index_to_tag(&self) -> &[String] {
        &self.index_to_tag
    }

    pub fn tag_to_index(&self) -> &HashMap<String, usize> {
        &self.tag_to_index
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn indices_follow_file_order() {
        let vocab = TagVocabulary::from_lines(["cat", "dog", "bird"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("cat"), Some(0));
        assert_eq!(vocab.index_of("dog"), Some(1));
        assert_eq!(vocab.index_of("bird"), Some(2));
        assert_eq!(vocab.index_of("owl"), None);
    }

    #[test]
    fn mappings_are_inverse() {
        let vocab = TagVocabulary::from_lines(["sky", "tree", "water", "person", "car"]);
        for tag in vocab.index_to_tag() {
            let i = vocab.index_of(tag).unwrap();
            assert_eq!(vocab.tag_of(i), Some(tag.as_str()));
        }
        for (tag, i) in vocab.tag_to_index() {
            assert_eq!(&vocab.index_to_tag()[*i], tag);
        }
    }

    #[test]
    fn lines_are_trimmed() {
        let vocab = TagVocabulary::from_lines(["  cat \t", "dog\r"]);
        assert_eq!(vocab.index_to_tag(), &["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn duplicate_leaves_stale_reverse_entry() {
        let vocab = TagVocabulary::from_lines(["cat", "dog", "cat"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("cat"), Some(2));
        assert_eq!(vocab.tag_of(0), Some("cat"));
        assert_eq!(vocab.tag_to_index().len(), 2);
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cat\ndog\nbird").unwrap();
        let vocab = TagVocabulary::from_path(file.path()).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.tag_of(2), Some("bird"));
    }

    #[test]
    fn missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TagVocabulary::from_path(dir.path().join("tag_map.txt")).unwrap_err();
        assert!(matches!(err, DatasetError::Resource { .. }));
    }
}
