use std::fs;
use std::path::Path;

use log::debug;

use super::DatasetError;

/// One manifest record: `<file_name> [tag1, tag2, ...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based line number in the manifest
    pub line: usize,
    pub file_name: String,
    pub tags: Vec<String>,
}

impl ManifestEntry {
    /// Brackets and commas are decoration, tokens are whitespace separated.
    /// Returns `None` for a blank line.
    pub fn parse(line: usize, text: &str) -> Option<Self> {
        let cleaned: String = text.chars().filter(|c| !matches!(c, '[' | ']' | ',')).collect();
        let mut bits = cleaned.split_whitespace();
        let file_name = bits.next()?.to_string();
        let tags = bits.map(|x| x.to_string()).collect();
        Some(ManifestEntry { line, file_name, tags })
    }
}

/// Entries in manifest order, at most `limit` of them.
pub fn parse_manifest(text: &str, limit: Option<usize>) -> Vec<ManifestEntry> {
    let limit = limit.unwrap_or(usize::MAX);
    text.lines()
        .enumerate()
        .filter_map(|(i, l)| {
            let entry = ManifestEntry::parse(i + 1, l);
            if entry.is_none() {
                debug!("skipping blank manifest line {}", i + 1);
            }
            entry
        })
        .take(limit)
        .collect()
}

pub fn read_manifest<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Vec<ManifestEntry>, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Resource {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_manifest(&text, limit))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_list_punctuation() {
        let entry = ManifestEntry::parse(1, "img1.jpg [cat, bird]").unwrap();
        assert_eq!(entry.file_name, "img1.jpg");
        assert_eq!(entry.tags, vec!["cat", "bird"]);
    }

    #[test]
    fn no_tags() {
        let entry = ManifestEntry::parse(7, "img2.png []").unwrap();
        assert_eq!(entry.line, 7);
        assert_eq!(entry.file_name, "img2.png");
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn irregular_spacing() {
        let entry = ManifestEntry::parse(1, "  a.png\t[sky, tree ,  water]  ").unwrap();
        assert_eq!(entry.tags, vec!["sky", "tree", "water"]);
    }

    #[test]
    fn tags_need_whitespace_between_them() {
        let entry = ManifestEntry::parse(1, "a.png [sky,tree]").unwrap();
        assert_eq!(entry.tags, vec!["skytree"]);
    }

    #[test]
    fn manifest_order_and_line_numbers() {
        let text = "a.png [cat]\n\nb.png [dog, cat]\nc.png []\n";
        let entries = parse_manifest(text, None);
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        assert_eq!(entries[1].line, 3);
    }

    #[test]
    fn limit_counts_records() {
        let text = "a.png [cat]\n\nb.png [dog]\nc.png [cat]\n";
        let entries = parse_manifest(text, Some(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].file_name, "b.png");
    }

    #[test]
    fn missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(dir.path().join("tags.txt"), None).unwrap_err();
        assert!(matches!(err, DatasetError::Resource { .. }));
    }
}
