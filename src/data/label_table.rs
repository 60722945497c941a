use std::io::BufRead;
use std::path::Path;
use anyhow::Context;
use crate::utils;

/// Ordered class labels, addressed by class index. Immutable once loaded.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Reads labels one per line, stopping at the first empty line or end of input.
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        Ok(Self::new(utils::read_lines_until_blank(reader)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open label file {}", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Label of a class index.
    ///
    /// # Panics
    ///
    /// When the index has no label, which means the model and label table do not belong together.
    pub fn get(&self, class_index: usize) -> &str {
        match self.labels.get(class_index) {
            Some(label) => label,
            None => panic!(
                "Class index {} has no label ({} labels loaded): model and label table do not match",
                class_index,
                self.labels.len()
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl From<Vec<String>> for LabelTable {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<&[&str]> for LabelTable {
    fn from(labels: &[&str]) -> Self {
        Self::new(labels.iter().map(|x| x.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_blank_line() {
        let table = LabelTable::from_reader("$1\r\n$2\n$5\n\n$10\n".as_bytes()).unwrap();
        assert_eq!(table.labels(), &["$1", "$2", "$5"]);
    }

    #[test]
    fn reads_to_end_without_blank_line() {
        let table = LabelTable::from_reader("$1\n$125".as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), "$125");
    }

    #[test]
    #[should_panic(expected = "has no label")]
    fn out_of_range_lookup_panics() {
        let table = LabelTable::from(&["$1"][..]);
        table.get(3);
    }
}
