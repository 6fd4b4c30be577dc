//! Label resolution
//!
//! Keys match case-insensitively. Duplicate keys are allowed, but only the
//! first label with a given key is reachable.

/// Label key to position lookup, rebuilt on every re-index
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    entries: Vec<(String, usize)>,
}

impl LabelIndex {
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn push(&mut self, key: &str, position: usize) {
        self.entries.push((normalize(key), position));
    }

    /// Position of the first label matching `key`
    pub fn find(&self, key: &str) -> Option<usize> {
        let key = normalize(key);
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, position)| *position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn keys_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        let mut labels = LabelIndex::default();
        labels.push("start", 3);

        assert_eq!(labels.find("Start"), Some(3));
        assert_eq!(labels.find("START"), Some(3));
        assert_eq!(labels.find("end"), None);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut labels = LabelIndex::default();
        labels.push("Start", 1);
        labels.push("Start", 5);

        assert_eq!(labels.find("start"), Some(1));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match("Ending", "ending"));
        assert!(!keys_match("Ending", "ending "));
    }
}
