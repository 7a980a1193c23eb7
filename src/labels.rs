use fxhash::FxBuildHasher;
use indexmap::IndexMap;

type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Ordered mapping from label name to instruction index.
///
/// Label i always names instruction i, so insertion order is program order.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    map: FxMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable {
            map: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Append a label, giving it the next free instruction index.
    pub fn add(&mut self, name: &str) -> usize {
        let index = self.map.len();
        self.map.insert(name.to_string(), index);
        index
    }

    /// Exact, case-sensitive lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    pub fn reset(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.map.iter().map(|(name, index)| (name.as_str(), *index))
    }
}

#[cfg(test)]
mod tests {
    use super::LabelTable;

    #[test]
    fn labels_get_sequential_indices() {
        let mut table = LabelTable::new();
        assert_eq!(table.add("f0"), 0);
        assert_eq!(table.add("f1"), 1);
        assert_eq!(table.index_of("f0"), Some(0));
        assert_eq!(table.index_of("f1"), Some(1));
        assert_eq!(table.index_of("f2"), None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut table = LabelTable::new();
        table.add("loop");
        assert_eq!(table.index_of("Loop"), None);
        assert_eq!(table.index_of("loop"), Some(0));
    }

    #[test]
    fn reset_clears_all_entries() {
        let mut table = LabelTable::new();
        table.add("f0");
        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.index_of("f0"), None);
        assert_eq!(table.add("g0"), 0);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut table = LabelTable::new();
        for name in ["a", "b", "c"] {
            table.add(name);
        }
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
