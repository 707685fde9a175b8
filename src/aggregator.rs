use crate::domain::IdentifierSet;
use crate::error::AtlasError;
use crate::index::IndexClient;

/// One narrowing stage: maps an identifier set to the values of one index
/// field. An empty input short-circuits to an empty output without
/// touching the index.
pub struct IdentifierStageAggregator<'a, C: IndexClient + ?Sized> {
    index: &'a C,
    term_field: &'a str,
    value_field: &'a str,
    limit: usize,
}

impl<'a, C: IndexClient + ?Sized> IdentifierStageAggregator<'a, C> {
    pub fn new(index: &'a C, term_field: &'a str, value_field: &'a str, limit: usize) -> Self {
        Self {
            index,
            term_field,
            value_field,
            limit,
        }
    }

    /// Bounded result list, in index order, duplicates included.
    pub fn narrow_values(&self, input: &IdentifierSet) -> Result<Vec<String>, AtlasError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        self.index
            .lookup_by_term(self.term_field, input, self.value_field, self.limit)
    }

    pub fn narrow(&self, input: &IdentifierSet) -> Result<IdentifierSet, AtlasError> {
        Ok(self.narrow_values(input)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct CountingIndex {
        calls: Mutex<usize>,
        rows: Vec<String>,
    }

    impl IndexClient for CountingIndex {
        fn lookup_by_term(
            &self,
            _term_field: &str,
            _terms: &IdentifierSet,
            _value_field: &str,
            limit: usize,
        ) -> Result<Vec<String>, AtlasError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.rows.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn empty_input_short_circuits_without_lookup() {
        let index = CountingIndex {
            calls: Mutex::new(0),
            rows: vec!["C1".to_string()],
        };
        let stage = IdentifierStageAggregator::new(&index, "gene_id", "cell_id", 10);

        let narrowed = stage.narrow(&IdentifierSet::new()).unwrap();
        assert!(narrowed.is_empty());
        assert_eq!(*index.calls.lock().unwrap(), 0);
    }

    #[test]
    fn narrow_deduplicates_values() {
        let index = CountingIndex {
            calls: Mutex::new(0),
            rows: vec!["C1".to_string(), "C1".to_string(), "C2".to_string()],
        };
        let stage = IdentifierStageAggregator::new(&index, "gene_id", "cell_id", 10);

        let input: IdentifierSet = ["G1".to_string()].into_iter().collect();
        let narrowed = stage.narrow(&input).unwrap();
        assert_eq!(narrowed.len(), 2);
        assert_eq!(*index.calls.lock().unwrap(), 1);
    }

    #[test]
    fn narrow_values_respects_limit() {
        let index = CountingIndex {
            calls: Mutex::new(0),
            rows: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        let stage = IdentifierStageAggregator::new(&index, "cell_id", "organism_part", 2);

        let input: IdentifierSet = ["C1".to_string()].into_iter().collect();
        let values = stage.narrow_values(&input).unwrap();
        assert_eq!(values.len(), 2);
    }
}
