use crate::dataset::{DataRow, DataTable, TableKind};
use crate::error::{MaveError, MaveResult};
use crate::hgvs::{CoordinateSpace, VariantNotation};
use crate::report::{ConflictError, Issue, IssueCode};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Scores and counts joined on their primary key, with a 1-based ordinal
/// index for every distinct key.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconciledDataset {
    scores: DataTable,
    counts: Option<DataTable>,
    keys: Vec<VariantNotation>,
    index: HashMap<VariantNotation, usize>,
}

/// A variant ready for persistence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantRecord {
    pub index: usize,
    pub urn: String,
    pub hgvs_nt: Option<String>,
    pub hgvs_splice: Option<String>,
    pub hgvs_pro: Option<String>,
    pub score_data: BTreeMap<String, Option<f64>>,
    pub count_data: BTreeMap<String, Option<f64>>,
}

/// Join the scores table with an optional counts table.
///
/// Keys are indexed in scores order (counts order when scores is empty).
/// Counts keys missing from a non-empty scores table are kept, indexed after
/// every scores key and reported as conflicts.
pub fn reconcile(
    scores: DataTable,
    counts: Option<DataTable>,
) -> MaveResult<(ReconciledDataset, Vec<ConflictError>)> {
    let counts_len = counts.as_ref().map_or(0, DataTable::len);
    if scores.is_empty() && counts_len == 0 {
        return Err(MaveError::EmptyDataset);
    }

    if let (Some(s), Some(c)) = (
        scores.key_space(),
        counts.as_ref().and_then(DataTable::key_space),
    ) {
        if s != c && !scores.is_empty() && counts_len > 0 {
            return Err(MaveError::KeyColumnMismatch {
                scores: s.column(),
                counts: c.column(),
            });
        }
    }

    let mut keys = Vec::with_capacity(scores.len().max(counts_len));
    let mut index = HashMap::with_capacity(keys.capacity());
    let mut conflicts = Vec::new();

    for row in scores.rows() {
        push_key(&mut keys, &mut index, &row.primary_key);
    }
    if let Some(counts) = &counts {
        let scores_empty = scores.is_empty();
        for row in counts.rows() {
            if index.contains_key(&row.primary_key) {
                continue;
            }
            if !scores_empty {
                debug!(key = %row.primary_key, line = row.line, "counts key missing from scores");
                conflicts.push(Issue::row(
                    TableKind::Counts,
                    row.line,
                    IssueCode::OrphanCountsKeyError,
                    format!(
                        "variant '{}' has counts but does not appear in the scores file",
                        row.primary_key
                    ),
                ));
            }
            push_key(&mut keys, &mut index, &row.primary_key);
        }
    }

    Ok((
        ReconciledDataset {
            scores,
            counts,
            keys,
            index,
        },
        conflicts,
    ))
}

fn push_key(
    keys: &mut Vec<VariantNotation>,
    index: &mut HashMap<VariantNotation, usize>,
    key: &VariantNotation,
) {
    if !index.contains_key(key) {
        keys.push(key.clone());
        index.insert(key.clone(), keys.len());
    }
}

impl ReconciledDataset {
    pub fn scores(&self) -> &DataTable {
        &self.scores
    }

    pub fn counts(&self) -> Option<&DataTable> {
        self.counts.as_ref()
    }

    /// Number of distinct variants.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index_of(&self, key: &VariantNotation) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// `(index, key)` pairs in index order.
    pub fn keys(&self) -> impl Iterator<Item = (usize, &VariantNotation)> {
        self.keys.iter().enumerate().map(|(i, k)| (i + 1, k))
    }

    /// One record per distinct variant, URNs formed as `<dataset_urn>#<index>`.
    pub fn records(&self, dataset_urn: &str) -> Vec<VariantRecord> {
        let scores_by_key = rows_by_key(&self.scores);
        let counts_by_key = self.counts.as_ref().map(rows_by_key).unwrap_or_default();

        self.keys()
            .map(|(index, key)| {
                let score_row = scores_by_key.get(key).copied();
                let count_row = counts_by_key.get(key).copied();
                let hgvs = |space: CoordinateSpace| {
                    score_row
                        .and_then(|r| r.variant(space))
                        .or_else(|| count_row.and_then(|r| r.variant(space)))
                        .map(|v| v.to_string())
                };
                VariantRecord {
                    index,
                    urn: format!("{dataset_urn}#{index}"),
                    hgvs_nt: hgvs(CoordinateSpace::Nucleotide),
                    hgvs_splice: hgvs(CoordinateSpace::Transcript),
                    hgvs_pro: hgvs(CoordinateSpace::Protein),
                    score_data: value_map(&self.scores, score_row),
                    count_data: self
                        .counts
                        .as_ref()
                        .map(|c| value_map(c, count_row))
                        .unwrap_or_default(),
                }
            })
            .collect()
    }
}

fn rows_by_key(table: &DataTable) -> HashMap<&VariantNotation, &DataRow> {
    table.rows().iter().map(|r| (&r.primary_key, r)).collect()
}

fn value_map(table: &DataTable, row: Option<&DataRow>) -> BTreeMap<String, Option<f64>> {
    let Some(row) = row else {
        return BTreeMap::new();
    };
    table
        .columns()
        .iter()
        .cloned()
        .zip(row.values.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hgvs::parse;

    fn row(line: usize, key: &str, values: Vec<Option<f64>>) -> DataRow {
        let key = parse(key, CoordinateSpace::Nucleotide).unwrap();
        DataRow {
            line,
            primary_key: key.clone(),
            hgvs_nt: Some(key),
            hgvs_tx: None,
            hgvs_pro: None,
            values,
        }
    }

    fn table(kind: TableKind, column: &str, keys: &[&str]) -> DataTable {
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, k)| row(i + 2, k, vec![Some(i as f64)]))
            .collect();
        DataTable::new(
            kind,
            Some(CoordinateSpace::Nucleotide),
            vec![column.to_string()],
            rows,
        )
    }

    #[test]
    fn indices_follow_scores_order() {
        let scores = table(TableKind::Scores, "score", &["c.4G>A", "c.1A>T"]);
        let counts = table(TableKind::Counts, "count", &["c.1A>T", "c.4G>A"]);
        let (dataset, conflicts) = reconcile(scores, Some(counts)).unwrap();
        assert!(conflicts.is_empty());
        let keys: Vec<String> = dataset.keys().map(|(_, k)| k.to_string()).collect();
        assert_eq!(keys, vec!["c.4G>A", "c.1A>T"]);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn counts_only_uses_counts_order() {
        let scores = DataTable::empty(TableKind::Scores);
        let counts = table(TableKind::Counts, "count", &["c.9A>T", "c.2T>A"]);
        let (dataset, conflicts) = reconcile(scores, Some(counts)).unwrap();
        assert!(conflicts.is_empty());
        let key = parse("c.2T>A", CoordinateSpace::Nucleotide).unwrap();
        assert_eq!(dataset.index_of(&key), Some(2));
    }

    #[test]
    fn orphan_counts_indexed_last() {
        let scores = table(TableKind::Scores, "score", &["c.4G>A"]);
        let counts = table(TableKind::Counts, "count", &["c.100A>T", "c.4G>A"]);
        let (dataset, conflicts) = reconcile(scores, Some(counts)).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].code, IssueCode::OrphanCountsKeyError);
        assert_eq!(conflicts[0].row_number, 2);
        let orphan = parse("c.100A>T", CoordinateSpace::Nucleotide).unwrap();
        assert_eq!(dataset.index_of(&orphan), Some(2));
    }

    #[test]
    fn empty_dataset_is_fatal() {
        let err = reconcile(
            DataTable::empty(TableKind::Scores),
            Some(DataTable::empty(TableKind::Counts)),
        )
        .unwrap_err();
        assert!(matches!(err, MaveError::EmptyDataset));
    }

    #[test]
    fn mismatched_key_columns() {
        let scores = table(TableKind::Scores, "score", &["c.4G>A"]);
        let pro = parse("p.Val2Ala", CoordinateSpace::Protein).unwrap();
        let counts = DataTable::new(
            TableKind::Counts,
            Some(CoordinateSpace::Protein),
            vec!["count".to_string()],
            vec![DataRow {
                line: 2,
                primary_key: pro.clone(),
                hgvs_nt: None,
                hgvs_tx: None,
                hgvs_pro: Some(pro),
                values: vec![Some(3.0)],
            }],
        );
        let err = reconcile(scores, Some(counts)).unwrap_err();
        assert!(matches!(
            err,
            MaveError::KeyColumnMismatch {
                scores: "hgvs_nt",
                counts: "hgvs_pro"
            }
        ));
    }

    #[test]
    fn records_carry_urns_and_values() {
        let scores = table(TableKind::Scores, "score", &["c.4G>A", "c.1A>T"]);
        let counts = table(TableKind::Counts, "count", &["c.1A>T"]);
        let (dataset, _) = reconcile(scores, Some(counts)).unwrap();
        let records = dataset.records("urn:mavedb:00000001-a-1");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].urn, "urn:mavedb:00000001-a-1#1");
        assert_eq!(records[0].hgvs_nt.as_deref(), Some("c.4G>A"));
        assert_eq!(records[0].score_data["score"], Some(0.0));
        assert!(records[0].count_data.is_empty());
        assert_eq!(records[1].urn, "urn:mavedb:00000001-a-1#2");
        assert_eq!(records[1].count_data["count"], Some(0.0));
    }
}
