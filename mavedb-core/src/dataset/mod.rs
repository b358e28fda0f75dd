//! Validated score and count tables and the dataset reconciled from them.

pub mod reconcile;

pub use reconcile::{reconcile, ReconciledDataset, VariantRecord};

use crate::hgvs::{CoordinateSpace, VariantNotation};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Scores,
    Counts,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Scores => "scores",
            TableKind::Counts => "counts",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted row. `values` follows the table's numeric column order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataRow {
    pub line: usize,
    pub primary_key: VariantNotation,
    pub hgvs_nt: Option<VariantNotation>,
    pub hgvs_tx: Option<VariantNotation>,
    pub hgvs_pro: Option<VariantNotation>,
    pub values: Vec<Option<f64>>,
}

impl DataRow {
    /// The parsed cell of the given coordinate space, if the table had one.
    pub fn variant(&self, space: CoordinateSpace) -> Option<&VariantNotation> {
        match space {
            CoordinateSpace::Nucleotide => self.hgvs_nt.as_ref(),
            CoordinateSpace::Transcript => self.hgvs_tx.as_ref(),
            CoordinateSpace::Protein => self.hgvs_pro.as_ref(),
        }
    }
}

/// An ingested table: rows in file order, keys unique.
///
/// `key_space` is `None` only for a table read from an empty stream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataTable {
    kind: TableKind,
    key_space: Option<CoordinateSpace>,
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl DataTable {
    pub(crate) fn new(
        kind: TableKind,
        key_space: Option<CoordinateSpace>,
        columns: Vec<String>,
        rows: Vec<DataRow>,
    ) -> Self {
        Self {
            kind,
            key_space,
            columns,
            rows,
        }
    }

    pub fn empty(kind: TableKind) -> Self {
        Self::new(kind, None, Vec::new(), Vec::new())
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn key_space(&self) -> Option<CoordinateSpace> {
        self.key_space
    }

    /// Numeric column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.values.get(col).copied().flatten()
    }
}
