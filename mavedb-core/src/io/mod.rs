pub mod csv;

use crate::report::RowError;

/// Cell values read as null unless configured otherwise.
pub const DEFAULT_NULL_VALUES: [&str; 7] = ["nan", "na", "none", "undefined", "n/a", "null", "nil"];

/// A table read in full together with the rows that were dropped from it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadReport<T> {
    pub data: T,
    pub skipped: Vec<RowError>,
}

pub fn is_null(cell: &str, null_values: &[String]) -> bool {
    let cell = cell.trim();
    cell.is_empty() || null_values.iter().any(|n| n.eq_ignore_ascii_case(cell))
}

pub fn normalize_seq_bytes(input: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for b in input.bytes() {
        if !b.is_ascii_whitespace() {
            out.push(b);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_vocabulary() {
        let nulls: Vec<String> = DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect();
        for cell in ["", " ", "NA", "nan", "NaN", "None", "N/A", "null", "NIL", "undefined"] {
            assert!(is_null(cell, &nulls), "{cell:?}");
        }
        assert!(!is_null("0", &nulls));
        assert!(!is_null("c.=", &nulls));
    }

    #[test]
    fn strips_whitespace() {
        assert_eq!(normalize_seq_bytes(" AC\tG\nT "), b"ACGT");
    }
}
