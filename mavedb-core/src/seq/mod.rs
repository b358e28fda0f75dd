pub mod translate;

use crate::alphabets::{self, Alphabet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    Dna,
    Rna,
    Protein,
}

impl SequenceType {
    pub fn is_nucleotide(&self) -> bool {
        matches!(self, SequenceType::Dna | SequenceType::Rna)
    }

    pub fn alphabet(&self) -> Alphabet {
        match self {
            SequenceType::Dna => alphabets::dna::alphabet(),
            SequenceType::Rna => alphabets::rna::alphabet(),
            SequenceType::Protein => alphabets::protein::alphabet(),
        }
    }

    /// Type of an upper-cased target that was supplied without one.
    ///
    /// Nucleotide codes only (`ACGTN`) make DNA, and `ACGUN` with at least one
    /// `U` makes RNA. Anything else is read as protein, so the protein
    /// alphabet check reports any stray symbol. An all-`N` target is DNA; an
    /// all-`X` target is protein.
    pub fn infer(residues: &[u8]) -> SequenceType {
        if SequenceType::Dna.alphabet().first_invalid(residues).is_none() {
            SequenceType::Dna
        } else if SequenceType::Rna.alphabet().first_invalid(residues).is_none() {
            SequenceType::Rna
        } else {
            SequenceType::Protein
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Dna => "dna",
            SequenceType::Rna => "rna",
            SequenceType::Protein => "protein",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dna" => Ok(SequenceType::Dna),
            "rna" => Ok(SequenceType::Rna),
            "protein" => Ok(SequenceType::Protein),
            other => Err(format!(
                "unknown sequence type '{other}' (expected dna, rna or protein)"
            )),
        }
    }
}

/// Reference sequence as supplied by the target store.
///
/// This is unvalidated input; `validate::validate` turns it into a
/// `ValidatedTarget`. When `sequence_type` is absent it is inferred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSequence {
    pub sequence: String,
    #[serde(default)]
    pub sequence_type: Option<SequenceType>,
}

impl TargetSequence {
    pub fn new(sequence: impl Into<String>, sequence_type: SequenceType) -> Self {
        Self {
            sequence: sequence.into(),
            sequence_type: Some(sequence_type),
        }
    }

    pub fn infer(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            sequence_type: None,
        }
    }
}
