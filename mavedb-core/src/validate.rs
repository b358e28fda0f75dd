//! Target sequence validation and per-variant checks against a target.

use crate::alphabets::dna;
use crate::error::{MaveError, MaveResult};
use crate::hgvs::{CoordinateSpace, Edit, VariantNotation};
use crate::io::normalize_seq_bytes;
use crate::report::IssueCode;
use crate::seq::translate::{translate, IncompleteCodonError};
use crate::seq::{SequenceType, TargetSequence};
use thiserror::Error;

/// A target whose alphabet has been checked, normalized to upper case.
///
/// Nucleotide targets carry their translation, computed once here and shared
/// read-only by every row of every table of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedTarget {
    sequence: Vec<u8>,
    sequence_type: SequenceType,
    translation: Option<Result<Vec<u8>, IncompleteCodonError>>,
}

impl ValidatedTarget {
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Protein residues variants in `hgvs_pro` are checked against.
    pub fn protein(&self) -> Result<&[u8], &IncompleteCodonError> {
        match &self.translation {
            Some(Ok(residues)) => Ok(residues),
            Some(Err(err)) => Err(err),
            None => Ok(&self.sequence),
        }
    }
}

pub fn validate(target: &TargetSequence) -> MaveResult<ValidatedTarget> {
    let mut sequence = normalize_seq_bytes(&target.sequence);
    if sequence.is_empty() {
        return Err(MaveError::EmptyTarget);
    }
    sequence.make_ascii_uppercase();

    let sequence_type = target
        .sequence_type
        .unwrap_or_else(|| SequenceType::infer(&sequence));
    if let Some((pos, ch)) = sequence_type.alphabet().first_invalid(&sequence) {
        return Err(MaveError::InvalidChar {
            ch: ch as char,
            pos,
            expected: sequence_type.as_str(),
        });
    }

    let translation = sequence_type
        .is_nucleotide()
        .then(|| translate(&sequence));
    Ok(ValidatedTarget {
        sequence,
        sequence_type,
        translation,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VariantCheckError {
    #[error("'{variant}': position {position} lies outside the target (length {len})")]
    OutOfBounds {
        variant: String,
        position: u32,
        len: usize,
    },

    #[error("'{variant}': declared reference '{declared}' at position {position} does not match the target ('{found}')")]
    ReferenceMismatch {
        variant: String,
        position: u32,
        declared: char,
        found: char,
    },

    #[error("'{variant}': {reason}")]
    Translation { variant: String, reason: String },
}

impl VariantCheckError {
    pub fn code(&self) -> IssueCode {
        match self {
            VariantCheckError::OutOfBounds { .. } => IssueCode::OutOfBoundsError,
            VariantCheckError::ReferenceMismatch { .. } => IssueCode::ReferenceMismatchError,
            VariantCheckError::Translation { .. } => IssueCode::TranslationError,
        }
    }
}

/// Check a parsed variant against the target.
///
/// Transcript-space variants are accepted unchecked. Edits without a declared
/// reference residue are only bounds checked.
pub fn check_variant(
    variant: &VariantNotation,
    target: &ValidatedTarget,
) -> Result<(), VariantCheckError> {
    if variant.is_wild_type() {
        return Ok(());
    }
    match variant.space() {
        CoordinateSpace::Transcript => Ok(()),
        CoordinateSpace::Nucleotide => {
            if !target.sequence_type.is_nucleotide() {
                return Err(VariantCheckError::Translation {
                    variant: variant.to_string(),
                    reason: "nucleotide variants cannot be placed on a protein target".to_string(),
                });
            }
            check_edits(variant, &target.sequence, dna::same_base)
        }
        CoordinateSpace::Protein => {
            let residues = target
                .protein()
                .map_err(|err| VariantCheckError::Translation {
                    variant: variant.to_string(),
                    reason: err.to_string(),
                })?;
            if target.translation.is_some() {
                if let Some(stop) = internal_stop(residues) {
                    if variant.max_position() > stop {
                        return Err(VariantCheckError::Translation {
                            variant: variant.to_string(),
                            reason: format!(
                                "the translated target has a stop codon at residue {stop}"
                            ),
                        });
                    }
                }
            }
            check_edits(variant, residues, |a, b| a == b)
        }
    }
}

/// 1-based position of the first stop that is not the final residue.
fn internal_stop(residues: &[u8]) -> Option<u32> {
    let last = residues.len().checked_sub(1)?;
    residues[..last]
        .iter()
        .position(|&b| b == b'*')
        .map(|i| i as u32 + 1)
}

fn check_edits(
    variant: &VariantNotation,
    sequence: &[u8],
    same: impl Fn(u8, u8) -> bool,
) -> Result<(), VariantCheckError> {
    for edit in variant.edits() {
        check_edit(variant, edit, sequence, &same)?;
    }
    Ok(())
}

fn check_edit(
    variant: &VariantNotation,
    edit: &Edit,
    sequence: &[u8],
    same: &impl Fn(u8, u8) -> bool,
) -> Result<(), VariantCheckError> {
    let (_, end) = edit.interval();
    if end as usize > sequence.len() {
        return Err(VariantCheckError::OutOfBounds {
            variant: variant.to_string(),
            position: end,
            len: sequence.len(),
        });
    }
    for anchor in edit.anchors() {
        let Some(declared) = anchor.residue else {
            continue;
        };
        let found = sequence[anchor.index as usize - 1];
        if !same(declared, found) {
            return Err(VariantCheckError::ReferenceMismatch {
                variant: variant.to_string(),
                position: anchor.index,
                declared: declared as char,
                found: found as char,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hgvs::parse;
    use proptest::prelude::*;

    fn dna_target(seq: &str) -> ValidatedTarget {
        validate(&TargetSequence::new(seq, SequenceType::Dna)).unwrap()
    }

    fn check(
        text: &str,
        space: CoordinateSpace,
        target: &ValidatedTarget,
    ) -> Result<(), IssueCode> {
        let variant = parse(text, space).unwrap();
        check_variant(&variant, target).map_err(|e| e.code())
    }

    #[test]
    fn target_is_normalized() {
        let target = validate(&TargetSequence::infer(" atg gtt\ntaa ")).unwrap();
        assert_eq!(target.sequence(), b"ATGGTTTAA");
        assert_eq!(target.sequence_type(), SequenceType::Dna);
        assert_eq!(target.protein().unwrap(), b"MV*");
    }

    #[test]
    fn target_alphabet_errors() {
        assert!(matches!(
            validate(&TargetSequence::infer("  \n")),
            Err(MaveError::EmptyTarget)
        ));
        match validate(&TargetSequence::new("ACGU", SequenceType::Dna)) {
            Err(MaveError::InvalidChar { ch, pos, expected }) => {
                assert_eq!((ch, pos, expected), ('U', 3, "dna"));
            }
            other => panic!("expected invalid char, got {other:?}"),
        }
        match validate(&TargetSequence::infer("acgtu")) {
            Err(MaveError::InvalidChar { ch, pos, expected }) => {
                assert_eq!((ch, pos, expected), ('U', 4, "protein"));
            }
            other => panic!("expected invalid char, got {other:?}"),
        }
        assert!(validate(&TargetSequence::new("MVL*X", SequenceType::Protein)).is_ok());
        assert!(validate(&TargetSequence::new("MVB", SequenceType::Protein)).is_err());
    }

    #[test]
    fn nucleotide_bounds() {
        let target = dna_target("ATGGTTTAA");
        assert_eq!(check("c.9A>T", CoordinateSpace::Nucleotide, &target), Ok(()));
        assert_eq!(
            check("c.10A>T", CoordinateSpace::Nucleotide, &target),
            Err(IssueCode::OutOfBoundsError)
        );
        assert_eq!(
            check("c.8_10del", CoordinateSpace::Nucleotide, &target),
            Err(IssueCode::OutOfBoundsError)
        );
    }

    #[test]
    fn nucleotide_reference() {
        let target = dna_target("ATGGTTTAA");
        assert_eq!(check("c.4G>A", CoordinateSpace::Nucleotide, &target), Ok(()));
        assert_eq!(
            check("c.4C>A", CoordinateSpace::Nucleotide, &target),
            Err(IssueCode::ReferenceMismatchError)
        );
        assert_eq!(
            check("c.[1A>G;4C>A]", CoordinateSpace::Nucleotide, &target),
            Err(IssueCode::ReferenceMismatchError)
        );
        assert_eq!(check("c.=", CoordinateSpace::Nucleotide, &target), Ok(()));
    }

    #[test]
    fn rna_target_matches_t() {
        let target = validate(&TargetSequence::infer("AUGGUUUAA")).unwrap();
        assert_eq!(target.sequence_type(), SequenceType::Rna);
        assert_eq!(check("c.5T>A", CoordinateSpace::Nucleotide, &target), Ok(()));
    }

    #[test]
    fn protein_against_translation() {
        let target = dna_target("ATGGTTTAA");
        assert_eq!(check("p.Met1Val", CoordinateSpace::Protein, &target), Ok(()));
        assert_eq!(check("p.Ter3Trp", CoordinateSpace::Protein, &target), Ok(()));
        assert_eq!(
            check("p.Val2_Ter3del", CoordinateSpace::Protein, &target),
            Ok(())
        );
        assert_eq!(
            check("p.Leu2Pro", CoordinateSpace::Protein, &target),
            Err(IssueCode::ReferenceMismatchError)
        );
        assert_eq!(
            check("p.Val4Ala", CoordinateSpace::Protein, &target),
            Err(IssueCode::OutOfBoundsError)
        );
    }

    #[test]
    fn translation_failures() {
        let target = dna_target("ATGGT");
        assert_eq!(
            check("p.Met1Val", CoordinateSpace::Protein, &target),
            Err(IssueCode::TranslationError)
        );
        assert_eq!(check("c.5T>A", CoordinateSpace::Nucleotide, &target), Ok(()));

        let target = dna_target("ATGTAAGTT");
        assert_eq!(target.protein().unwrap(), b"M*V");
        assert_eq!(check("p.Met1Val", CoordinateSpace::Protein, &target), Ok(()));
        assert_eq!(
            check("p.Val3Ala", CoordinateSpace::Protein, &target),
            Err(IssueCode::TranslationError)
        );
    }

    #[test]
    fn protein_target_used_directly() {
        let target = validate(&TargetSequence::infer("MVLK")).unwrap();
        assert_eq!(target.sequence_type(), SequenceType::Protein);
        assert_eq!(check("p.Leu3Pro", CoordinateSpace::Protein, &target), Ok(()));
        assert_eq!(
            check("c.3A>T", CoordinateSpace::Nucleotide, &target),
            Err(IssueCode::TranslationError)
        );
    }

    #[test]
    fn transcript_variants_unchecked() {
        let target = dna_target("ATG");
        assert_eq!(check("c.500A>T", CoordinateSpace::Transcript, &target), Ok(()));
    }

    proptest! {
        #[test]
        fn last_position_valid_next_out_of_bounds(len in 1usize..300) {
            let target = dna_target(&"A".repeat(len));
            prop_assert_eq!(
                check(&format!("c.{len}del"), CoordinateSpace::Nucleotide, &target),
                Ok(())
            );
            prop_assert_eq!(
                check(&format!("c.{}del", len + 1), CoordinateSpace::Nucleotide, &target),
                Err(IssueCode::OutOfBoundsError)
            );
        }
    }
}
