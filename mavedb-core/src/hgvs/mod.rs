//! HGVS-like variant notation as used in MAVE score and count tables.
//!
//! A [`VariantNotation`] is tagged with the [`CoordinateSpace`] of the column
//! it was read from and the concrete reference prefix written by the user
//! (`c.`, `n.`, `g.`, `m.` or `p.`). Its body is either a wild-type sentinel or
//! one or more elementary [`Edit`]s sorted by position.

pub mod parser;


pub use parser::{parse, ParseError};

use crate::alphabets::protein;
use serde::{Serialize, Serializer};
use std::fmt;

/// Column-level coordinate space. Each HGVS column of a table belongs to
/// exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    Nucleotide,
    Transcript,
    Protein,
}

impl CoordinateSpace {
    pub const ALL: [CoordinateSpace; 3] = [
        CoordinateSpace::Nucleotide,
        CoordinateSpace::Transcript,
        CoordinateSpace::Protein,
    ];

    /// Canonical column name for this space.
    pub fn column(&self) -> &'static str {
        match self {
            CoordinateSpace::Nucleotide => "hgvs_nt",
            CoordinateSpace::Transcript => "hgvs_splice",
            CoordinateSpace::Protein => "hgvs_pro",
        }
    }

    pub fn admits(&self, prefix: Prefix) -> bool {
        self.admissible_prefixes().contains(&prefix)
    }

    pub fn admissible_prefixes(&self) -> &'static [Prefix] {
        match self {
            CoordinateSpace::Nucleotide => &[
                Prefix::Coding,
                Prefix::NonCoding,
                Prefix::Genomic,
                Prefix::Mitochondrial,
            ],
            CoordinateSpace::Transcript => &[Prefix::Coding, Prefix::NonCoding],
            CoordinateSpace::Protein => &[Prefix::Protein],
        }
    }

    /// Prefix given to a bare `=` written without one.
    pub fn default_prefix(&self) -> Prefix {
        match self {
            CoordinateSpace::Nucleotide | CoordinateSpace::Transcript => Prefix::Coding,
            CoordinateSpace::Protein => Prefix::Protein,
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prefix {
    Coding,
    NonCoding,
    Genomic,
    Mitochondrial,
    Protein,
}

impl Prefix {
    pub fn from_char(c: u8) -> Option<Self> {
        match c {
            b'c' => Some(Prefix::Coding),
            b'n' => Some(Prefix::NonCoding),
            b'g' => Some(Prefix::Genomic),
            b'm' => Some(Prefix::Mitochondrial),
            b'p' => Some(Prefix::Protein),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Prefix::Coding => 'c',
            Prefix::NonCoding => 'n',
            Prefix::Genomic => 'g',
            Prefix::Mitochondrial => 'm',
            Prefix::Protein => 'p',
        }
    }

    pub fn is_protein(&self) -> bool {
        matches!(self, Prefix::Protein)
    }
}

/// A 1-based position, optionally annotated with the reference residue the
/// submitter claims is found there (`A` in `76A>T`, `Val` in `Val13Ala`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub index: u32,
    pub residue: Option<u8>,
}

impl Position {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            residue: None,
        }
    }

    pub fn with_residue(index: u32, residue: u8) -> Self {
        Self {
            index,
            residue: Some(residue),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Replacement of the single residue at `start` by the given symbol.
    Substitution(u8),
    /// Position-level "no change" (`76=`, `Val13=`).
    Unchanged,
    Deletion,
    Duplication,
    /// Inserted residues between two adjacent positions.
    Insertion(Vec<u8>),
    DeletionInsertion(Vec<u8>),
    Frameshift,
}

/// One elementary edit. Residues are stored as upper-case nucleotides or
/// one-letter amino acid symbols (`*` for a stop).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: Position,
    pub end: Option<Position>,
    pub kind: EditKind,
}

impl Edit {
    /// Inclusive 1-based interval touched by this edit.
    pub fn interval(&self) -> (u32, u32) {
        let end = self.end.map(|e| e.index).unwrap_or(self.start.index);
        (self.start.index, end)
    }

    /// Positions carrying a declared reference residue.
    pub fn anchors(&self) -> impl Iterator<Item = &Position> {
        std::iter::once(&self.start)
            .chain(self.end.iter())
            .filter(|p| p.residue.is_some())
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, protein: bool) -> fmt::Result {
        write_position(f, &self.start, protein)?;
        if let Some(end) = &self.end {
            f.write_str("_")?;
            write_position(f, end, protein)?;
        }
        match &self.kind {
            EditKind::Substitution(alt) => {
                if protein {
                    f.write_str(three_letter(*alt))
                } else {
                    let reference = self.start.residue.unwrap_or(b'N');
                    write!(f, "{}>{}", reference as char, *alt as char)
                }
            }
            EditKind::Unchanged => f.write_str("="),
            EditKind::Deletion => f.write_str("del"),
            EditKind::Duplication => f.write_str("dup"),
            EditKind::Insertion(residues) => {
                f.write_str("ins")?;
                write_residues(f, residues, protein)
            }
            EditKind::DeletionInsertion(residues) => {
                f.write_str("delins")?;
                write_residues(f, residues, protein)
            }
            EditKind::Frameshift => f.write_str("fs"),
        }
    }
}

fn write_position(f: &mut fmt::Formatter<'_>, p: &Position, protein: bool) -> fmt::Result {
    match (protein, p.residue) {
        (true, Some(r)) => write!(f, "{}{}", three_letter(r), p.index),
        _ => write!(f, "{}", p.index),
    }
}

fn write_residues(f: &mut fmt::Formatter<'_>, residues: &[u8], protein: bool) -> fmt::Result {
    for &r in residues {
        if protein {
            f.write_str(three_letter(r))?;
        } else {
            write!(f, "{}", r as char)?;
        }
    }
    Ok(())
}

fn three_letter(symbol: u8) -> &'static str {
    protein::one_to_three(symbol).unwrap_or("Xaa")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    /// `c.=`, `p.=`: no variant observed.
    WildType,
    /// `p.(=)`: predicted synonymous change.
    Synonymous,
    /// One or more edits, sorted by start position, non-overlapping.
    Edits(Vec<Edit>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantNotation {
    space: CoordinateSpace,
    prefix: Prefix,
    change: Change,
}

impl VariantNotation {
    pub(crate) fn new(space: CoordinateSpace, prefix: Prefix, change: Change) -> Self {
        Self {
            space,
            prefix,
            change,
        }
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    /// Edits of this variant; empty for the wild-type and synonymous sentinels.
    pub fn edits(&self) -> &[Edit] {
        match &self.change {
            Change::Edits(edits) => edits,
            Change::WildType | Change::Synonymous => &[],
        }
    }

    pub fn is_wild_type(&self) -> bool {
        matches!(self.change, Change::WildType | Change::Synonymous)
    }

    pub fn is_multi(&self) -> bool {
        self.edits().len() > 1
    }

    /// Highest position touched by any edit, 0 for wild type.
    pub fn max_position(&self) -> u32 {
        self.edits().iter().map(|e| e.interval().1).max().unwrap_or(0)
    }
}

impl fmt::Display for VariantNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.", self.prefix.as_char())?;
        let protein = self.prefix.is_protein();
        match &self.change {
            Change::WildType => f.write_str("="),
            Change::Synonymous => f.write_str("(=)"),
            Change::Edits(edits) if edits.len() == 1 => edits[0].write(f, protein),
            Change::Edits(edits) => {
                f.write_str("[")?;
                for (i, edit) in edits.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    edit.write(f, protein)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for VariantNotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
