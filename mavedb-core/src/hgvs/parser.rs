use crate::alphabets::{dna, protein, Alphabet};
use crate::hgvs::{Change, CoordinateSpace, Edit, EditKind, Position, Prefix, VariantNotation};
use crate::report::IssueCode;
use std::sync::LazyLock;
use thiserror::Error;

static BASES: LazyLock<Alphabet> = LazyLock::new(dna::variant_alphabet);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{text}': {msg}")]
    Syntax { text: String, msg: String },

    #[error("'{text}': prefix '{found}.' is not accepted in the {space} column (expected {expected})")]
    Prefix {
        text: String,
        found: char,
        space: CoordinateSpace,
        expected: String,
    },

    #[error("'{text}': edits at positions {first} and {second} overlap")]
    Overlap {
        text: String,
        first: u32,
        second: u32,
    },

    #[error("'{text}' is no longer supported and should be replaced by {replacement}")]
    Legacy {
        text: String,
        replacement: &'static str,
    },
}

impl ParseError {
    pub fn code(&self) -> IssueCode {
        match self {
            ParseError::Syntax { .. } | ParseError::Legacy { .. } => IssueCode::ParseError,
            ParseError::Prefix { .. } => IssueCode::PrefixError,
            ParseError::Overlap { .. } => IssueCode::OverlapError,
        }
    }
}

/// Parse one cell of an HGVS column.
///
/// Empty text and a bare `=` are the wild-type sentinel. Bracketed edit sets
/// may be written in any order; they are returned sorted by start position.
pub fn parse(text: &str, space: CoordinateSpace) -> Result<VariantNotation, ParseError> {
    let text = text.trim();
    let syntax = |msg: &str| ParseError::Syntax {
        text: text.to_string(),
        msg: msg.to_string(),
    };

    if text.is_empty() || text == "=" {
        return Ok(VariantNotation::new(
            space,
            space.default_prefix(),
            Change::WildType,
        ));
    }
    if text.eq_ignore_ascii_case("_wt") {
        return Err(ParseError::Legacy {
            text: text.to_string(),
            replacement: "one of 'g.=', 'c.=' or 'n.='",
        });
    }
    if text.eq_ignore_ascii_case("_sy") {
        return Err(ParseError::Legacy {
            text: text.to_string(),
            replacement: "'p.(=)'",
        });
    }

    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[1] != b'.' {
        return Err(syntax("expected a coordinate prefix such as 'c.' or 'p.'"));
    }
    let prefix =
        Prefix::from_char(bytes[0]).ok_or_else(|| syntax("unknown coordinate prefix"))?;
    if !space.admits(prefix) {
        let expected = space
            .admissible_prefixes()
            .iter()
            .map(|p| format!("'{}.'", p.as_char()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ParseError::Prefix {
            text: text.to_string(),
            found: prefix.as_char(),
            space,
            expected,
        });
    }

    let body = &text[2..];
    let protein = prefix.is_protein();
    let change = match body {
        "=" => Change::WildType,
        "(=)" if protein => Change::Synonymous,
        _ if body.starts_with('[') => {
            let inner = body
                .strip_prefix('[')
                .and_then(|b| b.strip_suffix(']'))
                .ok_or_else(|| syntax("unterminated '[' in multi-variant"))?;
            let parts: Vec<&str> = inner.split(';').collect();
            if parts.len() < 2 {
                return Err(syntax("a bracketed multi-variant needs at least two edits"));
            }
            let mut edits = Vec::with_capacity(parts.len());
            for part in parts {
                edits.push(parse_edit(part, protein).map_err(|msg| syntax(&msg))?);
            }
            edits.sort_by_key(|e| e.interval());
            for pair in edits.windows(2) {
                let (_, prev_end) = pair[0].interval();
                let (next_start, _) = pair[1].interval();
                if next_start <= prev_end {
                    return Err(ParseError::Overlap {
                        text: text.to_string(),
                        first: pair[0].start.index,
                        second: next_start,
                    });
                }
            }
            Change::Edits(edits)
        }
        _ => Change::Edits(vec![parse_edit(body, protein).map_err(|msg| syntax(&msg))?]),
    };

    Ok(VariantNotation::new(space, prefix, change))
}

fn parse_edit(text: &str, protein: bool) -> Result<Edit, String> {
    let mut cur = Cursor::new(text);
    let edit = if protein {
        protein_edit(&mut cur)?
    } else {
        nucleotide_edit(&mut cur)?
    };
    if !cur.at_end() {
        return Err(format!("unexpected trailing text '{}'", cur.rest()));
    }
    Ok(edit)
}

fn nucleotide_edit(cur: &mut Cursor<'_>) -> Result<Edit, String> {
    let start = cur.position()?;
    let end = if cur.eat(b'_') {
        let end = cur.position()?;
        if end <= start {
            return Err(format!("interval end {end} must be greater than start {start}"));
        }
        Some(Position::new(end))
    } else {
        None
    };

    if end.is_none() {
        if let Some(reference) = cur.peek().filter(|&b| BASES.contains(b)) {
            cur.bump();
            if !cur.eat(b'>') {
                return Err("expected '>' after the reference base".to_string());
            }
            let alternate = cur
                .peek()
                .filter(|&b| BASES.contains(b))
                .ok_or_else(|| "expected an alternate base after '>'".to_string())?;
            cur.bump();
            if reference == alternate {
                return Err(format!(
                    "reference base '{}' cannot equal the alternate base",
                    reference as char
                ));
            }
            return Ok(Edit {
                start: Position::with_residue(start, reference),
                end: None,
                kind: EditKind::Substitution(alternate),
            });
        }
    }

    let kind = edit_kind(cur, start, end.map(|p| p.index), |cur| {
        let bases = cur.take_while(|b| BASES.contains(b));
        if bases.is_empty() {
            Err("expected inserted bases".to_string())
        } else {
            Ok(bases.to_vec())
        }
    })?;
    Ok(Edit {
        start: Position::new(start),
        end,
        kind,
    })
}

fn protein_edit(cur: &mut Cursor<'_>) -> Result<Edit, String> {
    let start = cur.residue_position()?;
    let end = if cur.eat(b'_') {
        let end = cur.residue_position()?;
        if end.index <= start.index {
            return Err(format!(
                "interval end {} must be greater than start {}",
                end.index, start.index
            ));
        }
        Some(end)
    } else {
        None
    };

    if end.is_none() {
        if cur.eat_str("fs") {
            return Ok(Edit {
                start,
                end,
                kind: EditKind::Frameshift,
            });
        }
        if let Some(alternate) = cur.amino_acid() {
            if Some(alternate) == start.residue {
                return Err("use '=' for a synonymous substitution".to_string());
            }
            return Ok(Edit {
                start,
                end,
                kind: EditKind::Substitution(alternate),
            });
        }
    }

    let kind = edit_kind(cur, start.index, end.map(|p| p.index), |cur| {
        let mut residues = Vec::new();
        while let Some(aa) = cur.amino_acid() {
            residues.push(aa);
        }
        if residues.is_empty() {
            Err("expected inserted amino acids".to_string())
        } else {
            Ok(residues)
        }
    })?;
    Ok(Edit { start, end, kind })
}

/// Edit keywords shared by both grammars; `residues` reads the inserted
/// sequence in the grammar's own alphabet.
fn edit_kind<F>(
    cur: &mut Cursor<'_>,
    start: u32,
    end: Option<u32>,
    residues: F,
) -> Result<EditKind, String>
where
    F: Fn(&mut Cursor<'_>) -> Result<Vec<u8>, String>,
{
    if cur.eat(b'=') {
        Ok(EditKind::Unchanged)
    } else if cur.eat_str("delins") {
        Ok(EditKind::DeletionInsertion(residues(cur)?))
    } else if cur.eat_str("del") {
        Ok(EditKind::Deletion)
    } else if cur.eat_str("dup") {
        Ok(EditKind::Duplication)
    } else if cur.eat_str("ins") {
        if end.is_none() || end != start.checked_add(1) {
            return Err("an insertion must be placed between two adjacent positions".to_string());
        }
        Ok(EditKind::Insertion(residues(cur)?))
    } else if cur.at_end() {
        Err("missing edit description".to_string())
    } else {
        Err(format!("unrecognised edit '{}'", cur.rest()))
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn rest(&self) -> String {
        String::from_utf8_lossy(&self.bytes[self.pos.min(self.bytes.len())..]).into_owned()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    /// A positive 1-based position.
    fn position(&mut self) -> Result<u32, String> {
        let digits = self.take_while(|b| b.is_ascii_digit());
        if digits.is_empty() {
            return Err(format!("expected a position at '{}'", self.rest()));
        }
        let text = std::str::from_utf8(digits).map_err(|e| e.to_string())?;
        let value: u32 = text
            .parse()
            .map_err(|_| format!("position '{text}' is out of range"))?;
        if value == 0 {
            return Err("positions are 1-based and must be positive".to_string());
        }
        Ok(value)
    }

    /// A three-letter amino acid code (or `*`) followed by its position.
    fn residue_position(&mut self) -> Result<Position, String> {
        let residue = self
            .amino_acid()
            .ok_or_else(|| format!("expected an amino acid at '{}'", self.rest()))?;
        Ok(Position::with_residue(self.position()?, residue))
    }

    fn amino_acid(&mut self) -> Option<u8> {
        if self.eat(b'*') {
            return Some(b'*');
        }
        let code = self.bytes.get(self.pos..self.pos + 3)?;
        let symbol = std::str::from_utf8(code).ok().and_then(protein::three_to_one)?;
        self.pos += 3;
        Some(symbol)
    }
}
