use std::sync::LazyLock;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("target length {len} is not a multiple of 3 ({remainder} trailing bases would be lost)")]
pub struct IncompleteCodonError {
    pub len: usize,
    pub remainder: usize,
}

/// Translate a DNA or RNA sequence with the standard genetic code.
///
/// Stops are kept as `*`; codons containing anything but `ACGTU` become `X`.
pub fn translate(bytes: &[u8]) -> Result<Vec<u8>, IncompleteCodonError> {
    if bytes.len() % 3 != 0 {
        return Err(IncompleteCodonError {
            len: bytes.len(),
            remainder: bytes.len() % 3,
        });
    }
    let mut out = Vec::with_capacity(bytes.len() / 3);
    for codon in bytes.chunks_exact(3) {
        let i1 = BASE_INDEX[codon[0] as usize];
        let i2 = BASE_INDEX[codon[1] as usize];
        let i3 = BASE_INDEX[codon[2] as usize];
        let aa = if i1 < 4 && i2 < 4 && i3 < 4 {
            let idx = ((i1 as usize) << 4) | ((i2 as usize) << 2) | (i3 as usize);
            CODON_TABLE[idx]
        } else {
            b'X'
        };
        out.push(aa);
    }
    Ok(out)
}

static BASE_INDEX: LazyLock<[u8; 256]> = LazyLock::new(|| {
    let mut map = [255u8; 256];
    for (i, bases) in [b"Aa", b"Cc", b"Gg"].iter().enumerate() {
        for &b in bases.iter() {
            map[b as usize] = i as u8;
        }
    }
    for &b in b"TtUu" {
        map[b as usize] = 3;
    }
    map
});

const CODON_TABLE: [u8; 64] = *b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";
