use crate::alphabets::Alphabet;

/// Residues accepted in a protein target: the 20 standard amino acids,
/// `X` for an unknown residue and `*` for a stop.
pub fn alphabet() -> Alphabet {
    Alphabet::new(&b"ARNDCEQGHILKMFPSTWYVX*arndceqghilkmfpstwyvx"[..])
}

/// Three-letter codes paired with their one-letter symbol. `Ter` is the stop.
const AA_CODES: [(&str, u8); 21] = [
    ("Ala", b'A'),
    ("Arg", b'R'),
    ("Asn", b'N'),
    ("Asp", b'D'),
    ("Cys", b'C'),
    ("Gln", b'Q'),
    ("Glu", b'E'),
    ("Gly", b'G'),
    ("His", b'H'),
    ("Ile", b'I'),
    ("Leu", b'L'),
    ("Lys", b'K'),
    ("Met", b'M'),
    ("Phe", b'F'),
    ("Pro", b'P'),
    ("Ser", b'S'),
    ("Thr", b'T'),
    ("Trp", b'W'),
    ("Tyr", b'Y'),
    ("Val", b'V'),
    ("Ter", b'*'),
];

pub fn three_to_one(code: &str) -> Option<u8> {
    AA_CODES
        .iter()
        .find(|(three, _)| *three == code)
        .map(|&(_, one)| one)
}

pub fn one_to_three(symbol: u8) -> Option<&'static str> {
    let symbol = symbol.to_ascii_uppercase();
    AA_CODES
        .iter()
        .find(|(_, one)| *one == symbol)
        .map(|&(three, _)| three)
}
