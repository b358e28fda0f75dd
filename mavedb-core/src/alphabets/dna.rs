use crate::alphabets::Alphabet;

/// Bases accepted in a DNA target sequence.
pub fn alphabet() -> Alphabet {
    Alphabet::new(b"ACGTNacgtn")
}

/// Bases accepted as reference or alternate symbols in nucleotide variants.
pub fn variant_alphabet() -> Alphabet {
    Alphabet::new(b"ACGTN")
}

/// Case-insensitive base comparison where `T` and `U` are the same base.
#[inline]
pub fn same_base(a: u8, b: u8) -> bool {
    let norm = |x: u8| match x.to_ascii_uppercase() {
        b'U' => b'T',
        other => other,
    };
    norm(a) == norm(b)
}
