//! Nucleotide helpers.

/// Complement of a single IUPAC base, preserving case.
///
/// Gap and unknown symbols (`.`, `-`, `?`) map to themselves; anything unrecognised becomes `N`.
#[must_use]
pub fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'a' => b't',
        b't' => b'a',
        b'g' => b'c',
        b'c' => b'g',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        b'S' | b'W' | b'N' | b's' | b'w' | b'n' | b'.' | b'-' | b'?' => base,
        _ => b'N',
    }
}

#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement_base(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_base() {
        assert_eq!(complement_base(b'A'), b'T');
        assert_eq!(complement_base(b'g'), b'c');
        assert_eq!(complement_base(b'R'), b'Y');
        assert_eq!(complement_base(b'S'), b'S');
        assert_eq!(complement_base(b'-'), b'-');
        assert_eq!(complement_base(b'Z'), b'N');
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"ACGTT"), b"AACGT");
        assert_eq!(reverse_complement(b"acgN"), b"Ncgt");
        assert!(reverse_complement(b"").is_empty());
    }
}
