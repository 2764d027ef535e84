use std::cmp::Ordering;

use bio::alphabets::dna;

///
/// Strip the usual chromosome prefixes ("chr", "chromo", "chromosome") so
/// that `chr1`, `Chr1` and `1` all refer to the same chromosome.
///
pub fn simple_chromosome_name(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for prefix in ["chromosome", "chromo", "chr"] {
        if lower.starts_with(prefix) {
            let rest = &name[prefix.len()..];
            return rest.trim_start_matches(['_', ':']);
        }
    }
    name
}

///
/// Numeric value of a chromosome name, if it has one (`chr12` -> 12).
///
pub fn chromosome_number(name: &str) -> Option<u64> {
    simple_chromosome_name(name).parse::<u64>().ok()
}

///
/// Chromosome ordering: numeric names come first (sorted by value), the rest
/// follow in lexicographic order.
///
pub fn compare_chromosome_names(a: &str, b: &str) -> Ordering {
    match (chromosome_number(a), chromosome_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => simple_chromosome_name(a)
            .cmp(simple_chromosome_name(b))
            .then_with(|| a.cmp(b)),
    }
}

///
/// Reverse complement of a nucleotide string. IUPAC ambiguity codes are
/// complemented and case is preserved.
///
pub fn reverse_complement(seq: &str) -> String {
    dna::revcomp(seq.bytes()).into_iter().map(char::from).collect()
}

///
/// Complement of a single base (case preserving).
///
pub fn complement(base: char) -> char {
    if base.is_ascii() {
        char::from(dna::complement(base as u8))
    } else {
        base
    }
}

/// Set of plain bases represented by an IUPAC code, as a 4 bit mask (ACGT).
fn iupac_mask(base: u8) -> u8 {
    const A: u8 = 0b0001;
    const C: u8 = 0b0010;
    const G: u8 = 0b0100;
    const T: u8 = 0b1000;

    match base.to_ascii_uppercase() {
        b'A' => A,
        b'C' => C,
        b'G' => G,
        b'T' | b'U' => T,
        b'R' => A | G,
        b'Y' => C | T,
        b'S' => C | G,
        b'W' => A | T,
        b'K' => G | T,
        b'M' => A | C,
        b'B' => C | G | T,
        b'D' => A | G | T,
        b'H' => A | C | T,
        b'V' => A | C | G,
        b'N' => A | C | G | T,
        _ => 0,
    }
}

///
/// Whether a base is a valid IUPAC nucleotide code (upper or lower case).
///
pub fn is_iupac(base: u8) -> bool {
    iupac_mask(base) != 0
}

///
/// Do two (possibly ambiguous) bases describe a common nucleotide?
/// `N` matches anything, `R` matches `A` and `G`, and so on.
///
pub fn bases_compatible(a: u8, b: u8) -> bool {
    (iupac_mask(a) & iupac_mask(b)) != 0
}

///
/// Base-by-base compatibility of two sequences of identical length.
///
pub fn sequences_compatible(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .all(|(x, y)| bases_compatible(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("chr1", "chr2", Ordering::Less)]
    #[case("chr2", "chr10", Ordering::Less)]
    #[case("10", "chr9", Ordering::Greater)]
    #[case("chr22", "chrX", Ordering::Less)]
    #[case("chrX", "chrY", Ordering::Less)]
    #[case("chrM", "chrX", Ordering::Less)]
    #[case("chr1", "chr1", Ordering::Equal)]
    fn test_compare_chromosome_names(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_chromosome_names(a, b), expected);
    }

    #[rstest]
    fn test_simple_chromosome_name() {
        assert_eq!(simple_chromosome_name("chr7"), "7");
        assert_eq!(simple_chromosome_name("Chromosome_X"), "X");
        assert_eq!(simple_chromosome_name("scaffold_12"), "scaffold_12");
    }

    #[rstest]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ACGTT"), "AACGT");
        assert_eq!(reverse_complement("acgN"), "Ncgt");
        assert_eq!(reverse_complement(""), "");
    }

    #[rstest]
    fn test_ambiguous_bases() {
        assert!(bases_compatible(b'A', b'N'));
        assert!(bases_compatible(b'G', b'r'));
        assert!(!bases_compatible(b'C', b'R'));
        assert!(sequences_compatible("ACGT", "ANGY"));
        assert!(!sequences_compatible("ACGT", "ACG"));
        assert!(!is_iupac(b'X'));
    }
}
