//! Fuzzy partial-match scoring.
//!
//! `partial_ratio` scores how well the shorter of two strings aligns with
//! the best-matching equally long window of the longer one, 0 to 100. It
//! is what lets a keyword like "HSBC" still match statement text mangled
//! by PDF extraction ("H5BC", "HSB C").

/// Similarity of two equal-ish slices: 2·LCS/(|a|+|b|), scaled to 0-100.
fn ratio(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let lcs = lcs_len(a, b);
    ((200.0 * lcs as f64) / (a.len() + b.len()) as f64).round() as u8
}

/// Longest common subsequence length, two-row dynamic program.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr[0] = 0;
    }
    prev[b.len()]
}

/// Best-window partial match score between `a` and `b`, 0 to 100.
///
/// The shorter string is slid over every window of its own length in the
/// longer string; the best window similarity wins. Empty input scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0;
    }

    let window = short.len();
    let mut best = 0u8;
    for start in 0..=(long.len() - window) {
        let score = ratio(&short, &long[start..start + window]);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }
    best
}
