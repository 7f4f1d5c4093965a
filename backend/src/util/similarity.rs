/// Minimum score (inclusive) at which two event names count as duplicates.
pub const DUPLICATE_THRESHOLD: f64 = 90.0;

/// A pool entry that reached [`DUPLICATE_THRESHOLD`] against a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateMatch<'a> {
    pub name: &'a str,
    pub score: f64,
}

/// Case-insensitive Levenshtein distance counted in chars.
///
/// Chars are compared by their full lowercase mapping, so folding never
/// changes the length of either side.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut costs: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = costs[j + 1];
            costs[j + 1] = if chars_eq_ignore_case(ca, cb) {
                diagonal
            } else {
                diagonal.min(above).min(costs[j]) + 1
            };
            diagonal = above;
        }
    }

    costs[b.len()]
}

/// Similarity of two names on a 0..=100 scale, relative to the longer one.
///
/// Two empty strings are identical (100).
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100.0;
    }

    let distance = edit_distance(a, b);
    (longest - distance) as f64 / longest as f64 * 100.0
}

/// Returns the first name in `pool` that is a near duplicate of `candidate`.
///
/// Pool order decides: a later, closer name never replaces an earlier hit.
pub fn find_duplicate<'a, S: AsRef<str>>(candidate: &str, pool: &'a [S]) -> Option<&'a str> {
    find_duplicate_match(candidate, pool).map(|hit| hit.name)
}

pub fn find_duplicate_match<'a, S: AsRef<str>>(
    candidate: &str,
    pool: &'a [S],
) -> Option<DuplicateMatch<'a>> {
    pool.iter().find_map(|name| {
        let name = name.as_ref();
        let score = similarity(candidate, name);
        (score >= DUPLICATE_THRESHOLD).then_some(DuplicateMatch { name, score })
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
