/// Positional word-match score of a spoken attempt, 0..=100
///
/// Both phrases are split on whitespace and compared position by position
/// up to the shorter length; matches are case-insensitive. The score is the
/// share of spoken words that matched. Missing trailing words are not
/// penalized.
pub fn pronunciation_score(expected: &str, spoken: &str) -> u32 {
    let expected: Vec<&str> = expected.split_whitespace().collect();
    let spoken: Vec<&str> = spoken.split_whitespace().collect();

    let matches = expected
        .iter()
        .zip(spoken.iter())
        .filter(|(e, s)| e.to_lowercase() == s.to_lowercase())
        .count();

    let denominator = spoken.len().max(1) as f64;
    (matches as f64 / denominator * 100.0).round() as u32
}
