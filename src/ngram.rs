//! Character n-gram extraction.
//!
//! Words are padded with one leading and one trailing space before a
//! window of width `n` slides over them, so word boundaries take part in
//! the n-grams:
//!
//! ```text
//! "der", n = 2  →  " d", "de", "er", "r "
//! ```
//!
//! Windows made only of spaces carry no information and are dropped.
//! Sentences are split on whitespace; n-grams never span two words.

/// Extract the character n-grams of a single word.
///
/// Duplicates are kept, in the order they occur. Returns an empty list
/// for `n == 0` or when the padded word is shorter than `n`.
///
/// # Example
/// ```rust
/// use heli_dialect::ngram::ngrams;
///
/// assert_eq!(ngrams("der", 2), vec![" d", "de", "er", "r "]);
/// assert_eq!(ngrams("ab", 1), vec!["a", "b"]);
/// ```
pub fn ngrams(word: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }

    let padded: Vec<char> = std::iter::once(' ')
        .chain(word.chars())
        .chain(std::iter::once(' '))
        .collect();

    padded
        .windows(n)
        .filter(|window| !window.iter().all(|&c| c == ' '))
        .map(|window| window.iter().collect())
        .collect()
}

/// Extract the n-grams of every whitespace-separated token of a sentence.
///
/// # Example
/// ```rust
/// use heli_dialect::ngram::ngrams_sentence;
///
/// assert_eq!(ngrams_sentence("a b", 2), vec![" a", "a ", " b", "b "]);
/// ```
pub fn ngrams_sentence(sentence: &str, n: usize) -> Vec<String> {
    sentence
        .split_whitespace()
        .flat_map(|token| ngrams(token, n))
        .collect()
}
