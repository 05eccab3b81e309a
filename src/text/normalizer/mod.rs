#[cfg(test)]
mod tests;

use itertools::Itertools;

use super::lemmatizer::lemmatize;
use super::stopwords::is_stopword;

/// Hyphen, en-dash and em-dash. Replaced with a space so compounds split into tokens.
const DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

/// Normalize free text into the token string the vectorizer expects.
///
/// Dashes become spaces, ASCII punctuation is stripped, the text is lowercased,
/// stopwords are dropped and every remaining token is lemmatized. Total over all
/// inputs: empty or stopword-only text yields an empty string.
#[inline]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .map(|c| if DASHES.contains(&c) { ' ' } else { c })
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    let lowered = stripped.to_lowercase();

    lowered
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .map(lemmatize)
        // A lemma can land on a stopword ("thems" -> "them"); drop it so a second
        // pass sees the same tokens.
        .filter(|lemma| !is_stopword(lemma))
        .join(" ")
}
