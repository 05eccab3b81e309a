//! Dictionary-free lemmatizer.
//!
//! Mirrors the noun-default morphology the corpus was prepared with: irregular forms
//! come from an exception table, words that only look plural are left alone, and
//! regular plurals are reduced by suffix detachment. The result is always a fixed
//! point, so `lemmatize(lemmatize(w)) == lemmatize(w)`.


use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Irregular inflections and plurals the suffix rules would get wrong.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("men", "man"),
    ("women", "woman"),
    ("oxen", "ox"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("hypotheses", "hypothesis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
    ("diagnoses", "diagnosis"),
    ("syntheses", "synthesis"),
    ("emphases", "emphasis"),
    ("parentheses", "parenthesis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("appendices", "appendix"),
    ("curricula", "curriculum"),
    ("stimuli", "stimulus"),
    ("foci", "focus"),
    ("loci", "locus"),
    ("nuclei", "nucleus"),
    ("radii", "radius"),
    ("fungi", "fungus"),
    ("alumni", "alumnus"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("calves", "calf"),
    ("quizzes", "quiz"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("calories", "calorie"),
    ("zombies", "zombie"),
    ("rookies", "rookie"),
    ("caches", "cache"),
    ("niches", "niche"),
    ("headaches", "headache"),
    ("avalanches", "avalanche"),
    ("biases", "bias"),
    ("aliases", "alias"),
    ("atlases", "atlas"),
    ("canvases", "canvas"),
    ("viruses", "virus"),
    ("buses", "bus"),
    ("campuses", "campus"),
    ("bonuses", "bonus"),
    ("censuses", "census"),
    ("consensuses", "consensus"),
    ("statuses", "status"),
    ("apparatuses", "apparatus"),
    ("focuses", "focus"),
    ("goes", "go"),
    ("species", "specie"),
];

/// Words that end like plurals but are already base forms.
const UNINFLECTED: &[&str] = &[
    "series",
    "news",
    "lens",
    "bias",
    "alias",
    "atlas",
    "canvas",
    "economics",
    "mathematics",
    "politics",
    "logistics",
    "analytics",
    "ergonomics",
    "linguistics",
    "robotics",
    "electronics",
    "genetics",
    "thanks",
    "headquarters",
    "whereabouts",
    "diabetes",
    "measles",
    "rabies",
    "scissors",
];

/// Adverbs and conjunctions ending in `-s`. They have no noun reading, so they keep the `s`.
const NON_NOUN_FORMS: &[&str] = &[
    "afterwards",
    "always",
    "anyways",
    "backwards",
    "besides",
    "downwards",
    "forwards",
    "hereabouts",
    "inwards",
    "nowadays",
    "onwards",
    "outwards",
    "overseas",
    "perhaps",
    "sideways",
    "sometimes",
    "thereabouts",
    "towards",
    "upwards",
    "whereas",
];

/// Endings that block plain `-s` detachment.
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Endings whose plural adds `-es` rather than `-s`.
const ES_PLURAL_ENDINGS: &[&str] = &["sses", "xes", "ches", "shes", "zzes"];

/// Words this short are never reduced by suffix rules.
const MIN_REDUCIBLE_CHARS: usize = 4;

static EXCEPTION_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| EXCEPTIONS.iter().copied().collect());

static UNINFLECTED_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    UNINFLECTED
        .iter()
        .chain(NON_NOUN_FORMS)
        .copied()
        .collect()
});

/// Reduce a lowercase token to its lemma.
#[inline]
pub fn lemmatize(token: &str) -> String {
    let mut current = token.to_string();
    // Every rule either shortens the word or lands on a fixed exception lemma,
    // so this converges well before the bound.
    for _ in 0..=token.chars().count() {
        match reduce_once(&current) {
            Some(next) if next != current => current = next,
            _ => break,
        }
    }
    current
}

fn reduce_once(word: &str) -> Option<String> {
    if let Some(lemma) = EXCEPTION_MAP.get(word) {
        return Some((*lemma).to_string());
    }

    if UNINFLECTED_SET.contains(word)
        || word.chars().count() < MIN_REDUCIBLE_CHARS
        || !word.chars().all(char::is_alphabetic)
    {
        return None;
    }

    if word.chars().count() > MIN_REDUCIBLE_CHARS {
        if let Some(stem) = word.strip_suffix("ies") {
            return Some(format!("{stem}y"));
        }
    }

    if ES_PLURAL_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
        return word.strip_suffix("es").map(str::to_string);
    }

    if PROTECTED_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
        return None;
    }

    word.strip_suffix('s').map(str::to_string)
}
