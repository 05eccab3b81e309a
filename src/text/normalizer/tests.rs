use super::*;

#[test]
fn empty_input() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   \t\n "), "");
}

#[test]
fn stopwords_only() {
    assert_eq!(normalize("the and of"), "");
    assert_eq!(normalize("The AND Of"), "");
}

#[test]
fn punctuation_only() {
    assert_eq!(normalize("!!! ,,, ... ?"), "");
}

#[test]
fn hyphen_variants_split_compounds() {
    let normalized = normalize("state-of-the-art");
    assert_eq!(normalized, "state art");
    assert!(!normalized.contains(['-', '\u{2013}', '\u{2014}']));

    assert_eq!(normalize("supply\u{2013}chain"), "supply chain");
    assert_eq!(normalize("trust\u{2014}based contracts"), "trust based contract");
}

#[test]
fn punctuation_is_stripped_before_lowercasing() {
    assert_eq!(normalize("Newsvendor's (biases)!"), "newsvendor bias");
}

#[test]
fn topic_query() {
    assert_eq!(
        normalize("team decision making under stress"),
        "team decision making stress"
    );
    assert_eq!(
        normalize("Studies of biases in supply chains"),
        "study bias supply chain"
    );
}

#[test]
fn lemmas_that_become_stopwords_are_dropped() {
    assert_eq!(normalize("thems"), "");
}

#[test]
fn adverbs_survive_and_plural_nouns_reduce() {
    assert_eq!(
        normalize("Group dynamics always shift towards inventory means"),
        "group dynamic always shift towards inventory mean"
    );
}

#[test]
fn output_is_single_space_joined() {
    assert_eq!(normalize("  inventory \n\n  control\tpolicies "), "inventory control policy");
}

#[test]
fn normalization_is_idempotent() {
    let samples = [
        "",
        "the and of",
        "state-of-the-art",
        "Team Decision-Making under STRESS",
        "Behavioral operations: newsvendor biases, heuristics & learning (2019)",
        "R&D portfolio decisions — a field experiment",
        "Café workers’ fatigue in 1990s factories",
        "thems ours doings",
        "Analyses of queues, processes and boxes",
        "ΑΣ İstanbul",
    ];

    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
    }
}
