use criterion::{Criterion, criterion_group, criterion_main};
use itertools::Itertools;
use paper_recommender::text::normalize;
use paper_recommender::vectorizer::{TfidfVectorizer, Vectorizer};
use std::hint::black_box;

const ABSTRACT: &str = "This paper studies the effect of time pressure on team decision-making \
    in supply chains. Using a laboratory experiment with 120 participants, we find that \
    stressed teams rely more heavily on heuristics, exhibit stronger anchoring biases, and \
    place orders that deviate systematically from the profit-maximizing quantity. \
    We discuss implications for the design of ordering processes in practice.";

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("normalize_abstract", |b| {
        b.iter(|| normalize(black_box(ABSTRACT)))
    });

    let normalized = normalize(ABSTRACT);
    let vocabulary: Vec<(String, u32)> = normalized
        .split(' ')
        .unique()
        .enumerate()
        .map(|(i, term)| (term.to_string(), i as u32))
        .collect();
    let vectorizer = TfidfVectorizer::from_vocabulary(
        vocabulary.iter().map(|(term, i)| (term.as_str(), *i)),
        vec![1.5; vocabulary.len()],
    )
    .expect("valid vocabulary");

    c.bench_function("encode_abstract", |b| {
        b.iter(|| vectorizer.encode(black_box(&normalized)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
