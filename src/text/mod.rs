// Text preparation shared by queries and the corpus the vectorizer was fitted on.
// Changing anything here changes the vector space, so the vectorizer artifact must
// be refitted alongside it.

pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;

pub use lemmatizer::lemmatize;
pub use normalizer::normalize;
pub use stopwords::is_stopword;
