pub mod stop_words;
pub mod tfidf;
pub mod tokenizer;

pub use stop_words::ENGLISH_STOP_WORDS;
pub use tfidf::{DEFAULT_MAX_FEATURES, TfidfVectorizer};
pub use tokenizer::Tokenizer;
