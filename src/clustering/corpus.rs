use std::collections::BTreeMap;

use crate::models::EnrichedMessage;

/// Author to ordered message texts
pub type Corpus = BTreeMap<String, Vec<String>>;

/// Controls how per-author text is cut into fragments and which authors qualify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusOptions {
    /// Characters per fragment
    pub fragment_size: usize,
    /// Authors need at least this many fragments
    pub min_fragments: usize,
    /// Authors need at least this many messages with text
    pub min_author_messages: usize,
    /// Keep at most this many fragments per author (0 keeps all)
    pub max_fragments: usize,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self { fragment_size: 500, min_fragments: 3, min_author_messages: 0, max_fragments: 0 }
    }
}

/// One fixed-length slice of an author's concatenated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub author: String,
    pub text: String,
}

/// Group message texts by author, skipping messages without text
pub fn corpus_from_messages<'a>(messages: impl IntoIterator<Item = &'a EnrichedMessage>) -> Corpus {
    let mut corpus = Corpus::new();
    for message in messages {
        if let Some(text) = &message.text {
            corpus.entry(message.author.clone()).or_default().push(text.clone());
        }
    }
    corpus
}

/// Slice `text` into chunks of `size` characters; the last chunk may be shorter
pub fn split_fragments(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Fragments of every qualifying author, grouped by author in corpus order
pub fn build_fragments(corpus: &Corpus, options: &CorpusOptions) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    for (author, texts) in corpus {
        if texts.len() < options.min_author_messages {
            continue;
        }
        let mut parts = split_fragments(&texts.join(" "), options.fragment_size);
        if parts.len() < options.min_fragments {
            continue;
        }
        if options.max_fragments > 0 {
            parts.truncate(options.max_fragments);
        }
        fragments.extend(parts.into_iter().map(|text| TextFragment { author: author.clone(), text }));
    }
    fragments
}
