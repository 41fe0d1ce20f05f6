//! Stylometric clustering of authors by their writing.
//!
//! Each qualifying author's text is cut into fragments, fragments become character trigram
//! count vectors, and the pairwise L1 distances between them are projected to two dimensions.
//! The cost is quadratic in the number of fragments; [`CorpusOptions::max_fragments`] bounds it.

pub mod corpus;
pub mod reduce;
pub mod vectorize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;

pub use corpus::{Corpus, CorpusOptions, TextFragment, build_fragments, corpus_from_messages};
pub use reduce::TsneParams;
pub use vectorize::TrigramVectorizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMethod {
    #[default]
    Pca,
    Tsne,
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionMethod::Pca => write!(f, "pca"),
            ReductionMethod::Tsne => write!(f, "tsne"),
        }
    }
}

impl FromStr for ReductionMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pca" => Ok(ReductionMethod::Pca),
            "tsne" | "t-sne" => Ok(ReductionMethod::Tsne),
            other => anyhow::bail!("Unknown clustering method '{}' (expected pca or tsne)", other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterOptions {
    pub corpus: CorpusOptions,
    pub method: ReductionMethod,
    pub tsne: TsneParams,
}

/// One projected fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    pub method: ReductionMethod,
    pub points: Vec<ClusterPoint>,
    /// Qualifying authors in corpus order
    pub authors: Vec<String>,
    pub vocabulary_size: usize,
}

/// Project every qualifying author's fragments to 2-D.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientCorpus`] when fewer than two authors have enough
/// text to qualify. No projection is attempted in that case.
pub fn cluster(corpus: &Corpus, options: &ClusterOptions) -> Result<Clustering, AnalysisError> {
    let fragments = build_fragments(corpus, &options.corpus);

    let mut authors: Vec<String> = Vec::new();
    for fragment in &fragments {
        if authors.last() != Some(&fragment.author) {
            authors.push(fragment.author.clone());
        }
    }
    if authors.len() < 2 {
        return Err(AnalysisError::InsufficientCorpus { qualifying: authors.len() });
    }
    info!(
        "Clustering {} fragments from {} of {} authors with {}",
        fragments.len(),
        authors.len(),
        corpus.len(),
        options.method
    );

    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    let mut vectorizer = TrigramVectorizer::new();
    let vectors = vectorizer.fit_transform(&texts);
    debug!("Trigram vocabulary has {} entries", vectorizer.vocabulary_size());

    let distances = vectorize::distance_matrix(&vectors);
    let projected = match options.method {
        ReductionMethod::Pca => reduce::pca(&distances),
        ReductionMethod::Tsne => reduce::tsne(&distances, &options.tsne),
    };

    let points = fragments
        .into_iter()
        .zip(projected.outer_iter())
        .map(|(fragment, row)| ClusterPoint { x: row[0], y: row[1], author: fragment.author })
        .collect();

    Ok(Clustering {
        method: options.method,
        points,
        authors,
        vocabulary_size: vectorizer.vocabulary_size(),
    })
}
