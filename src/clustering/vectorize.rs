use std::collections::HashMap;

use ndarray::Array2;
use rayon::prelude::*;

/// Character n-gram length
pub const NGRAM: usize = 3;

/// Sparse n-gram counts as (vocabulary index, count), sorted by index
pub type SparseCounts = Vec<(usize, u32)>;

/// Bag of overlapping character trigrams with a vocabulary learned from the fitted texts.
///
/// Text is lowercased and whitespace runs collapse to a single space before counting.
#[derive(Debug, Clone, Default)]
pub struct TrigramVectorizer {
    vocabulary: HashMap<String, usize>,
}

fn normalize(text: &str) -> Vec<char> {
    let mut chars = Vec::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_space {
                chars.push(' ');
            }
            in_space = true;
        } else {
            chars.push(c);
            in_space = false;
        }
    }
    chars
}

impl TrigramVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Learn the vocabulary from `texts` and return their count vectors
    pub fn fit_transform(&mut self, texts: &[&str]) -> Vec<SparseCounts> {
        texts
            .iter()
            .map(|text| {
                let mut counts: HashMap<usize, u32> = HashMap::new();
                for window in normalize(text).windows(NGRAM) {
                    let gram: String = window.iter().collect();
                    let next_index = self.vocabulary.len();
                    let index = *self.vocabulary.entry(gram).or_insert(next_index);
                    *counts.entry(index).or_default() += 1;
                }
                let mut sparse: SparseCounts = counts.into_iter().collect();
                sparse.sort_unstable_by_key(|&(index, _)| index);
                sparse
            })
            .collect()
    }
}

/// Manhattan distance between two sparse count vectors
pub fn manhattan(a: &[(usize, u32)], b: &[(usize, u32)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut total: u64 = 0;
    while i < a.len() && j < b.len() {
        let ((ia, ca), (ib, cb)) = (a[i], b[j]);
        if ia == ib {
            total += ca.abs_diff(cb) as u64;
            i += 1;
            j += 1;
        } else if ia < ib {
            total += ca as u64;
            i += 1;
        } else {
            total += cb as u64;
            j += 1;
        }
    }
    total += a[i..].iter().map(|&(_, c)| c as u64).sum::<u64>();
    total += b[j..].iter().map(|&(_, c)| c as u64).sum::<u64>();
    total as f64
}

/// Symmetric pairwise Manhattan distance matrix, rows computed in parallel
pub fn distance_matrix(vectors: &[SparseCounts]) -> Array2<f64> {
    let n = vectors.len();
    let flat: Vec<f64> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            (0..n).map(move |j| if i == j { 0.0 } else { manhattan(&vectors[i], &vectors[j]) })
        })
        .collect();
    // n * n values were produced above, so the shape always matches
    Array2::from_shape_vec((n, n), flat).unwrap_or_else(|_| Array2::zeros((n, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigram_counts_overlap() {
        let mut vectorizer = TrigramVectorizer::new();
        let vectors = vectorizer.fit_transform(&["aaaa"]);
        assert_eq!(vectorizer.vocabulary_size(), 1);
        assert_eq!(vectors[0], vec![(0, 2)]);
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let mut vectorizer = TrigramVectorizer::new();
        let vectors = vectorizer.fit_transform(&["Ab  C", "ab c"]);
        assert_eq!(vectors[0], vectors[1]);
        // "ab " and "b c"
        assert_eq!(vectorizer.vocabulary_size(), 2);
    }

    #[test]
    fn test_short_text_has_no_trigrams() {
        let mut vectorizer = TrigramVectorizer::new();
        let vectors = vectorizer.fit_transform(&["hi"]);
        assert!(vectors[0].is_empty());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = vec![(0, 2), (2, 1)];
        let b = vec![(0, 1), (1, 3)];
        assert_eq!(manhattan(&a, &b), 1.0 + 3.0 + 1.0);
        assert_eq!(manhattan(&a, &a), 0.0);
        assert_eq!(manhattan(&a, &[]), 3.0);
    }

    #[test]
    fn test_distance_matrix_symmetric_zero_diagonal() {
        let mut vectorizer = TrigramVectorizer::new();
        let vectors = vectorizer.fit_transform(&["the cat sat", "the dog sat", "zzzzzz"]);
        let distances = distance_matrix(&vectors);

        assert_eq!(distances.shape(), &[3, 3]);
        for i in 0..3 {
            assert_eq!(distances[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(distances[[i, j]], distances[[j, i]]);
            }
        }
        assert!(distances[[0, 1]] < distances[[0, 2]]);
    }
}
