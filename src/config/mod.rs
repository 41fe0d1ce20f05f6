//! Run configuration.
//!
//! A flat set of named, typed and defaulted keys. Values come from compiled defaults, then a
//! TOML file, then `CHAT_INSIGHTS_*` environment variables (see [`loader`]). Everything is
//! checked once by [`Config::validate`] right after loading, so the pipeline never has to
//! guess about a missing or malformed setting.

pub mod loader;

use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::analysis::reaction::{DEFAULT_BOUNDARIES, LatencyBoundaries};
use crate::clustering::{ClusterOptions, CorpusOptions, ReductionMethod, TsneParams};
use crate::enrichment::{DEFAULT_MEDIA_MARKER, DEFAULT_PAYMENT_MARKER, Markers};
use crate::utils::expand_tilde;

pub use loader::{load_config, load_config_from_path, load_config_from_str};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat export (`.json`, `.jsonl` or `.csv`)
    pub messages_file: PathBuf,
    /// Author to role table (`.json`, `.jsonl` or `.csv`)
    pub roles_file: PathBuf,
    pub output_folder: PathBuf,
    /// Latency bucket edges in minutes
    pub latency_boundaries: Vec<f64>,
    /// Row and column order of the reply matrix; empty means role-table order
    pub role_order: Vec<String>,
    pub fragment_size: usize,
    pub min_fragments: usize,
    pub min_author_messages: usize,
    /// 0 keeps every fragment
    pub max_fragments: usize,
    pub cluster_method: ReductionMethod,
    pub tsne_seed: u64,
    pub tsne_perplexity: f64,
    pub tsne_iterations: usize,
    /// Unset scales the step size with the number of fragments
    pub tsne_learning_rate: Option<f64>,
    pub media_marker: String,
    pub payment_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        let corpus = CorpusOptions::default();
        let tsne = TsneParams::default();
        Self {
            messages_file: PathBuf::new(),
            roles_file: PathBuf::new(),
            output_folder: PathBuf::from("output"),
            latency_boundaries: DEFAULT_BOUNDARIES.to_vec(),
            role_order: Vec::new(),
            fragment_size: corpus.fragment_size,
            min_fragments: corpus.min_fragments,
            min_author_messages: corpus.min_author_messages,
            max_fragments: corpus.max_fragments,
            cluster_method: ReductionMethod::default(),
            tsne_seed: tsne.seed,
            tsne_perplexity: tsne.perplexity,
            tsne_iterations: tsne.iterations,
            tsne_learning_rate: tsne.learning_rate,
            media_marker: DEFAULT_MEDIA_MARKER.to_string(),
            payment_marker: DEFAULT_PAYMENT_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Expand `~` in the configured file and folder paths
    pub fn expand_paths(&mut self) {
        for path in [&mut self.messages_file, &mut self.roles_file, &mut self.output_folder] {
            *path = expand_tilde(path);
        }
    }

    /// Fail fast on missing required keys and values no analysis could use
    pub fn validate(&self) -> Result<()> {
        if self.messages_file.as_os_str().is_empty() {
            bail!("Missing required configuration key 'messages_file'");
        }
        if self.roles_file.as_os_str().is_empty() {
            bail!("Missing required configuration key 'roles_file'");
        }
        if self.output_folder.as_os_str().is_empty() {
            bail!("Configuration key 'output_folder' must not be empty");
        }
        self.boundaries()?;
        if self.fragment_size == 0 {
            bail!("Configuration key 'fragment_size' must be greater than 0");
        }
        if !(self.tsne_perplexity.is_finite() && self.tsne_perplexity > 0.0) {
            bail!("Configuration key 'tsne_perplexity' must be a positive number");
        }
        if let Some(rate) = self.tsne_learning_rate
            && !(rate.is_finite() && rate > 0.0)
        {
            bail!("Configuration key 'tsne_learning_rate' must be a positive number");
        }
        if self.media_marker.is_empty() || self.payment_marker.is_empty() {
            bail!("Marker strings must not be empty");
        }
        if let Some(duplicate) =
            self.role_order.iter().enumerate().find(|(i, r)| self.role_order[..*i].contains(r))
        {
            bail!("Role '{}' appears more than once in 'role_order'", duplicate.1);
        }
        Ok(())
    }

    pub fn boundaries(&self) -> Result<LatencyBoundaries> {
        Ok(LatencyBoundaries::new(self.latency_boundaries.clone())?)
    }

    pub fn markers(&self) -> Markers {
        Markers { media: self.media_marker.clone(), payment: self.payment_marker.clone() }
    }

    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            corpus: CorpusOptions {
                fragment_size: self.fragment_size,
                min_fragments: self.min_fragments,
                min_author_messages: self.min_author_messages,
                max_fragments: self.max_fragments,
            },
            method: self.cluster_method,
            tsne: TsneParams {
                perplexity: self.tsne_perplexity,
                iterations: self.tsne_iterations,
                learning_rate: self.tsne_learning_rate,
                seed: self.tsne_seed,
            },
        }
    }
}
