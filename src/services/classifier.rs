//! Issue category classifier.
//!
//! A bag-of-words pipeline: TF-IDF feature weighting feeding a
//! multinomial naive Bayes model. Training is an offline CLI operation
//! that persists two JSON artifacts (vectorizer state, model state);
//! serving loads them once at startup into read-only state. When no
//! artifact is present, prediction fails with `ModelUnavailable` and is
//! never retried automatically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::LabelPredictor;

/// Artifact schema version, checked on load.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// English stop words excluded from the vocabulary.
const STOP_WORDS: [&str; 32] = [
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "if",
    "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "that", "the", "this", "to",
    "was", "we", "when", "with",
];

/// A labeled training example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: String,
}

/// Lower-case and split into word tokens of two or more alphanumeric
/// characters, dropping stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// TF-IDF vectorizer state.
///
/// Uses smoothed idf (`ln((1 + n) / (1 + df)) + 1`) and L2-normalized
/// output vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    format_version: u32,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from the corpus.
    fn fit(documents: &[Vec<String>]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in documents {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(token.clone()).or_insert(next_index);
                if index == document_frequency.len() {
                    document_frequency.push(0);
                }
                if !seen.contains(&index) {
                    document_frequency[index] += 1;
                    seen.push(index);
                }
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            vocabulary,
            idf,
        }
    }

    /// Transform one document into a sparse L2-normalized tf-idf vector.
    /// Tokens outside the vocabulary are ignored.
    fn transform(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut term_counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *term_counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: Vec<(usize, f64)> = term_counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut vector {
                *w /= norm;
            }
        }

        // Stable feature order keeps downstream sums deterministic.
        vector.sort_by_key(|&(index, _)| index);
        vector
    }

    fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }
}

/// Multinomial naive Bayes model state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    format_version: u32,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// Per-class smoothed log feature probabilities, indexed
    /// `[class][feature]`.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit with Laplace smoothing (alpha = 1.0).
    fn fit(vectors: &[Vec<(usize, f64)>], labels: &[String], n_features: usize) -> Self {
        let mut classes: Vec<String> = Vec::new();
        for label in labels {
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }

        let n_classes = classes.len();
        let mut class_counts = vec![0.0_f64; n_classes];
        let mut feature_counts = vec![vec![0.0_f64; n_features]; n_classes];

        for (vector, label) in vectors.iter().zip(labels) {
            let class = classes.iter().position(|c| c == label).unwrap_or(0);
            class_counts[class] += 1.0;
            for &(index, weight) in vector {
                feature_counts[class][index] += weight;
            }
        }

        let total = labels.len() as f64;
        let class_log_prior = class_counts.iter().map(|&c| (c / total).ln()).collect();

        let alpha = 1.0_f64;
        let feature_log_prob = feature_counts
            .iter()
            .map(|counts| {
                let class_total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                counts
                    .iter()
                    .map(|&c| ((c + alpha) / class_total).ln())
                    .collect()
            })
            .collect();

        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            classes,
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Predict the most likely class for one tf-idf vector.
    ///
    /// Ties resolve to the class seen first during training, keeping
    /// prediction deterministic.
    fn predict_one(&self, vector: &[(usize, f64)]) -> &str {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (class, prior) in self.class_log_prior.iter().enumerate() {
            let mut score = *prior;
            for &(index, weight) in vector {
                score += weight * self.feature_log_prob[class][index];
            }
            if score > best_score {
                best_score = score;
                best = class;
            }
        }

        &self.classes[best]
    }
}

/// A trained vectorizer + model pair.
#[derive(Debug, Clone)]
struct TrainedModel {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

/// The issue classifier: owns artifact paths and the loaded model.
pub struct IssueClassifier {
    vectorizer_path: PathBuf,
    model_path: PathBuf,
    state: RwLock<Option<TrainedModel>>,
}

impl IssueClassifier {
    pub fn new(vectorizer_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer_path: vectorizer_path.into(),
            model_path: model_path.into(),
            state: RwLock::new(None),
        }
    }

    /// Whether a trained model is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.state.read().is_ok_and(|s| s.is_some())
    }

    /// Load the persisted artifacts into read-only state.
    ///
    /// Fails with `ModelUnavailable` when either artifact is missing.
    pub fn load(&self) -> DomainResult<()> {
        if !self.vectorizer_path.exists() || !self.model_path.exists() {
            return Err(DomainError::ModelUnavailable);
        }

        let vectorizer: TfidfVectorizer = read_artifact(&self.vectorizer_path)?;
        let model: MultinomialNb = read_artifact(&self.model_path)?;

        if vectorizer.format_version != ARTIFACT_FORMAT_VERSION
            || model.format_version != ARTIFACT_FORMAT_VERSION
        {
            return Err(DomainError::Serialization(format!(
                "unsupported model artifact version (expected {ARTIFACT_FORMAT_VERSION})"
            )));
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| DomainError::Serialization("classifier state poisoned".to_string()))?;
        *state = Some(TrainedModel { vectorizer, model });
        Ok(())
    }

    /// Train on a labeled corpus, persist the artifacts, and load the
    /// new model. Offline/administrative; never runs on the request
    /// path.
    pub fn train(&self, corpus: &[TrainingExample]) -> DomainResult<()> {
        if corpus.is_empty() {
            return Err(DomainError::ValidationFailed(
                "training corpus is empty".to_string(),
            ));
        }

        let documents: Vec<Vec<String>> = corpus.iter().map(|ex| tokenize(&ex.text)).collect();
        let labels: Vec<String> = corpus.iter().map(|ex| ex.label.clone()).collect();

        let vectorizer = TfidfVectorizer::fit(&documents);
        let vectors: Vec<Vec<(usize, f64)>> = documents
            .iter()
            .map(|tokens| vectorizer.transform(tokens))
            .collect();
        let model = MultinomialNb::fit(&vectors, &labels, vectorizer.vocabulary_size());

        write_artifact(&self.vectorizer_path, &vectorizer)?;
        write_artifact(&self.model_path, &model)?;

        let mut state = self
            .state
            .write()
            .map_err(|_| DomainError::Serialization("classifier state poisoned".to_string()))?;
        *state = Some(TrainedModel { vectorizer, model });
        Ok(())
    }
}

impl LabelPredictor for IssueClassifier {
    fn predict(&self, texts: &[String]) -> DomainResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|_| DomainError::Serialization("classifier state poisoned".to_string()))?;
        let trained = state.as_ref().ok_or(DomainError::ModelUnavailable)?;

        Ok(texts
            .iter()
            .map(|text| {
                let tokens = tokenize(text);
                let vector = trained.vectorizer.transform(&tokens);
                trained.model.predict_one(&vector).to_string()
            })
            .collect())
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> DomainResult<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| DomainError::Serialization(format!("{}: {e}", path.display())))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> DomainResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Serialization(format!("{}: {e}", parent.display())))?;
        }
    }
    let bytes = serde_json::to_vec(value)?;
    std::fs::write(path, bytes)
        .map_err(|e| DomainError::Serialization(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_corpus() -> Vec<TrainingExample> {
        let examples = [
            ("Crash when opening settings panel", "bug"),
            ("Null pointer error on startup crash", "bug"),
            ("App crashes with segfault in parser", "bug"),
            ("Add dark mode support", "feature"),
            ("Support exporting reports as PDF", "feature"),
            ("Feature request: keyboard shortcuts", "feature"),
            ("Clarify install instructions in README", "docs"),
            ("Document the webhook configuration", "docs"),
        ];
        examples
            .iter()
            .map(|(text, label)| TrainingExample {
                text: (*text).to_string(),
                label: (*label).to_string(),
            })
            .collect()
    }

    fn trained_classifier(dir: &Path) -> IssueClassifier {
        let classifier =
            IssueClassifier::new(dir.join("vectorizer.json"), dir.join("model.json"));
        classifier.train(&sample_corpus()).expect("training failed");
        classifier
    }

    #[test]
    fn predict_without_artifacts_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = IssueClassifier::new(
            dir.path().join("missing-vectorizer.json"),
            dir.path().join("missing-model.json"),
        );

        assert!(matches!(
            classifier.load(),
            Err(DomainError::ModelUnavailable)
        ));
        assert!(matches!(
            classifier.predict(&["anything".to_string()]),
            Err(DomainError::ModelUnavailable)
        ));
    }

    #[test]
    fn output_length_equals_input_length() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(dir.path());

        for n in [0, 1, 5] {
            let texts: Vec<String> = (0..n).map(|i| format!("input text {i}")).collect();
            let labels = classifier.predict(&texts).unwrap();
            assert_eq!(labels.len(), n);
        }
    }

    #[test]
    fn learns_separable_categories() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(dir.path());

        let labels = classifier
            .predict(&[
                "crash with error on startup".to_string(),
                "please add a new export feature".to_string(),
            ])
            .unwrap();
        assert_eq!(labels[0], "bug");
        assert_eq!(labels[1], "feature");
    }

    #[test]
    fn artifacts_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let texts = vec!["crash with segfault error".to_string()];

        let expected = {
            let classifier = trained_classifier(dir.path());
            classifier.predict(&texts).unwrap()
        };

        // Fresh instance loads the persisted artifacts.
        let reloaded = IssueClassifier::new(
            dir.path().join("vectorizer.json"),
            dir.path().join("model.json"),
        );
        reloaded.load().expect("artifact load failed");
        assert_eq!(reloaded.predict(&texts).unwrap(), expected);
    }

    #[test]
    fn training_on_empty_corpus_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = IssueClassifier::new(
            dir.path().join("vectorizer.json"),
            dir.path().join("model.json"),
        );
        assert!(matches!(
            classifier.train(&[]),
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[test]
    fn prediction_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(dir.path());
        let texts = vec!["completely unrelated words".to_string()];

        let first = classifier.predict(&texts).unwrap();
        let second = classifier.predict(&texts).unwrap();
        assert_eq!(first, second);
    }
}
