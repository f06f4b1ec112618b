use crate::domain::errors::DomainResult;

/// Port for the category label predictor.
///
/// Implementations are pure CPU work over read-only model state loaded
/// at startup; there is nothing to await.
pub trait LabelPredictor: Send + Sync {
    /// Predict a label per input text. The output has the same length
    /// and order as the input.
    ///
    /// Fails with [`DomainError::ModelUnavailable`] when no trained
    /// model has been loaded.
    ///
    /// [`DomainError::ModelUnavailable`]: crate::domain::errors::DomainError::ModelUnavailable
    fn predict(&self, texts: &[String]) -> DomainResult<Vec<String>>;
}
