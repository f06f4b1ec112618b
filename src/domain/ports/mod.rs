//! Ports: trait boundaries between the domain and its adapters.

pub mod issue_repository;
pub mod label_predictor;

pub use issue_repository::IssueRepository;
pub use label_predictor::LabelPredictor;
