//! Errors raised while extracting metrics from a lap's frames (C7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("cannot extract lap metrics from zero frames")]
    EmptyLap,
}
