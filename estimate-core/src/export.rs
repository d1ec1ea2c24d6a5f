//! Boundary to document exporters (PDF renderers and the like).
//!
//! The core hands an exporter one finished [`Estimate`] and gets opaque
//! bytes back. It does not retry or inspect the payload; reporting a failed
//! export is the caller's business.

use thiserror::Error;

use crate::models::Estimate;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render estimate {estimate_id}: {reason}")]
    Render {
        estimate_id: uuid::Uuid,
        reason: String,
    },
}

pub trait EstimateExporter {
    /// MIME type of the produced payload, e.g. `application/pdf`.
    fn content_type(&self) -> &'static str;

    /// Suggested file extension, without the dot.
    fn file_extension(&self) -> &'static str;

    fn export(
        &self,
        estimate: &Estimate,
    ) -> Result<Vec<u8>, ExportError>;
}
