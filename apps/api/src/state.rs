use std::sync::Arc;

use crate::assessment::pipeline::Assessor;
use crate::document::DocumentReader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<Assessor>,
    /// Pluggable document reader. Default: PdfReader.
    pub reader: Arc<dyn DocumentReader>,
}
