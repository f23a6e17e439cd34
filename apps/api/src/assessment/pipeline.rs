//! Assessment pipeline — orchestrates one document from text to rating.
//!
//! Flow: chunk → extract (one oracle call per chunk) → refine (one call) →
//!       count (one call, or list lengths) → rate.
//!
//! Every stage runs sequentially. The first fatal error ends the request;
//! no partial result is returned.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::assessment::aggregator::{extract_evidence, refine_evidence};
use crate::assessment::chunker::TextChunker;
use crate::assessment::counter::count_criteria;
use crate::assessment::criteria::{CountMap, EvidenceMap};
use crate::assessment::rating::{rate, Rating};
use crate::assessment::AssessmentError;
use crate::llm_client::Oracle;

/// Where the per-category counts fed to the rating come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountSource {
    /// A dedicated counting call to the oracle.
    #[default]
    Oracle,
    /// Lengths of the refined evidence lists; no extra call.
    Evidence,
}

impl FromStr for CountSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(CountSource::Oracle),
            "evidence" => Ok(CountSource::Evidence),
            other => Err(format!("unknown count source '{other}' (expected 'oracle' or 'evidence')")),
        }
    }
}

/// Response body of a finished assessment.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub criterion: EvidenceMap,
    pub overall_rating: Rating,
}

/// Runs assessments against one oracle. Holds no per-request state and can be
/// shared across requests.
#[derive(Clone)]
pub struct Assessor {
    oracle: Arc<dyn Oracle>,
    chunker: TextChunker,
    count_source: CountSource,
}

impl Assessor {
    pub fn new(oracle: Arc<dyn Oracle>, chunker: TextChunker, count_source: CountSource) -> Self {
        Self {
            oracle,
            chunker,
            count_source,
        }
    }

    #[instrument(
        skip_all,
        fields(assessment_id = %Uuid::new_v4(), chars = text.chars().count())
    )]
    pub async fn assess(&self, text: &str) -> Result<Assessment, AssessmentError> {
        if text.trim().is_empty() {
            return Err(AssessmentError::EmptyDocument);
        }
        let oracle = self.oracle.as_ref();

        let extracted = extract_evidence(oracle, &self.chunker, text).await?;
        let criterion = refine_evidence(oracle, &extracted).await?;

        let counts = match self.count_source {
            CountSource::Oracle => count_criteria(oracle, &criterion).await?,
            CountSource::Evidence => CountMap::from_evidence(&criterion),
        };
        let overall_rating = rate(&counts)?;

        info!(
            satisfied = criterion.satisfied_categories(),
            rating = %overall_rating,
            "Assessment complete"
        );
        Ok(Assessment {
            criterion,
            overall_rating,
        })
    }
}
