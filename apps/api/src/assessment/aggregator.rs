//! Evidence aggregation: per-chunk extraction followed by one refinement pass.

use tracing::{debug, info, warn};

use crate::assessment::chunker::TextChunker;
use crate::assessment::criteria::{Category, EvidenceMap};
use crate::assessment::prompts::{extraction_prompt, refinement_prompt};
use crate::assessment::response_parser::{parse_evidence_lines, parse_literal_response, LineParse};
use crate::assessment::AssessmentError;
use crate::llm_client::Oracle;

/// Running evidence for one document.
///
/// Chunk results are appended in arrival order. Nothing is overwritten or
/// deduplicated here; overlap duplicates are left for refinement.
#[derive(Debug, Default)]
pub struct EvidenceAggregator {
    evidence: EvidenceMap,
    chunks: usize,
    discarded_lines: usize,
}

impl EvidenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one chunk's parsed extraction response into the running map.
    pub fn absorb(&mut self, parsed: LineParse<EvidenceMap>) {
        self.chunks += 1;
        self.discarded_lines += parsed.discarded.len();
        self.evidence.append(parsed.value);
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn discarded_lines(&self) -> usize {
        self.discarded_lines
    }

    pub fn finish(self) -> EvidenceMap {
        self.evidence
    }
}

/// Runs one extraction call per chunk, strictly in chunk order, and
/// accumulates the parsed lines.
pub async fn extract_evidence(
    oracle: &dyn Oracle,
    chunker: &TextChunker,
    text: &str,
) -> Result<EvidenceMap, AssessmentError> {
    let mut aggregator = EvidenceAggregator::new();

    for (index, chunk) in chunker.chunks(text).enumerate() {
        let response = oracle.complete(&extraction_prompt(chunk)).await?;
        let parsed = parse_evidence_lines(&response);
        debug!(
            chunk = index,
            entries = parsed.value.total_entries(),
            discarded = parsed.discarded.len(),
            "Parsed extraction response"
        );
        aggregator.absorb(parsed);
    }

    info!(
        chunks = aggregator.chunks(),
        discarded_lines = aggregator.discarded_lines(),
        "Extraction complete"
    );
    Ok(aggregator.finish())
}

/// Sends the accumulated map through the refinement prompt once and returns
/// the oracle's cleaned-up map.
///
/// The response must be a well-formed mapping literal naming all nine
/// categories. Unknown keys are dropped.
pub async fn refine_evidence(
    oracle: &dyn Oracle,
    extracted: &EvidenceMap,
) -> Result<EvidenceMap, AssessmentError> {
    let response = oracle.complete(&refinement_prompt(extracted)).await?;
    let entries = parse_literal_response(&response)?;
    let refined = evidence_from_entries(entries)?;

    info!(
        before = extracted.total_entries(),
        after = refined.total_entries(),
        "Refinement complete"
    );
    Ok(refined)
}

fn evidence_from_entries(entries: Vec<(String, Vec<String>)>) -> Result<EvidenceMap, AssessmentError> {
    let mut evidence = EvidenceMap::new();
    let mut seen = Vec::with_capacity(Category::ALL.len());

    for (key, items) in entries {
        match Category::from_name(key.trim()) {
            Some(category) => {
                evidence.set(category, items);
                seen.push(category);
            }
            None => warn!("Refinement returned unknown category {key:?}; dropping it"),
        }
    }

    match Category::ALL.into_iter().find(|c| !seen.contains(c)) {
        Some(missing) => Err(AssessmentError::MissingCategory(missing)),
        None => Ok(evidence),
    }
}
