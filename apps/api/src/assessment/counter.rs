use tracing::info;

use crate::assessment::criteria::{CountMap, EvidenceMap};
use crate::assessment::prompts::counting_prompt;
use crate::assessment::response_parser::parse_count_lines;
use crate::assessment::AssessmentError;
use crate::llm_client::Oracle;

/// Asks the oracle to count the refined evidence per category.
///
/// One call, no chunking. The result always holds all nine categories;
/// any the response does not mention, or mentions with a non-integer, is 0.
pub async fn count_criteria(
    oracle: &dyn Oracle,
    evidence: &EvidenceMap,
) -> Result<CountMap, AssessmentError> {
    let response = oracle.complete(&counting_prompt(evidence)).await?;
    let parsed = parse_count_lines(&response);

    info!(
        discarded_lines = parsed.discarded.len(),
        "Criteria counting complete"
    );
    Ok(parsed.value)
}
