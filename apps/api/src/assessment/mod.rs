// O-1A eligibility assessment.
// Implements: chunking, prompt building, response parsing, evidence aggregation,
// criteria counting, rating. All oracle calls go through the llm_client::Oracle trait.

use thiserror::Error;

use crate::assessment::criteria::Category;
use crate::assessment::literal::LiteralError;
use crate::document::DocumentParseError;
use crate::llm_client::OracleError;

pub mod aggregator;
pub mod chunker;
pub mod counter;
pub mod criteria;
pub mod handlers;
pub mod literal;
pub mod pipeline;
pub mod prompts;
pub mod rating;
pub mod response_parser;

#[cfg(test)]
pub(crate) mod testing;

/// Fatal pipeline failures. Any of these fails the whole request.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("oracle returned an unparseable mapping: {0}")]
    Parse(#[from] LiteralError),

    #[error("required category \"{0}\" is missing")]
    MissingCategory(Category),

    #[error(transparent)]
    Document(#[from] DocumentParseError),

    #[error("document contains no extractable text")]
    EmptyDocument,
}
