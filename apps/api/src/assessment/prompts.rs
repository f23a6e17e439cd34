// Oracle prompt templates for the assessment pipeline.
// All prompts for the assessment module are defined here; builders fill the
// `{placeholders}` and nothing else.

use serde_json::Value;

use crate::assessment::criteria::{Category, EvidenceMap};

pub const EXTRACTION_PROMPT_TEMPLATE: &str = "\
You are assessing how a person is qualified for an O-1A immigration visa. \
You need to determine whether the resume contains information related to the following categories:

{category_definitions}

Context: The categories are: {category_names}

Question: List the categories with extracted information from the CV. \
Write one line per category in the form `Category: evidence`.

Rule: Do not list numbers. \
Be sure to utilize the section headers in the CV in which each entry lies to determine the categories. \
Make sure each experience does not lie in multiple categories. Do not change original content.

{chunk}";

pub const REFINEMENT_PROMPT_TEMPLATE: &str = "\
You need to identify and separate different experiences in a dictionary entry into multiple experiences. \
Remove any N/A or None mentioned.

{evidence}

Context: The categories are: {category_names}. These are defined as:

{category_definitions}

In Context Example: The experiences, Software Engineer Intern at Adobe and Software Engineer at Clario, \
should be separated into two experiences in the same category.

Rule: Do not list numbers. Do not rewrite. Make sure each experience only shows up in one category. \
Output a single dictionary literal that maps every one of the categories above to a list of strings, \
keeping categories without evidence as empty lists. Output nothing else.";

pub const COUNTING_PROMPT_TEMPLATE: &str = "\
Evaluate the following information in each category and summarize the count of evidence in each category:

{evidence}

Context: The categories are: {category_names}. These are defined as:

{category_definitions}

Question: Provide counts in integers for each category, one line per category in the form `Category: count`.
Answer:";

/// Prompt asking the oracle for `Category: evidence` lines from one chunk.
pub fn extraction_prompt(chunk: &str) -> String {
    fill(EXTRACTION_PROMPT_TEMPLATE).replace("{chunk}", chunk)
}

/// Prompt asking the oracle to clean up the accumulated map and return it
/// as a literal mapping.
pub fn refinement_prompt(evidence: &EvidenceMap) -> String {
    fill(REFINEMENT_PROMPT_TEMPLATE).replace("{evidence}", &render_evidence(evidence))
}

/// Prompt asking the oracle for `Category: count` lines.
pub fn counting_prompt(evidence: &EvidenceMap) -> String {
    fill(COUNTING_PROMPT_TEMPLATE).replace("{evidence}", &render_evidence(evidence))
}

/// Renders the map as a JSON object in category order, one key per line.
pub fn render_evidence(evidence: &EvidenceMap) -> String {
    let body = evidence
        .iter()
        .map(|(category, items)| {
            format!("  {}: {}", Value::from(category.name()), Value::from(items.to_vec()))
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{body}\n}}")
}

// The payload placeholders are substituted last so that document text which
// happens to contain `{category_names}` is left untouched.
fn fill(template: &str) -> String {
    template
        .replace("{category_definitions}", &category_definitions())
        .replace("{category_names}", &category_names())
}

fn category_definitions() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("{}: {}", c.name(), c.definition()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn category_names() -> String {
    Category::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}
