//! The nine O-1A evidentiary criteria and the per-category maps built over them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One of the nine fixed O-1A criteria. Declaration order is the order used
/// everywhere a category list is rendered or serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Nobel Prize")]
    NobelPrize,
    #[serde(rename = "Awards")]
    Awards,
    #[serde(rename = "Membership")]
    Membership,
    #[serde(rename = "Press")]
    Press,
    #[serde(rename = "Judging")]
    Judging,
    #[serde(rename = "Original Contribution")]
    OriginalContribution,
    #[serde(rename = "Scholarly Articles")]
    ScholarlyArticles,
    #[serde(rename = "Critical Employment")]
    CriticalEmployment,
    #[serde(rename = "High Remuneration")]
    HighRemuneration,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::NobelPrize,
        Category::Awards,
        Category::Membership,
        Category::Press,
        Category::Judging,
        Category::OriginalContribution,
        Category::ScholarlyArticles,
        Category::CriticalEmployment,
        Category::HighRemuneration,
    ];

    /// The label the oracle is asked to use, and the JSON key in responses.
    pub const fn name(self) -> &'static str {
        match self {
            Category::NobelPrize => "Nobel Prize",
            Category::Awards => "Awards",
            Category::Membership => "Membership",
            Category::Press => "Press",
            Category::Judging => "Judging",
            Category::OriginalContribution => "Original Contribution",
            Category::ScholarlyArticles => "Scholarly Articles",
            Category::CriticalEmployment => "Critical Employment",
            Category::HighRemuneration => "High Remuneration",
        }
    }

    pub const fn definition(self) -> &'static str {
        match self {
            Category::NobelPrize => "Awarded the Nobel Prize in the field of endeavor",
            Category::Awards => {
                "Documentation of the beneficiary's receipt of nationally or internationally \
                 recognized prizes or awards for excellence in the field of endeavor"
            }
            Category::Membership => {
                "Documentation of the beneficiary's membership in associations in the field \
                 for which classification is sought, which require outstanding achievements \
                 of their members, as judged by recognized national or international experts \
                 in their disciplines or fields"
            }
            Category::Press => {
                "Published material in professional or major trade publications or major media \
                 about the beneficiary, relating to the beneficiary's work in the field for \
                 which classification is sought, which must include the title, date, and \
                 author of such published material, and any necessary translation"
            }
            Category::Judging => {
                "Evidence of the beneficiary's participation on a panel or individually, as a \
                 judge of the work of others in the same or in an allied field of \
                 specialization for which classification is sought"
            }
            Category::OriginalContribution => {
                "Evidence of the beneficiary's original scientific, scholarly, or \
                 business-related contributions of major significance in the field"
            }
            Category::ScholarlyArticles => {
                "Evidence of the beneficiary's authorship of scholarly articles in the field, \
                 in professional journals, or other major media"
            }
            Category::CriticalEmployment => {
                "Evidence that the beneficiary has been employed in a critical or essential \
                 capacity for organizations and establishments that have a distinguished \
                 reputation"
            }
            Category::HighRemuneration => {
                "Evidence that the beneficiary has either commanded a high salary or will \
                 command a high salary or other remuneration for services, as evidenced by \
                 contracts or other reliable evidence"
            }
        }
    }

    /// Exact, case-sensitive lookup by label.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evidence strings per category, in extraction order.
///
/// Every category is always present as a key; the field is private so the
/// invariant cannot be broken from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvidenceMap(BTreeMap<Category, Vec<String>>);

impl EvidenceMap {
    pub fn new() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, Vec::new())).collect())
    }

    pub fn push(&mut self, category: Category, evidence: impl Into<String>) {
        self.0.entry(category).or_default().push(evidence.into());
    }

    /// Replaces the whole sequence for `category`.
    pub fn set(&mut self, category: Category, evidence: Vec<String>) {
        self.0.insert(category, evidence);
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends every entry of `other` after the entries already held.
    pub fn append(&mut self, other: EvidenceMap) {
        for (category, items) in other.0 {
            self.0.entry(category).or_default().extend(items);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.0.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    /// Number of categories holding at least one entry.
    pub fn satisfied_categories(&self) -> usize {
        self.0.values().filter(|items| !items.is_empty()).count()
    }

    pub fn total_entries(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl Default for EvidenceMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Evidence count per category.
///
/// Maps produced by the pipeline always hold all nine keys. Maps assembled by
/// hand (`FromIterator`) may not, which the rating engine treats as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountMap(BTreeMap<Category, u32>);

impl CountMap {
    /// All nine categories at zero.
    pub fn zeroed() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, 0)).collect())
    }

    /// Counts taken directly from evidence list lengths.
    pub fn from_evidence(evidence: &EvidenceMap) -> Self {
        evidence
            .iter()
            .map(|(c, items)| (c, u32::try_from(items.len()).unwrap_or(u32::MAX)))
            .collect()
    }

    pub fn set(&mut self, category: Category, count: u32) {
        self.0.insert(category, count);
    }

    pub fn get(&self, category: Category) -> Option<u32> {
        self.0.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }
}

impl FromIterator<(Category, u32)> for CountMap {
    fn from_iter<I: IntoIterator<Item = (Category, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(Category::from_name("awards"), None);
        assert_eq!(Category::from_name("Nobel prize"), None);
        assert_eq!(Category::from_name(" Awards"), None);
    }

    #[test]
    fn test_every_category_has_a_definition() {
        for category in Category::ALL {
            assert!(!category.definition().is_empty(), "{category} has no definition");
        }
    }

    #[test]
    fn test_new_evidence_map_has_all_keys_empty() {
        let map = EvidenceMap::new();
        assert_eq!(map.iter().count(), 9);
        assert_eq!(map.satisfied_categories(), 0);
        assert_eq!(map.total_entries(), 0);
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let mut running = EvidenceMap::new();
        running.push(Category::Awards, "Fellowship");

        let mut next = EvidenceMap::new();
        next.push(Category::Awards, "Fellowship");
        next.push(Category::Awards, "Best Paper");
        running.append(next);

        assert_eq!(
            running.get(Category::Awards),
            ["Fellowship", "Fellowship", "Best Paper"]
        );
        assert_eq!(running.satisfied_categories(), 1);
    }

    #[test]
    fn test_evidence_map_serializes_with_display_names_in_order() {
        let mut map = EvidenceMap::new();
        map.push(Category::Judging, "Reviewer, NeurIPS");
        let json = serde_json::to_value(&map).unwrap();

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(json["Judging"][0], "Reviewer, NeurIPS");
        assert_eq!(json["Nobel Prize"], serde_json::json!([]));
    }

    #[test]
    fn test_count_map_from_evidence_uses_lengths() {
        let mut map = EvidenceMap::new();
        map.push(Category::Press, "Profile in Wired");
        map.push(Category::Press, "Interview on NPR");
        let counts = CountMap::from_evidence(&map);

        assert_eq!(counts.get(Category::Press), Some(2));
        assert_eq!(counts.get(Category::NobelPrize), Some(0));
        assert_eq!(counts.iter().count(), 9);
    }

    #[test]
    fn test_hand_built_count_map_may_miss_keys() {
        let counts: CountMap = [(Category::Awards, 1)].into_iter().collect();
        assert_eq!(counts.get(Category::NobelPrize), None);
    }
}
