//! Grouping of the validated record set into a processed corpus

use crate::output::stats::{GroupCounts, Statistics};
use crate::records::{CodeExample, DocumentationItem, ValidatedRecordSet};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The validated corpus grouped for reporting
///
/// Group keys are sorted; inside a group, records keep their validated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCorpus {
    pub sections: BTreeMap<String, Vec<DocumentationItem>>,
    pub languages: BTreeMap<String, Vec<DocumentationItem>>,
    pub page_types: BTreeMap<String, Vec<DocumentationItem>>,
    /// An item appears once under each of its tags
    pub topics: BTreeMap<String, Vec<DocumentationItem>>,
    pub code_by_language: BTreeMap<String, Vec<CodeExample>>,
    pub statistics: Statistics,
}

impl ProcessedCorpus {
    /// Every item, section by section
    pub fn items(&self) -> impl Iterator<Item = &DocumentationItem> {
        self.sections.values().flatten()
    }
}

/// Groups `records` and computes statistics, stamped with the current local time
pub fn aggregate(records: &ValidatedRecordSet) -> ProcessedCorpus {
    aggregate_at(records, Local::now().naive_local())
}

/// Groups `records` and computes statistics, stamped with `processed_at`
pub fn aggregate_at(records: &ValidatedRecordSet, processed_at: NaiveDateTime) -> ProcessedCorpus {
    let mut sections: BTreeMap<String, Vec<DocumentationItem>> = BTreeMap::new();
    let mut languages: BTreeMap<String, Vec<DocumentationItem>> = BTreeMap::new();
    let mut page_types: BTreeMap<String, Vec<DocumentationItem>> = BTreeMap::new();
    let mut topics: BTreeMap<String, Vec<DocumentationItem>> = BTreeMap::new();

    for item in &records.documentation_items {
        push(&mut sections, &item.section, item);
        push(&mut languages, &item.language, item);
        push(&mut page_types, &item.page_type, item);
        for tag in &item.tags {
            push(&mut topics, tag, item);
        }
    }

    let mut code_by_language: BTreeMap<String, Vec<CodeExample>> = BTreeMap::new();
    for example in &records.code_examples {
        push(&mut code_by_language, &example.language, example);
    }

    let groups = GroupCounts {
        sections: sections.len(),
        languages: languages.len(),
        page_types: page_types.len(),
        topics: topics.len(),
    };
    let statistics = Statistics::compute(
        &records.documentation_items,
        &records.code_examples,
        records.links.len(),
        groups,
        processed_at,
    );

    ProcessedCorpus {
        sections,
        languages,
        page_types,
        topics,
        code_by_language,
        statistics,
    }
}

fn push<T: Clone>(groups: &mut BTreeMap<String, Vec<T>>, key: &str, value: &T) {
    groups.entry(key.to_string()).or_default().push(value.clone());
}
