//! @ai:module:intent Decide which tasks a set of property-file filters selects
//! @ai:module:layer domain
//! @ai:module:public_api TaskFilterEngine
//! @ai:module:stateless true

use crate::definition::task::TaskReference;
use crate::definition::verdict::PropertyFilter;

/// @ai:intent Pure predicate over tasks and property filters
/// @ai:effects pure
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilterEngine;

impl TaskFilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Check whether a single filter selects a task
    /// @ai:effects pure
    pub fn selects(&self, task: &TaskReference, filter: &PropertyFilter) -> bool {
        task.property(&filter.property_file)
            .map(|association| filter.verdict.accepts(&association.expected_verdict))
            .unwrap_or(false)
    }

    /// @ai:intent Find the first filter that selects a task.
    ///            Returns Some(None) when there are no filters, since then every task is selected.
    /// @ai:effects pure
    pub fn first_match<'f>(
        &self,
        task: &TaskReference,
        filters: &'f [PropertyFilter],
    ) -> Option<Option<&'f PropertyFilter>> {
        if filters.is_empty() {
            return Some(None);
        }

        filters
            .iter()
            .find(|filter| self.selects(task, filter))
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::task::PropertyAssociation;
    use crate::definition::verdict::ExpectedVerdict;
    use std::path::PathBuf;

    fn task(id: &str, properties: Vec<(&str, ExpectedVerdict)>) -> TaskReference {
        TaskReference {
            id: id.to_string(),
            input_files: vec![format!("{}.c", id)],
            properties: properties
                .into_iter()
                .map(|(file, expected_verdict)| PropertyAssociation {
                    property_file: PathBuf::from(file),
                    expected_verdict,
                })
                .collect(),
            required_files: vec![],
            options: None,
        }
    }

    fn filter(attr: Option<&str>) -> PropertyFilter {
        PropertyFilter::new("test.prp", attr).unwrap()
    }

    #[test]
    fn test_task_without_property_never_selected() {
        let engine = TaskFilterEngine::new();
        let other = task("other", vec![("other.prp", ExpectedVerdict::False { subproperty: None })]);

        for attr in [None, Some("true"), Some("false"), Some("unknown"), Some("false(sub)")] {
            assert!(!engine.selects(&other, &filter(attr)), "filter {:?}", attr);
        }
    }

    #[test]
    fn test_property_presence_without_verdict() {
        let engine = TaskFilterEngine::new();
        let t = task("t", vec![("test.prp", ExpectedVerdict::True)]);
        assert!(engine.selects(&t, &filter(None)));
    }

    #[test]
    fn test_verdict_filters() {
        let engine = TaskFilterEngine::new();
        let true_task = task("true", vec![("test.prp", ExpectedVerdict::True)]);
        let unknown_task = task("unknown", vec![("test.prp", ExpectedVerdict::Unknown)]);
        let sub_task = task(
            "sub",
            vec![(
                "test.prp",
                ExpectedVerdict::False {
                    subproperty: Some("sub".to_string()),
                },
            )],
        );

        assert!(engine.selects(&true_task, &filter(Some("true"))));
        assert!(!engine.selects(&true_task, &filter(Some("false"))));
        assert!(engine.selects(&unknown_task, &filter(Some("unknown"))));
        assert!(!engine.selects(&unknown_task, &filter(Some("false"))));
        assert!(engine.selects(&sub_task, &filter(Some("false"))));
        assert!(engine.selects(&sub_task, &filter(Some("false(sub)"))));
        assert!(!engine.selects(&sub_task, &filter(Some("false(sub2)"))));
    }

    #[test]
    fn test_first_match() {
        let engine = TaskFilterEngine::new();
        let t = task("t", vec![("test.prp", ExpectedVerdict::True)]);

        assert_eq!(engine.first_match(&t, &[]), Some(None));

        let filters = vec![filter(Some("false")), filter(Some("true")), filter(None)];
        assert_eq!(engine.first_match(&t, &filters), Some(Some(&filters[1])));

        let filters = vec![filter(Some("unknown"))];
        assert_eq!(engine.first_match(&t, &filters), None);
    }
}
