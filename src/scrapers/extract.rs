//! HTML selection helpers and the extraction entry points.

use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::tasks::task_spec;
use crate::models::{Record, RecordSet, TaskType};

/// Parse a CSS selector, logging instead of failing on a bad pattern.
pub(super) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {:?}", css, e);
            None
        }
    }
}

/// Concatenated text content of an element, untrimmed.
pub(super) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// One record per element matching `css`, holding its trimmed text under `field`.
pub(super) fn single_text_field(document: &Html, css: &str, field: &'static str) -> RecordSet {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| Record::new().with(field, Some(text_of(element).trim().to_string())))
        .collect()
}

/// Extract records from `content` using the rules for `task_type`.
pub fn extract(content: &str, task_type: TaskType) -> RecordSet {
    let records = task_spec(task_type).extract(content);
    if records.is_empty() {
        info!("No {} records found in page", task_type);
    } else {
        info!("Extracted {} {} record(s)", records.len(), task_type);
    }
    records
}

/// Extract by task type name. Unknown names yield no records.
pub fn extract_named(content: &str, task_type: &str) -> RecordSet {
    match TaskType::from_str(task_type) {
        Some(task_type) => extract(content, task_type),
        None => {
            warn!("Unknown task type '{}'; nothing extracted", task_type);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_selector_is_none() {
        assert!(selector("div[").is_none());
        assert!(selector("div.ok").is_some());
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        for task_type in TaskType::ALL {
            assert!(extract("<html><body><p>nothing here</p></body></html>", task_type).is_empty());
        }
        assert!(extract("", TaskType::Books).is_empty());
    }

    #[test]
    fn test_unknown_task_name_is_empty() {
        let html = r#"<div class="bookTitle">Dune</div>"#;
        assert!(extract_named(html, "podcasts").is_empty());
        assert_eq!(extract_named(html, "books").len(), 1);
    }

    #[test]
    fn test_text_of_joins_nested_text() {
        let document = Html::parse_fragment("<h3>Big <b>news</b> today</h3>");
        let h3 = selector("h3").unwrap();
        let element = document.select(&h3).next().unwrap();
        assert_eq!(text_of(element), "Big news today");
    }
}
