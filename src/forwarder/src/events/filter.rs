use crate::constants::TAGS_FIELD;
use crate::events::RawEvent;
use serde_json::Value;

/// The host pipeline's output predicate: an event is forwarded only when it
/// carries every required tag and none of the excluded ones.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    tags: Vec<String>,
    exclude_tags: Vec<String>,
}

impl EventFilter {
    pub fn new(tags: Vec<String>, exclude_tags: Vec<String>) -> Self {
        EventFilter { tags, exclude_tags }
    }

    pub fn is_pass_through(&self) -> bool {
        self.tags.is_empty() && self.exclude_tags.is_empty()
    }

    pub fn accepts(&self, event: &RawEvent) -> bool {
        if self.is_pass_through() {
            return true;
        }

        let event_tags = event_tags(event);
        let has = |tag: &String| event_tags.iter().any(|t| *t == tag.as_str());

        self.tags.iter().all(has) && !self.exclude_tags.iter().any(has)
    }
}

// `tags` may arrive as a single string or an array of strings
fn event_tags(event: &RawEvent) -> Vec<&str> {
    match event.get(TAGS_FIELD) {
        Some(Value::String(tag)) => vec![tag.as_str()],
        Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> RawEvent {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = EventFilter::default();

        assert!(filter.accepts(&event(json!({ "message": "hello" }))));
        assert!(filter.accepts(&event(json!({ "tags": ["anything"] }))));
    }

    #[test]
    fn requires_all_tags() {
        let filter = EventFilter::new(vec!["prod".into(), "web".into()], vec![]);

        assert!(filter.accepts(&event(json!({ "tags": ["web", "prod", "eu"] }))));
        assert!(!filter.accepts(&event(json!({ "tags": ["prod"] }))));
        assert!(!filter.accepts(&event(json!({ "message": "untagged" }))));
    }

    #[test]
    fn excluded_tag_wins() {
        let filter = EventFilter::new(vec!["prod".into()], vec!["_grokparsefailure".into()]);

        assert!(!filter.accepts(&event(json!({ "tags": ["prod", "_grokparsefailure"] }))));
        assert!(filter.accepts(&event(json!({ "tags": "prod" }))));
    }
}
