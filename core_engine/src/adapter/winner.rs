use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query surface a widget may offer once a winner is decided.
pub trait WinnerQuery {
    fn winner_name(&self) -> Option<String> {
        None
    }

    fn winners(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Payload of the widget's "goal" signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalEvent {
    #[serde(default)]
    pub detail: Value,
}

impl GoalEvent {
    pub fn new(detail: Value) -> Self {
        Self { detail }
    }
}

/// Where to look for a winner's name, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerSources {
    pub detail_fields: Vec<String>,
}

impl Default for WinnerSources {
    fn default() -> Self {
        Self {
            detail_fields: ["name", "winner", "title"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl WinnerSources {
    pub fn new(detail_fields: Vec<String>) -> Self {
        Self { detail_fields }
    }

    /// Event detail fields first, then `winner_name()`, then the first of
    /// `winners()`. Blank candidates are skipped.
    pub fn extract(&self, event: &GoalEvent, query: &dyn WinnerQuery) -> Option<String> {
        self.detail_fields
            .iter()
            .find_map(|field| event.detail.get(field).and_then(value_as_name))
            .or_else(|| query.winner_name().filter(|name| is_present(name)))
            .or_else(|| query.winners().into_iter().next().filter(|name| is_present(name)))
    }
}

fn value_as_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    is_present(&name).then_some(name)
}

fn is_present(name: &str) -> bool {
    !name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Query {
        name: Option<String>,
        list: Vec<String>,
    }

    impl WinnerQuery for Query {
        fn winner_name(&self) -> Option<String> {
            self.name.clone()
        }

        fn winners(&self) -> Vec<String> {
            self.list.clone()
        }
    }

    struct Silent;

    impl WinnerQuery for Silent {}

    fn query(name: Option<&str>, list: &[&str]) -> Query {
        Query {
            name: name.map(String::from),
            list: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn detail_fields_in_priority_order() {
        let sources = WinnerSources::default();
        let event = GoalEvent::new(json!({ "title": "T", "winner": "W" }));
        assert_eq!(
            sources.extract(&event, &query(Some("Q"), &["L"])).as_deref(),
            Some("W")
        );

        let event = GoalEvent::new(json!({ "name": "N", "winner": "W" }));
        assert_eq!(sources.extract(&event, &Silent).as_deref(), Some("N"));
    }

    #[test]
    fn falls_back_to_queries() {
        let sources = WinnerSources::default();
        let event = GoalEvent::default();
        assert_eq!(
            sources.extract(&event, &query(Some("Q"), &["L"])).as_deref(),
            Some("Q")
        );
        assert_eq!(
            sources.extract(&event, &query(None, &["L", "M"])).as_deref(),
            Some("L")
        );
        assert_eq!(
            sources.extract(&event, &query(Some("   "), &["L"])).as_deref(),
            Some("L")
        );
    }

    #[test]
    fn skips_blank_and_non_string_detail() {
        let sources = WinnerSources::default();
        let event = GoalEvent::new(json!({ "name": "  ", "winner": {"x": 1}, "title": 42 }));
        assert_eq!(sources.extract(&event, &Silent).as_deref(), Some("42"));
    }

    #[test]
    fn nothing_found() {
        let sources = WinnerSources::default();
        let event = GoalEvent::new(json!("not an object"));
        assert_eq!(sources.extract(&event, &query(None, &[" "])), None);
    }

    #[test]
    fn custom_fields() {
        let sources = WinnerSources::new(vec!["label".to_string()]);
        let event = GoalEvent::new(json!({ "name": "ignored", "label": "Picked" }));
        assert_eq!(sources.extract(&event, &Silent).as_deref(), Some("Picked"));
    }

    #[test]
    fn goal_event_without_detail() {
        let event: GoalEvent = serde_json::from_str("{}").unwrap();
        assert!(event.detail.is_null());
    }
}
