use crate::message::{ChatMessage, MessageSection};
use crate::params::{is_empty_value, ParameterBag, ParameterSet};

/// Running summary of the parameters resolved so far, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStatusDisplay {
    entries: Vec<(String, String)>,
}

impl ParameterStatusDisplay {
    /// Build from the displayable, non-empty parameters. Pure: the same set
    /// and bag always give the same display.
    pub fn build(params: &ParameterSet, bag: &ParameterBag) -> Self {
        let entries = params
            .by_call_order()
            .into_iter()
            .filter(|spec| spec.display)
            .filter_map(|spec| {
                let value = bag.get(&spec.name);
                if is_empty_value(value) {
                    return None;
                }
                value.map(|v| (spec.display_name().to_string(), v.trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Message carrying the summary, ready for a prompt section to be appended.
    pub fn to_message(&self, title: &str) -> ChatMessage {
        let mut message = ChatMessage::new(title);
        if !self.is_empty() {
            message.push_section(MessageSection {
                title: Some("Current parameters".to_string()),
                text: self.render(),
                actions: Vec::new(),
            });
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSpec;
    use crate::setter::StaticChoiceSetter;
    use std::sync::Arc;

    fn params() -> ParameterSet {
        let setter = Arc::new(StaticChoiceSetter::new(["a", "b"]));
        ParameterSet::new()
            .with(ParameterSpec::recursive("projectName", 1, setter.clone()).label("Project"))
            .with(ParameterSpec::recursive("teamName", 0, setter.clone()).label("Team"))
            .with(ParameterSpec::recursive("secret", 2, setter).hidden())
            .with(ParameterSpec::input("note"))
    }

    #[test]
    fn summary_follows_call_order_and_skips_hidden() {
        let mut bag = ParameterBag::new();
        bag.insert("projectName".into(), "p1".into());
        bag.insert("teamName".into(), "alpha".into());
        bag.insert("secret".into(), "s3cr3t".into());
        let display = ParameterStatusDisplay::build(&params(), &bag);
        assert_eq!(display.render(), "Team: alpha\nProject: p1");
    }

    #[test]
    fn summary_is_deterministic() {
        let mut bag = ParameterBag::new();
        bag.insert("teamName".into(), "alpha".into());
        bag.insert("note".into(), "hello".into());
        let first = ParameterStatusDisplay::build(&params(), &bag);
        let second = ParameterStatusDisplay::build(&params(), &bag);
        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
        assert_eq!(first.to_message("x"), second.to_message("x"));
    }

    #[test]
    fn empty_values_are_not_shown() {
        let mut bag = ParameterBag::new();
        bag.insert("teamName".into(), "".into());
        let display = ParameterStatusDisplay::build(&params(), &bag);
        assert!(display.is_empty());
        assert!(display.to_message("x").sections.is_empty());
    }
}
