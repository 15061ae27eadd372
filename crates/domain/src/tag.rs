//! Tag: a label attached to groups, optionally carrying rule overrides.
//!
//! A tag's `ruleOverrides` entries have the form `"ruleId:value"`. When the
//! tag is present on a group, `value` replaces the parameter of the named
//! rule for that group.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{RuleId, TagId};

/// Category of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagType {
    #[default]
    Mode,
    Status,
    Purpose,
    /// Categories added by the backend after this build.
    Other(String),
}

impl From<String> for TagType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mode" => Self::Mode,
            "status" => Self::Status,
            "purpose" => Self::Purpose,
            _ => Self::Other(value),
        }
    }
}

impl From<TagType> for String {
    fn from(value: TagType) -> Self {
        match value {
            TagType::Mode => "mode".to_string(),
            TagType::Status => "status".to_string(),
            TagType::Purpose => "purpose".to_string(),
            TagType::Other(code) => code,
        }
    }
}

/// A label that can be attached to groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_overrides: Option<Vec<String>>,
}

impl Tag {
    /// Create a builder for constructing a [`Tag`].
    #[must_use]
    pub fn builder() -> TagBuilder {
        TagBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Well-formed `(rule, value)` pairs from this tag's overrides, in order.
    ///
    /// Entries are split on the first `:`; entries missing either side are
    /// skipped.
    pub fn overrides(&self) -> impl Iterator<Item = (RuleId, &str)> {
        self.rule_overrides
            .iter()
            .flatten()
            .filter_map(|entry| parse_override(entry))
    }
}

fn parse_override(entry: &str) -> Option<(RuleId, &str)> {
    let (rule, value) = entry.split_once(':')?;
    if rule.is_empty() || value.is_empty() {
        return None;
    }
    Some((RuleId::from(rule), value))
}

/// Merge the rule overrides of `tag_ids`, looked up in `catalog`.
///
/// Tags are visited in the order given; when two tags override the same
/// rule the later one wins. Unknown tag ids and malformed entries are
/// skipped. Returns `None` when no override applies.
#[must_use]
pub fn tag_rule_overrides(tag_ids: &[TagId], catalog: &[Tag]) -> Option<HashMap<RuleId, String>> {
    let mut merged = HashMap::new();
    for tag_id in tag_ids {
        let Some(tag) = catalog.iter().find(|tag| &tag.id == tag_id) else {
            continue;
        };
        for (rule, value) in tag.overrides() {
            merged.insert(rule, value.to_string());
        }
    }
    if merged.is_empty() { None } else { Some(merged) }
}

/// Step-by-step builder for [`Tag`].
#[derive(Debug, Default)]
pub struct TagBuilder {
    id: Option<TagId>,
    name: Option<String>,
    kind: Option<TagType>,
    alert_level: Option<String>,
    rule_overrides: Vec<String>,
}

impl TagBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<TagId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TagType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn alert_level(mut self, level: impl Into<String>) -> Self {
        self.alert_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn rule_override(mut self, entry: impl Into<String>) -> Self {
        self.rule_overrides.push(entry.into());
        self
    }

    /// Consume the builder, validate, and return a [`Tag`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is missing or empty.
    pub fn build(self) -> Result<Tag, ValidationError> {
        let tag = Tag {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            alert_level: self.alert_level,
            rule_overrides: if self.rule_overrides.is_empty() {
                None
            } else {
                Some(self.rule_overrides)
            },
        };
        tag.validate()?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Tag> {
        vec![
            Tag::builder()
                .id("t1")
                .name("Winter")
                .rule_override("ruleA:5")
                .build()
                .unwrap(),
            Tag::builder()
                .id("t2")
                .name("Queenless")
                .kind(TagType::Status)
                .rule_override("ruleA:9")
                .rule_override("ruleB:2")
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn should_let_later_tag_win_for_same_rule() {
        let ids = [TagId::from("t1"), TagId::from("t2")];
        let overrides = tag_rule_overrides(&ids, &catalog()).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[&RuleId::from("ruleA")], "9");
        assert_eq!(overrides[&RuleId::from("ruleB")], "2");
    }

    #[test]
    fn should_follow_tag_id_order_not_catalog_order() {
        let ids = [TagId::from("t2"), TagId::from("t1")];
        let overrides = tag_rule_overrides(&ids, &catalog()).unwrap();
        assert_eq!(overrides[&RuleId::from("ruleA")], "5");
    }

    #[test]
    fn should_return_none_when_no_overrides_apply() {
        let plain = vec![Tag::builder().id("t3").name("Plain").build().unwrap()];
        assert!(tag_rule_overrides(&[TagId::from("t3")], &plain).is_none());
        assert!(tag_rule_overrides(&[TagId::from("missing")], &catalog()).is_none());
    }

    #[test]
    fn should_skip_malformed_entries() {
        let tag = Tag::builder()
            .id("t4")
            .name("Messy")
            .rule_override("noseparator")
            .rule_override(":7")
            .rule_override("ruleC:")
            .rule_override("ruleD:1:2")
            .build()
            .unwrap();
        let parsed: Vec<_> = tag.overrides().collect();
        assert_eq!(parsed, vec![(RuleId::from("ruleD"), "1:2")]);
    }

    #[test]
    fn should_reject_empty_name() {
        assert_eq!(Tag::builder().build(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_keep_unknown_tag_type_through_round_trip() {
        let json = serde_json::json!({
            "id": "t9",
            "name": "Swarm risk",
            "type": "forecast",
            "alertLevel": "high"
        });
        let tag: Tag = serde_json::from_value(json).unwrap();
        assert_eq!(tag.kind, TagType::Other("forecast".to_string()));
        assert_eq!(serde_json::to_value(&tag).unwrap()["type"], "forecast");
        assert_eq!(tag.alert_level.as_deref(), Some("high"));
        assert!(tag.rule_overrides.is_none());
    }
}
