//! Change: an immutable record of a confirmed mutation.
//!
//! Changes are published after the backend accepted a write and the
//! workspace was updated, so presentation layers can refresh.

use serde::{Deserialize, Serialize};

use crate::id::{GroupId, RuleId, RuleSetId};

/// Something that changed in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    RuleCreated { id: RuleId },
    RuleUpdated { id: RuleId },
    /// `groups` lost their direct assignment of the rule.
    RuleDeleted { id: RuleId, groups: Vec<GroupId> },
    RuleSetCreated { id: RuleSetId },
    RuleSetUpdated { id: RuleSetId },
    /// Former members in `detached_rules` now belong to no rule set.
    RuleSetDeleted {
        id: RuleSetId,
        detached_rules: Vec<RuleId>,
        groups: Vec<GroupId>,
    },
    GroupUpdated { id: GroupId },
    /// The whole workspace was reloaded.
    Reloaded,
}
