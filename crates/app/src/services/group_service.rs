//! Group service: rule assignments and automatic monitoring of groups.
//!
//! Guards run on a copy of the group. Only when the backend accepts the
//! edited copy does it replace the local one.

use tracing::{debug, warn};

use apiary_domain::change::Change;
use apiary_domain::error::ApiaryError;
use apiary_domain::group::Group;
use apiary_domain::id::{GroupId, RuleId, RuleSetId};
use apiary_domain::workspace::Workspace;

use crate::ports::{ChangePublisher, GroupRepository};

/// Application service for group assignments.
pub struct GroupService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: GroupRepository, P: ChangePublisher> GroupService<R, P> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    async fn save(&self, workspace: &mut Workspace, group: Group) -> Result<Group, ApiaryError> {
        let stored = self.repo.update(group).await.inspect_err(|err| {
            warn!(error = %err, "backend refused group update");
        })?;
        workspace.update_group(stored.clone())?;
        debug!(group_id = %stored.id, "group updated");
        self.publisher
            .publish(Change::GroupUpdated {
                id: stored.id.clone(),
            })
            .await?;
        Ok(stored)
    }

    /// Directly assign a rule to a group.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown group or rule,
    /// [`ApiaryError::Conflict`] when the rule already applies, directly or
    /// through an applied rule set, or the repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn assign_rule(
        &self,
        workspace: &mut Workspace,
        group: &GroupId,
        rule: &RuleId,
    ) -> Result<Group, ApiaryError> {
        let mut edited = workspace.group(group)?.clone();
        let rule = workspace.rule(rule)?;
        edited.assign_rule(rule).inspect_err(|err| {
            warn!(reason = %err, "assignment declined");
        })?;
        self.save(workspace, edited).await
    }

    /// Remove a direct assignment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown group or rule,
    /// [`ApiaryError::Conflict`] when the rule is inherited through a rule
    /// set or not applied at all, or the repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn unassign_rule(
        &self,
        workspace: &mut Workspace,
        group: &GroupId,
        rule: &RuleId,
    ) -> Result<Group, ApiaryError> {
        let mut edited = workspace.group(group)?.clone();
        let rule = workspace.rule(rule)?;
        edited.unassign_rule(rule).inspect_err(|err| {
            warn!(reason = %err, "unassignment declined");
        })?;
        self.save(workspace, edited).await
    }

    /// Apply a rule set so its members are inherited.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown group or rule set,
    /// [`ApiaryError::Conflict`] when it is already applied, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn apply_rule_set(
        &self,
        workspace: &mut Workspace,
        group: &GroupId,
        rule_set: &RuleSetId,
    ) -> Result<Group, ApiaryError> {
        let mut edited = workspace.group(group)?.clone();
        workspace.rule_set(rule_set)?;
        edited.apply_rule_set(rule_set).inspect_err(|err| {
            warn!(reason = %err, "rule set application declined");
        })?;
        self.save(workspace, edited).await
    }

    /// Stop applying a rule set. Nothing is sent when it was not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown group, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn remove_rule_set(
        &self,
        workspace: &mut Workspace,
        group: &GroupId,
        rule_set: &RuleSetId,
    ) -> Result<Group, ApiaryError> {
        let mut edited = workspace.group(group)?.clone();
        if !edited.remove_rule_set(rule_set) {
            debug!("rule set was not applied");
            return Ok(edited);
        }
        self.save(workspace, edited).await
    }

    /// Turn the group's automatic monitoring on or off.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown group, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn set_automatic_mode(
        &self,
        workspace: &mut Workspace,
        group: &GroupId,
        enabled: bool,
    ) -> Result<Group, ApiaryError> {
        let mut edited = workspace.group(group)?.clone();
        edited.automatic_mode = enabled;
        self.save(workspace, edited).await
    }
}
