//! Rule set service: use-cases for managing rule sets.

use tracing::{debug, warn};

use apiary_domain::change::Change;
use apiary_domain::error::ApiaryError;
use apiary_domain::id::RuleSetId;
use apiary_domain::rule_set::RuleSet;
use apiary_domain::workspace::{RuleSetCascade, Workspace};

use crate::ports::{ChangePublisher, RuleSetRepository};

/// Application service for rule set CRUD operations.
pub struct RuleSetService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: RuleSetRepository, P: ChangePublisher> RuleSetService<R, P> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Create a rule set after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::Validation`] if invariants fail, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace, rule_set), fields(rule_set_name = %rule_set.name))]
    pub async fn create_rule_set(
        &self,
        workspace: &mut Workspace,
        rule_set: RuleSet,
    ) -> Result<RuleSet, ApiaryError> {
        rule_set.validate()?;
        let stored = self.repo.create(rule_set).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule set creation");
        })?;
        let id = stored.id.clone();
        workspace.upsert_rule_set(stored.clone());
        debug!(rule_set_id = %id, "rule set created");
        self.publisher.publish(Change::RuleSetCreated { id }).await?;
        Ok(stored)
    }

    /// Replace a rule set's name, description or active flag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown rule set,
    /// [`ApiaryError::Validation`] if invariants fail, or the repository's
    /// error.
    #[tracing::instrument(skip(self, workspace, rule_set), fields(rule_set_id = %rule_set.id))]
    pub async fn update_rule_set(
        &self,
        workspace: &mut Workspace,
        rule_set: RuleSet,
    ) -> Result<RuleSet, ApiaryError> {
        workspace.rule_set(&rule_set.id)?;
        rule_set.validate()?;
        let stored = self.repo.update(rule_set).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule set update");
        })?;
        let id = stored.id.clone();
        workspace.upsert_rule_set(stored.clone());
        debug!("rule set updated");
        self.publisher.publish(Change::RuleSetUpdated { id }).await?;
        Ok(stored)
    }

    /// Toggle a rule set on or off.
    ///
    /// # Errors
    ///
    /// See [`update_rule_set`](Self::update_rule_set).
    pub async fn set_active(
        &self,
        workspace: &mut Workspace,
        id: &RuleSetId,
        is_active: bool,
    ) -> Result<RuleSet, ApiaryError> {
        let mut rule_set = workspace.rule_set(id)?.clone();
        rule_set.is_active = is_active;
        self.update_rule_set(workspace, rule_set).await
    }

    /// Delete a rule set. Its members are kept as standalone rules and
    /// groups stop applying it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown rule set, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn delete_rule_set(
        &self,
        workspace: &mut Workspace,
        id: RuleSetId,
    ) -> Result<RuleSetCascade, ApiaryError> {
        workspace.rule_set(&id)?;
        self.repo.delete(id.clone()).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule set deletion");
        })?;
        let cascade = workspace.remove_rule_set(&id)?;
        debug!(
            detached = cascade.detached_rules.len(),
            groups = cascade.groups.len(),
            "rule set deleted"
        );
        self.publisher
            .publish(Change::RuleSetDeleted {
                id,
                detached_rules: cascade.detached_rules.clone(),
                groups: cascade.groups.clone(),
            })
            .await?;
        Ok(cascade)
    }
}
