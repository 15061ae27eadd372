//! Catalog service: load every collection from the backend at once.

use tracing::{info, warn};

use apiary_domain::change::Change;
use apiary_domain::error::ApiaryError;
use apiary_domain::workspace::Workspace;

use crate::ports::{ChangePublisher, GroupRepository, RuleRepository, RuleSetRepository, TagRepository};

/// Reloads a [`Workspace`] from the repositories.
pub struct CatalogService<RR, SR, TR, GR, P> {
    rules: RR,
    rule_sets: SR,
    tags: TR,
    groups: GR,
    publisher: P,
}

impl<RR, SR, TR, GR, P> CatalogService<RR, SR, TR, GR, P>
where
    RR: RuleRepository,
    SR: RuleSetRepository,
    TR: TagRepository,
    GR: GroupRepository,
    P: ChangePublisher,
{
    pub fn new(rules: RR, rule_sets: SR, tags: TR, groups: GR, publisher: P) -> Self {
        Self {
            rules,
            rule_sets,
            tags,
            groups,
            publisher,
        }
    }

    /// Replace the workspace with what the backend holds.
    ///
    /// Every collection is fetched before anything is replaced, so a
    /// failure part-way leaves the workspace as it was.
    ///
    /// # Errors
    ///
    /// Returns the first repository error.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, workspace: &mut Workspace) -> Result<(), ApiaryError> {
        let loaded = async {
            let rules = self.rules.get_all().await?;
            let rule_sets = self.rule_sets.get_all().await?;
            let tags = self.tags.get_all().await?;
            let groups = self.groups.get_all().await?;
            Ok::<_, ApiaryError>((rules, rule_sets, tags, groups))
        }
        .await
        .inspect_err(|err| warn!(error = %err, "failed to load workspace"))?;

        let (rules, rule_sets, tags, groups) = loaded;
        info!(
            rules = rules.len(),
            rule_sets = rule_sets.len(),
            tags = tags.len(),
            groups = groups.len(),
            "workspace loaded"
        );
        workspace.replace_all(rules, rule_sets, tags, groups);
        self.publisher.publish(Change::Reloaded).await
    }
}
