//! Rule service: use-cases for creating, editing and deleting rules.
//!
//! Rules are edited in the display timezone and stored in UTC: schedule
//! values are encoded right before they reach the repository and decoded
//! when a rule is opened or described.

use tracing::{debug, warn};

use apiary_domain::change::Change;
use apiary_domain::condition::ConditionFormatter;
use apiary_domain::error::ApiaryError;
use apiary_domain::id::RuleId;
use apiary_domain::rule::{Rule, RuleWizard};
use apiary_domain::tag::Tag;
use apiary_domain::workspace::Workspace;

use crate::config::Presentation;
use crate::ports::{ChangePublisher, RuleRepository};

/// Application service for rule CRUD operations.
pub struct RuleService<R, P> {
    repo: R,
    publisher: P,
    presentation: Presentation,
}

impl<R: RuleRepository, P: ChangePublisher> RuleService<R, P> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R, publisher: P, presentation: Presentation) -> Self {
        Self {
            repo,
            publisher,
            presentation,
        }
    }

    fn to_wire(&self, rule: &Rule) -> Rule {
        let mut wire = rule.clone();
        wire.initiators = rule
            .initiators
            .iter()
            .map(|initiator| self.presentation.zone.to_utc(initiator))
            .collect();
        wire
    }

    fn to_display(&self, rule: &Rule) -> Rule {
        let mut display = rule.clone();
        display.initiators = rule
            .initiators
            .iter()
            .map(|initiator| self.presentation.zone.to_local(initiator))
            .collect();
        display
    }

    fn check(workspace: &Workspace, rule: &Rule) -> Result<(), ApiaryError> {
        rule.validate()?;
        if let Some(rule_set) = rule.rule_set.id() {
            workspace.rule_set(rule_set)?;
        }
        Ok(())
    }

    /// Create a rule edited in display time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::Validation`] if invariants fail,
    /// [`ApiaryError::NotFound`] for an unknown rule set, or the
    /// repository's error. The workspace is untouched on error.
    #[tracing::instrument(skip(self, workspace, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(
        &self,
        workspace: &mut Workspace,
        rule: Rule,
    ) -> Result<Rule, ApiaryError> {
        Self::check(workspace, &rule)?;
        let stored = self.repo.create(self.to_wire(&rule)).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule creation");
        })?;
        let id = stored.id.clone();
        workspace.upsert_rule(stored.clone());
        debug!(rule_id = %id, "rule created");
        self.publisher.publish(Change::RuleCreated { id }).await?;
        Ok(stored)
    }

    /// Replace an existing rule edited in display time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown rule or rule set,
    /// [`ApiaryError::Validation`] if invariants fail, or the repository's
    /// error. The workspace is untouched on error.
    #[tracing::instrument(skip(self, workspace, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(
        &self,
        workspace: &mut Workspace,
        rule: Rule,
    ) -> Result<Rule, ApiaryError> {
        workspace.rule(&rule.id)?;
        Self::check(workspace, &rule)?;
        let stored = self.repo.update(self.to_wire(&rule)).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule update");
        })?;
        let id = stored.id.clone();
        workspace.upsert_rule(stored.clone());
        debug!("rule updated");
        self.publisher.publish(Change::RuleUpdated { id }).await?;
        Ok(stored)
    }

    /// Create or update, depending on whether the rule is already known.
    ///
    /// # Errors
    ///
    /// See [`create_rule`](Self::create_rule) and
    /// [`update_rule`](Self::update_rule).
    pub async fn save_rule(
        &self,
        workspace: &mut Workspace,
        rule: Rule,
    ) -> Result<Rule, ApiaryError> {
        if workspace.rule(&rule.id).is_ok() {
            self.update_rule(workspace, rule).await
        } else {
            self.create_rule(workspace, rule).await
        }
    }

    /// Delete a rule. Groups lose their direct assignment of it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown rule, or the
    /// repository's error.
    #[tracing::instrument(skip(self, workspace))]
    pub async fn delete_rule(&self, workspace: &mut Workspace, id: RuleId) -> Result<(), ApiaryError> {
        workspace.rule(&id)?;
        self.repo.delete(id.clone()).await.inspect_err(|err| {
            warn!(error = %err, "backend refused rule deletion");
        })?;
        let groups = workspace.remove_rule(&id)?;
        debug!(groups = groups.len(), "rule deleted");
        self.publisher
            .publish(Change::RuleDeleted { id, groups })
            .await
    }

    /// Open a stored rule in the wizard, with schedules in display time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiaryError::NotFound`] for an unknown rule.
    pub fn edit_rule(&self, workspace: &Workspace, id: &RuleId) -> Result<RuleWizard, ApiaryError> {
        let rule = workspace.rule(id)?;
        Ok(RuleWizard::edit(&self.to_display(rule)))
    }

    /// Human-readable conditions of a stored rule.
    #[must_use]
    pub fn describe(&self, rule: &Rule, tags: &[Tag]) -> String {
        ConditionFormatter::new(tags)
            .with_units(self.presentation.units.clone())
            .all_conditions(&self.to_display(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_domain::condition::{Initiator, MeasurementKind, Operator, ScheduleType};
    use apiary_domain::error::ValidationError;
    use apiary_domain::rule::{Action, DraftUpdate, LogicalOperator};
    use apiary_domain::rule_set::RuleSet;
    use chrono::FixedOffset;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use crate::change_feed::InProcessChangeFeed;
    use crate::config::DisplayZone;

    #[derive(Default)]
    struct InMemoryRuleRepo {
        store: Mutex<HashMap<RuleId, Rule>>,
    }

    impl RuleRepository for InMemoryRuleRepo {
        fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, ApiaryError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Rule> = store.values().cloned().collect();
            async { Ok(result) }
        }

        fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(rule.id.clone(), rule.clone());
            async { Ok(rule) }
        }

        fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(rule.id.clone(), rule.clone());
            async { Ok(rule) }
        }

        fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), ApiaryError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.remove(&id);
            async { Ok(()) }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("backend unavailable")]
    struct Offline;

    struct OfflineRuleRepo;

    impl RuleRepository for OfflineRuleRepo {
        fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, ApiaryError>> + Send {
            async { Err(ApiaryError::transport(Offline)) }
        }

        fn create(&self, _rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
            async { Err(ApiaryError::transport(Offline)) }
        }

        fn update(&self, _rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
            async { Err(ApiaryError::transport(Offline)) }
        }

        fn delete(&self, _id: RuleId) -> impl Future<Output = Result<(), ApiaryError>> + Send {
            async { Err(ApiaryError::transport(Offline)) }
        }
    }

    fn presentation() -> Presentation {
        Presentation {
            zone: DisplayZone::Fixed(FixedOffset::east_opt(3 * 3600).unwrap()),
            ..Presentation::default()
        }
    }

    fn make_service() -> RuleService<InMemoryRuleRepo, InProcessChangeFeed> {
        RuleService::new(
            InMemoryRuleRepo::default(),
            InProcessChangeFeed::default(),
            presentation(),
        )
    }

    fn evening_rule() -> Rule {
        Rule::builder()
            .id("R")
            .name("Evening check")
            .initiator(Initiator::schedule(ScheduleType::Daily, "19:00"))
            .initiator(Initiator::measurement(MeasurementKind::Temp, Operator::Lt, 10.0))
            .logical_operator(LogicalOperator::And)
            .action(Action::Notify, serde_json::json!({"message": "Close the entrance"}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_store_schedules_in_utc() {
        let svc = make_service();
        let mut workspace = Workspace::default();

        let stored = svc.create_rule(&mut workspace, evening_rule()).await.unwrap();
        assert_eq!(stored.initiators[0].schedule_value.as_deref(), Some("16:00"));
        assert_eq!(
            svc.repo.store.lock().unwrap()[&RuleId::from("R")].initiators[0]
                .schedule_value
                .as_deref(),
            Some("16:00")
        );
        assert_eq!(workspace.rules().len(), 1);
    }

    #[tokio::test]
    async fn should_open_stored_rule_in_display_time() {
        let svc = make_service();
        let mut workspace = Workspace::default();
        svc.create_rule(&mut workspace, evening_rule()).await.unwrap();

        let wizard = svc.edit_rule(&workspace, &RuleId::from("R")).unwrap();
        assert_eq!(
            wizard.draft().initiators[0].schedule_value.as_deref(),
            Some("19:00")
        );
        assert_eq!(
            svc.describe(&workspace.rules()[0], &[]),
            "Daily at 19:00 AND Temperature < 10 °C"
        );
    }

    #[tokio::test]
    async fn should_publish_change_after_creation() {
        let svc = make_service();
        let mut rx = svc.publisher.subscribe();
        let mut workspace = Workspace::default();

        svc.create_rule(&mut workspace, evening_rule()).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            Change::RuleCreated {
                id: RuleId::from("R")
            }
        );
    }

    #[tokio::test]
    async fn should_reject_invalid_rule_before_reaching_backend() {
        let svc = make_service();
        let mut workspace = Workspace::default();
        let mut rule = evening_rule();
        rule.initiators.clear();

        let result = svc.create_rule(&mut workspace, rule).await;
        assert!(matches!(
            result,
            Err(ApiaryError::Validation(ValidationError::NoInitiators))
        ));
        assert!(svc.repo.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_unparseable_schedule_before_reaching_backend() {
        let svc = make_service();
        let mut workspace = Workspace::default();
        let mut rule = evening_rule();
        rule.initiators[0].schedule_value = Some("25:00".to_string());

        let result = svc.create_rule(&mut workspace, rule).await;
        assert!(matches!(
            result,
            Err(ApiaryError::Validation(ValidationError::InvalidSchedule(_)))
        ));
        assert!(svc.repo.store.lock().unwrap().is_empty());
        assert!(workspace.rules().is_empty());
    }

    #[tokio::test]
    async fn should_reject_rule_pointing_at_unknown_rule_set() {
        let svc = make_service();
        let mut workspace = Workspace::default();
        let mut rule = evening_rule();
        rule.rule_set = apiary_domain::rule::RuleSetRef::Set("ghost".into());

        let result = svc.create_rule(&mut workspace, rule).await;
        assert!(matches!(result, Err(ApiaryError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_leave_workspace_untouched_when_backend_fails() {
        let svc = RuleService::new(OfflineRuleRepo, InProcessChangeFeed::default(), presentation());
        let mut workspace = Workspace::new(
            vec![evening_rule()],
            vec![RuleSet::builder().id("S").name("Spring").build().unwrap()],
            Vec::new(),
            Vec::new(),
        );
        let before = workspace.clone();

        let mut moved = evening_rule();
        moved.rule_set = apiary_domain::rule::RuleSetRef::Set("S".into());
        assert!(matches!(
            svc.update_rule(&mut workspace, moved).await,
            Err(ApiaryError::Transport(_))
        ));
        assert!(svc.delete_rule(&mut workspace, RuleId::from("R")).await.is_err());
        assert_eq!(workspace, before);
    }

    #[tokio::test]
    async fn should_update_when_saving_known_rule() {
        let svc = make_service();
        let mut workspace = Workspace::default();
        svc.save_rule(&mut workspace, evening_rule()).await.unwrap();

        let mut wizard = svc.edit_rule(&workspace, &RuleId::from("R")).unwrap();
        wizard
            .update(DraftUpdate::Name("Late check".to_string()))
            .unwrap();
        let edited = wizard.draft().to_rule().unwrap();
        svc.save_rule(&mut workspace, edited).await.unwrap();

        assert_eq!(workspace.rules().len(), 1);
        assert_eq!(workspace.rules()[0].name, "Late check");
        assert_eq!(
            workspace.rules()[0].initiators[0].schedule_value.as_deref(),
            Some("16:00")
        );
    }

    #[tokio::test]
    async fn should_delete_rule_and_strip_direct_assignments() {
        let svc = make_service();
        let mut workspace = Workspace::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![
                apiary_domain::group::Group::builder()
                    .id("G")
                    .name("Hive")
                    .rule("R")
                    .build()
                    .unwrap(),
            ],
        );
        svc.create_rule(&mut workspace, evening_rule()).await.unwrap();
        let mut rx = svc.publisher.subscribe();

        svc.delete_rule(&mut workspace, RuleId::from("R")).await.unwrap();
        assert!(workspace.rules().is_empty());
        assert!(workspace.groups()[0].rules.is_empty());
        assert_eq!(
            rx.recv().await.unwrap(),
            Change::RuleDeleted {
                id: RuleId::from("R"),
                groups: vec!["G".into()],
            }
        );
    }
}
