use std::future::Future;
use std::sync::{Arc, Mutex};

use apiary_app::change_feed::InProcessChangeFeed;
use apiary_app::config::Settings;
use apiary_app::ports::{GroupRepository, RuleRepository, RuleSetRepository, TagRepository};
use apiary_app::services::{CatalogService, GroupService, RuleService, RuleSetService};
use apiary_domain::change::Change;
use apiary_domain::condition::{Initiator, ScheduleType};
use apiary_domain::error::{ApiaryError, ConflictError};
use apiary_domain::group::Group;
use apiary_domain::id::{GroupId, RuleId, RuleSetId};
use apiary_domain::precedence::PRECEDENCE_POLICY;
use apiary_domain::rule::{Action, DraftUpdate, Priority, Rule, RuleSetRef, RuleWizard};
use apiary_domain::rule_set::RuleSet;
use apiary_domain::tag::Tag;
use apiary_domain::workspace::Workspace;

#[derive(Default)]
struct Backend {
    rules: Mutex<Vec<Rule>>,
    rule_sets: Mutex<Vec<RuleSet>>,
    tags: Mutex<Vec<Tag>>,
    groups: Mutex<Vec<Group>>,
}

/// Shared handle so every service talks to the same backend.
#[derive(Clone, Default)]
struct Api(Arc<Backend>);

fn upsert<T: Clone>(store: &Mutex<Vec<T>>, item: &T, same: impl Fn(&T) -> bool) {
    let mut store = store.lock().unwrap();
    match store.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item.clone(),
        None => store.push(item.clone()),
    }
}

impl RuleRepository for Api {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, ApiaryError>> + Send {
        let result = self.0.rules.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
        upsert(&self.0.rules, &rule, |existing| existing.id == rule.id);
        async { Ok(rule) }
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send {
        upsert(&self.0.rules, &rule, |existing| existing.id == rule.id);
        async { Ok(rule) }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), ApiaryError>> + Send {
        self.0.rules.lock().unwrap().retain(|rule| rule.id != id);
        async { Ok(()) }
    }
}

impl RuleSetRepository for Api {
    fn get_all(&self) -> impl Future<Output = Result<Vec<RuleSet>, ApiaryError>> + Send {
        let result = self.0.rule_sets.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn create(&self, rule_set: RuleSet) -> impl Future<Output = Result<RuleSet, ApiaryError>> + Send {
        upsert(&self.0.rule_sets, &rule_set, |existing| existing.id == rule_set.id);
        async { Ok(rule_set) }
    }

    fn update(&self, rule_set: RuleSet) -> impl Future<Output = Result<RuleSet, ApiaryError>> + Send {
        upsert(&self.0.rule_sets, &rule_set, |existing| existing.id == rule_set.id);
        async { Ok(rule_set) }
    }

    fn delete(&self, id: RuleSetId) -> impl Future<Output = Result<(), ApiaryError>> + Send {
        self.0.rule_sets.lock().unwrap().retain(|rule_set| rule_set.id != id);
        async { Ok(()) }
    }
}

impl TagRepository for Api {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Tag>, ApiaryError>> + Send {
        let result = self.0.tags.lock().unwrap().clone();
        async { Ok(result) }
    }
}

impl GroupRepository for Api {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Group>, ApiaryError>> + Send {
        let result = self.0.groups.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn update(&self, group: Group) -> impl Future<Output = Result<Group, ApiaryError>> + Send {
        upsert(&self.0.groups, &group, |existing| existing.id == group.id);
        async { Ok(group) }
    }
}

fn seeded() -> Api {
    let api = Api::default();
    api.0.rule_sets.lock().unwrap().push(
        RuleSet::builder()
            .id("S")
            .name("Winter care")
            .build()
            .unwrap(),
    );
    api.0.tags.lock().unwrap().push(
        Tag::builder()
            .id("t1")
            .name("Wintering")
            .rule_override("evening:20:30")
            .build()
            .unwrap(),
    );
    api.0.groups.lock().unwrap().push(
        Group::builder()
            .id("G")
            .name("Hive 7")
            .tag("t1")
            .automatic_mode(true)
            .build()
            .unwrap(),
    );
    api
}

fn wizard_rule() -> Rule {
    let mut wizard = RuleWizard::default();
    wizard
        .update(DraftUpdate::Name("Evening check".to_string()))
        .unwrap();
    wizard
        .update(DraftUpdate::RuleSet(RuleSetRef::Set("S".into())))
        .unwrap();
    wizard.next().unwrap();
    wizard
        .update(DraftUpdate::AddInitiator(Initiator::schedule(
            ScheduleType::Weekly,
            "1,19:00",
        )))
        .unwrap();
    wizard.next().unwrap();
    wizard.update(DraftUpdate::Action(Action::Notify)).unwrap();
    wizard
        .update(DraftUpdate::ActionParam {
            key: "message".to_string(),
            value: serde_json::Value::from("Close the entrance"),
        })
        .unwrap();
    wizard.next().unwrap();
    wizard
        .update(DraftUpdate::Priority(Priority::new(7).unwrap()))
        .unwrap();
    let mut rule = wizard.submit().unwrap();
    rule.id = RuleId::from("evening");
    rule
}

#[tokio::test]
async fn should_keep_rules_sets_and_groups_consistent_through_a_session() {
    let settings = Settings::from_toml("[display]\ntimezone = '+03:00'").unwrap();
    let presentation = settings.presentation().unwrap();
    let feed = Arc::new(InProcessChangeFeed::default());
    let mut changes = feed.subscribe();
    let api = seeded();

    let catalog = CatalogService::new(api.clone(), api.clone(), api.clone(), api.clone(), feed.clone());
    let rules = RuleService::new(api.clone(), feed.clone(), presentation);
    let rule_sets = RuleSetService::new(api.clone(), feed.clone());
    let groups = GroupService::new(api.clone(), feed.clone());

    let mut workspace = Workspace::default();
    catalog.refresh(&mut workspace).await.unwrap();
    assert_eq!(changes.recv().await.unwrap(), Change::Reloaded);

    // stored in UTC, shown in display time
    let stored = rules.create_rule(&mut workspace, wizard_rule()).await.unwrap();
    assert_eq!(stored.initiators[0].schedule_value.as_deref(), Some("1,16:00"));
    assert_eq!(
        rules.describe(&stored, workspace.tags()),
        "Weekly on Monday at 19:00"
    );

    let group = GroupId::from("G");
    let rule = RuleId::from("evening");
    let set = RuleSetId::from("S");
    groups.apply_rule_set(&mut workspace, &group, &set).await.unwrap();

    let declined = groups.assign_rule(&mut workspace, &group, &rule).await;
    assert!(matches!(
        declined,
        Err(ApiaryError::Conflict(ConflictError::RuleAlreadyApplied { .. }))
    ));
    assert!(workspace.group(&group).unwrap().rules.is_empty());

    let config = workspace.effective_configuration(&group).unwrap();
    assert_eq!(config.rules.len(), 1);
    assert!(config.automatic_monitoring_governs());
    assert_eq!(config.rules[0].override_value.as_deref(), Some("20:30"));
    assert!(config.summary().ends_with(PRECEDENCE_POLICY));

    rule_sets.delete_rule_set(&mut workspace, set.clone()).await.unwrap();
    assert_eq!(workspace.rule(&rule).unwrap().rule_set, RuleSetRef::None);
    assert!(workspace.rules_in_set(&set).is_empty());
    assert!(workspace.applied_rules(&group).unwrap().is_empty());

    // the backend no longer lists the deleted set
    catalog.refresh(&mut workspace).await.unwrap();
    assert!(workspace.rule_set(&set).is_err());
}
