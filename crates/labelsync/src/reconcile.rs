//! Label reconciliation.
//!
//! Diffs the desired label set against the current one and applies the
//! result in two concurrent phases: deletes first, then creates and
//! updates. The phase barrier keeps a delete and a create under the same
//! name from racing each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::filter::{exclude_labels, RegexMatcher};
use crate::manifest::Label;
use crate::remote::traits::LabelStore;

/// A single remote mutation derived from the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Label exists only in the manifest.
    Create(Label),
    /// Label exists on both sides but description or color differ; carries
    /// the desired attributes.
    Update(Label),
    /// Label exists only on the remote and pruning is enabled.
    Delete(String),
}

/// Options for a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Delete remote labels that are absent from the manifest.
    pub prune: bool,
    /// Regex excluding current labels from sync consideration.
    pub exclude_pattern: Option<String>,
    /// Report intended actions without mutating remote state.
    pub dry_run: bool,
}

/// The scheduled work for one run. Deletes execute as their own phase
/// before any create or update starts.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Names to delete from the remote.
    pub deletes: Vec<String>,
    /// Creates and updates, in manifest order.
    pub upserts: Vec<Action>,
}

impl Plan {
    /// Diff `desired` against `current`.
    ///
    /// Lookups are keyed by name; a later duplicate within either input
    /// overrides earlier ones. Unchanged labels are reported and dropped
    /// from the plan. Deletes are only scheduled when `prune` is set.
    #[must_use]
    pub fn build(desired: &[Label], current: &[Label], prune: bool) -> Self {
        let desired_by_name: HashMap<&str, &Label> =
            desired.iter().map(|l| (l.name.as_str(), l)).collect();
        let current_by_name: HashMap<&str, &Label> =
            current.iter().map(|l| (l.name.as_str(), l)).collect();

        let mut plan = Self::default();

        if prune {
            for label in current {
                if !desired_by_name.contains_key(label.name.as_str()) {
                    plan.deletes.push(label.name.clone());
                }
            }
        }

        for label in desired {
            match current_by_name.get(label.name.as_str()) {
                None => plan.upserts.push(Action::Create(label.clone())),
                Some(current) => {
                    if current.description != label.description || current.color != label.color {
                        plan.upserts.push(Action::Update(label.clone()));
                    } else {
                        info!(label = %label.name, "label unchanged");
                    }
                }
            }
        }

        plan
    }

    /// Whether the plan schedules no work at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.upserts.is_empty()
    }
}

/// Reconciles a repository's labels against a desired set.
///
/// Holds the label store behind an [`Arc`] so each concurrent action can
/// share it. A `Syncer` carries no per-run state; `sync` may be called for
/// any number of repositories.
pub struct Syncer<S> {
    store: Arc<S>,
}

impl<S: LabelStore + 'static> Syncer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Converge `owner/repo` onto `desired`.
    ///
    /// Compiles the exclusion pattern, lists the current labels, filters
    /// them, diffs, and executes the plan. A delete-phase failure aborts
    /// before the create/update phase starts; within a phase the first
    /// observed error wins while the remaining actions run to completion.
    ///
    /// # Errors
    /// Returns the first error encountered; see [`SyncError`].
    pub async fn sync(
        &self,
        owner: &str,
        repo: &str,
        desired: &[Label],
        opts: &SyncOptions,
    ) -> Result<(), SyncError> {
        let matcher = match opts.exclude_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(RegexMatcher::new(pattern)?),
            _ => None,
        };

        let mut current = self.store.list_labels(owner, repo).await?;
        if let Some(matcher) = &matcher {
            info!(owner = %owner, repo = %repo, "applying exclusion pattern");
            current = exclude_labels(current, matcher);
        }

        let plan = Plan::build(desired, &current, opts.prune);
        if plan.is_empty() {
            info!(owner = %owner, repo = %repo, "labels already in sync");
            return Ok(());
        }

        let deletes: Vec<Action> = plan.deletes.into_iter().map(Action::Delete).collect();
        self.run_batch(owner, repo, deletes, opts.dry_run).await?;
        self.run_batch(owner, repo, plan.upserts, opts.dry_run).await
    }

    /// Run one batch of actions, each on its own task.
    ///
    /// In dry-run mode every action is reported and nothing is spawned.
    /// Otherwise the join loop keeps the first error it observes; later
    /// failures are logged and swallowed, and no task is cancelled.
    async fn run_batch(
        &self,
        owner: &str,
        repo: &str,
        actions: Vec<Action>,
        dry_run: bool,
    ) -> Result<(), SyncError> {
        if dry_run {
            for action in &actions {
                match action {
                    Action::Create(label) => {
                        info!(owner = %owner, repo = %repo, label = %label.name, "would create label");
                    }
                    Action::Update(label) => {
                        info!(owner = %owner, repo = %repo, label = %label.name, "would update label");
                    }
                    Action::Delete(name) => {
                        info!(owner = %owner, repo = %repo, label = %name, "would delete label");
                    }
                }
            }
            return Ok(());
        }

        let mut set = JoinSet::new();
        for action in actions {
            let store = Arc::clone(&self.store);
            let owner = owner.to_owned();
            let repo = repo.to_owned();
            set.spawn(async move { apply_action(store.as_ref(), &owner, &repo, action).await });
        }

        let mut first_error = None;
        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(SyncError::from).and_then(|result| result);
            if let Err(e) = outcome {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    warn!(error = %e, "additional sync failure");
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Apply one action against the store.
async fn apply_action<S: LabelStore>(
    store: &S,
    owner: &str,
    repo: &str,
    action: Action,
) -> Result<(), SyncError> {
    match action {
        Action::Create(label) => {
            store.create_label(owner, repo, &label).await?;
            info!(owner = %owner, repo = %repo, label = %label.name, "created label");
        }
        Action::Update(label) => {
            store.update_label(owner, repo, &label.name, &label).await?;
            info!(owner = %owner, repo = %repo, label = %label.name, "updated label");
        }
        Action::Delete(name) => {
            store.delete_label(owner, repo, &name).await?;
            info!(owner = %owner, repo = %repo, label = %name, "deleted label");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    fn label(name: &str, description: &str, color: &str) -> Label {
        Label {
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Create(String),
        Update(String),
        Delete(String),
    }

    /// Records every mutation; deletes of listed names fail.
    #[derive(Default)]
    struct RecordingStore {
        current: Vec<Label>,
        fail_deletes: Vec<String>,
        ops: Arc<Mutex<Vec<Op>>>,
    }

    #[async_trait]
    impl LabelStore for RecordingStore {
        async fn list_labels(&self, _: &str, _: &str) -> Result<Vec<Label>, SyncError> {
            Ok(self.current.clone())
        }

        async fn create_label(&self, _: &str, _: &str, label: &Label) -> Result<(), SyncError> {
            self.ops.lock().unwrap().push(Op::Create(label.name.clone()));
            Ok(())
        }

        async fn update_label(
            &self,
            _: &str,
            _: &str,
            name: &str,
            _: &Label,
        ) -> Result<(), SyncError> {
            self.ops.lock().unwrap().push(Op::Update(name.to_string()));
            Ok(())
        }

        async fn delete_label(&self, _: &str, _: &str, name: &str) -> Result<(), SyncError> {
            self.ops.lock().unwrap().push(Op::Delete(name.to_string()));
            if self.fail_deletes.iter().any(|n| n == name) {
                return Err(SyncError::Api {
                    status: 500,
                    message: "delete failed".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn disjoint_sets_without_prune_plan_only_creates() {
        let desired = vec![label("bug", "", "d73a4a"), label("chore", "", "cccccc")];
        let current = vec![label("wontfix", "", "ffffff")];

        let plan = Plan::build(&desired, &current, false);
        assert!(plan.deletes.is_empty());
        assert_eq!(
            plan.upserts,
            vec![
                Action::Create(desired[0].clone()),
                Action::Create(desired[1].clone()),
            ]
        );
    }

    #[test]
    fn attribute_drift_plans_single_update_with_desired_attributes() {
        let desired = vec![label("bug", "Bug report", "d73a4a")];
        let current = vec![label("bug", "Bug report", "ffffff")];

        let plan = Plan::build(&desired, &current, false);
        assert!(plan.deletes.is_empty());
        assert_eq!(plan.upserts, vec![Action::Update(desired[0].clone())]);
    }

    #[test]
    fn identical_sets_plan_nothing() {
        let labels = vec![label("bug", "Bug report", "d73a4a")];
        let plan = Plan::build(&labels, &labels, true);
        assert!(plan.is_empty());
    }

    #[test]
    fn empty_desired_with_prune_deletes_everything() {
        let current = vec![label("a", "", ""), label("b", "", "")];
        let plan = Plan::build(&[], &current, true);
        assert_eq!(plan.deletes, vec!["a".to_string(), "b".to_string()]);
        assert!(plan.upserts.is_empty());
    }

    #[test]
    fn absent_from_manifest_is_kept_without_prune() {
        let current = vec![label("wontfix", "", "ffffff")];
        let plan = Plan::build(&[], &current, false);
        assert!(plan.is_empty());
    }

    #[test]
    fn names_are_case_sensitive() {
        let desired = vec![label("Bug", "", "d73a4a")];
        let current = vec![label("bug", "", "d73a4a")];

        let plan = Plan::build(&desired, &current, true);
        assert_eq!(plan.deletes, vec!["bug".to_string()]);
        assert_eq!(plan.upserts, vec![Action::Create(desired[0].clone())]);
    }

    #[test]
    fn later_manifest_duplicate_wins_in_lookup() {
        // Both duplicate entries are diffed against the same current label;
        // only the drifting one schedules an update.
        let desired = vec![label("bug", "old", "ffffff"), label("bug", "new", "ffffff")];
        let current = vec![label("bug", "old", "ffffff")];

        let plan = Plan::build(&desired, &current, true);
        assert!(plan.deletes.is_empty());
        assert_eq!(plan.upserts, vec![Action::Update(desired[1].clone())]);
    }

    #[tokio::test]
    async fn deletes_complete_before_upserts_start() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("stale", "", ""), label("bug", "", "ffffff")],
            ops: Arc::clone(&ops),
            ..Default::default()
        };
        let desired = vec![label("bug", "", "d73a4a"), label("chore", "", "cccccc")];

        let opts = SyncOptions {
            prune: true,
            ..Default::default()
        };
        Syncer::new(store)
            .sync("acme", "widgets", &desired, &opts)
            .await
            .unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(ops[0], Op::Delete("stale".to_string()));
        assert!(ops[1..].contains(&Op::Update("bug".to_string())));
        assert!(ops[1..].contains(&Op::Create("chore".to_string())));
        assert_eq!(ops.len(), 3);
    }

    #[tokio::test]
    async fn delete_phase_failure_suppresses_upsert_phase() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("stale", "", ""), label("doomed", "", "")],
            fail_deletes: vec!["doomed".to_string()],
            ops: Arc::clone(&ops),
        };
        let desired = vec![label("chore", "", "cccccc")];

        let opts = SyncOptions {
            prune: true,
            ..Default::default()
        };
        let err = Syncer::new(store)
            .sync("acme", "widgets", &desired, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Api { status: 500, .. }));

        // Sibling deletes still ran; the create phase never started.
        let ops = ops.lock().unwrap();
        assert!(ops.contains(&Op::Delete("stale".to_string())));
        assert!(ops.contains(&Op::Delete("doomed".to_string())));
        assert!(!ops.iter().any(|op| matches!(op, Op::Create(_))));
    }

    #[tokio::test]
    async fn first_observed_error_is_returned_when_several_fail() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("a", "", ""), label("b", "", "")],
            fail_deletes: vec!["a".to_string(), "b".to_string()],
            ops: Arc::clone(&ops),
        };

        let opts = SyncOptions {
            prune: true,
            ..Default::default()
        };
        let err = Syncer::new(store)
            .sync("acme", "widgets", &[], &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Api { status: 500, .. }));
        assert_eq!(ops.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn dry_run_issues_no_mutations() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("stale", "", ""), label("bug", "", "ffffff")],
            ops: Arc::clone(&ops),
            ..Default::default()
        };
        let desired = vec![label("bug", "", "d73a4a"), label("chore", "", "cccccc")];

        let opts = SyncOptions {
            prune: true,
            dry_run: true,
            ..Default::default()
        };
        Syncer::new(store)
            .sync("acme", "widgets", &desired, &opts)
            .await
            .unwrap();

        assert!(ops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn excluded_labels_survive_prune() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("release-1", "", ""), label("stale", "", "")],
            ops: Arc::clone(&ops),
            ..Default::default()
        };

        let opts = SyncOptions {
            prune: true,
            exclude_pattern: Some("^release-".to_string()),
            ..Default::default()
        };
        Syncer::new(store)
            .sync("acme", "widgets", &[], &opts)
            .await
            .unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(*ops, vec![Op::Delete("stale".to_string())]);
    }

    #[tokio::test]
    async fn excluded_current_label_does_not_block_create() {
        // Exclusion hides "x" from the current set, so the manifest entry
        // of the same name is still scheduled as a create.
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("x", "", "cccccc")],
            ops: Arc::clone(&ops),
            ..Default::default()
        };
        let desired = vec![label("x", "", "cccccc")];

        let opts = SyncOptions {
            exclude_pattern: Some("^x$".to_string()),
            ..Default::default()
        };
        Syncer::new(store)
            .sync("acme", "widgets", &desired, &opts)
            .await
            .unwrap();

        assert_eq!(*ops.lock().unwrap(), vec![Op::Create("x".to_string())]);
    }

    #[tokio::test]
    async fn invalid_pattern_aborts_before_any_remote_call() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: vec![label("bug", "", "")],
            ops: Arc::clone(&ops),
            ..Default::default()
        };

        let opts = SyncOptions {
            prune: true,
            exclude_pattern: Some("(unbalanced".to_string()),
            ..Default::default()
        };
        let err = Syncer::new(store)
            .sync("acme", "widgets", &[], &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Pattern(_)));
        assert!(ops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_run_with_same_manifest_is_a_noop() {
        let desired = vec![label("bug", "Bug report", "d73a4a")];

        let ops = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            current: desired.clone(),
            ops: Arc::clone(&ops),
            ..Default::default()
        };

        let opts = SyncOptions {
            prune: true,
            ..Default::default()
        };
        Syncer::new(store)
            .sync("acme", "widgets", &desired, &opts)
            .await
            .unwrap();

        assert!(ops.lock().unwrap().is_empty());
    }
}
