//! Checklist reconciliation.
//!
//! A checklist form submits the full set of item keys the user wants. These
//! functions diff that set against what storage already holds and produce the
//! smallest list of operations that brings storage in line. Planning is pure;
//! [`crate::Storage::apply`] executes a plan inside one transaction.
//!
//! Two passes share the same diff:
//!
//! - [`reconcile`] maintains kit membership (selection records). Removing an
//!   item also clears its acquired flag for that kit, so a flag is never left
//!   set for an item that is no longer in the kit.
//! - [`reconcile_progress`] maintains the acquired/done flags of items that
//!   are in the kit. A progress row may already exist for an item because it
//!   was tracked from the other supply kit; that row is updated rather than
//!   duplicated.
//!
//! Keys present on both sides produce no operation, so re-submitting the
//! same set is a no-op.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::kit::KitType;

/// A single persistence step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "key", rename_all = "snake_case")]
pub enum Operation {
    /// Add a selection record for the key.
    InsertSelection(String),
    /// Remove the selection record for the key.
    DeleteSelection(String),
    /// Set the kit's acquired flag to `No` on an existing progress row.
    ClearAcquired(String),
    /// Set the kit's acquired flag to `Yes` on an existing progress row.
    SetAcquired(String),
    /// Create a progress row with the kit's acquired flag set to `Yes`.
    InsertProgress(String),
}

impl Operation {
    /// The item key the operation applies to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::InsertSelection(key)
            | Self::DeleteSelection(key)
            | Self::ClearAcquired(key)
            | Self::SetAcquired(key)
            | Self::InsertProgress(key) => key,
        }
    }
}

/// The operations needed to reconcile one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Owning user.
    pub user_id: i64,
    /// Kit being reconciled.
    pub kit: KitType,
    /// Operations, removals first, each group in key order.
    pub operations: Vec<Operation>,
}

impl Plan {
    fn new(user_id: i64, kit: KitType) -> Self {
        Self {
            user_id,
            kit,
            operations: Vec::new(),
        }
    }

    /// Whether the plan does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of row inserts.
    #[must_use]
    pub fn inserts(&self) -> usize {
        self.count(|op| {
            matches!(
                op,
                Operation::InsertSelection(_) | Operation::InsertProgress(_)
            )
        })
    }

    /// Number of row deletes.
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.count(|op| matches!(op, Operation::DeleteSelection(_)))
    }

    /// Number of flag updates.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.count(|op| {
            matches!(
                op,
                Operation::ClearAcquired(_) | Operation::SetAcquired(_)
            )
        })
    }

    fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.operations.iter().filter(|op| pred(op)).count()
    }
}

/// Plan the membership changes for a kit.
///
/// `previously_selected` must be read from storage right before the call.
#[must_use]
pub fn reconcile(
    user_id: i64,
    kit: KitType,
    previously_selected: &BTreeSet<String>,
    newly_submitted: &BTreeSet<String>,
) -> Plan {
    let mut plan = Plan::new(user_id, kit);

    for key in previously_selected.difference(newly_submitted) {
        plan.operations.push(Operation::ClearAcquired(key.clone()));
        plan.operations.push(Operation::DeleteSelection(key.clone()));
    }
    for key in newly_submitted.difference(previously_selected) {
        plan.operations.push(Operation::InsertSelection(key.clone()));
    }

    plan
}

/// Plan the acquired-flag changes for a kit.
///
/// `tracked` holds every key that already has a progress row for the user,
/// whatever its flags.
#[must_use]
pub fn reconcile_progress(
    user_id: i64,
    kit: KitType,
    previously_acquired: &BTreeSet<String>,
    newly_checked: &BTreeSet<String>,
    tracked: &BTreeSet<String>,
) -> Plan {
    let mut plan = Plan::new(user_id, kit);

    for key in previously_acquired.difference(newly_checked) {
        plan.operations.push(Operation::ClearAcquired(key.clone()));
    }
    for key in newly_checked.difference(previously_acquired) {
        if tracked.contains(key) {
            plan.operations.push(Operation::SetAcquired(key.clone()));
        } else {
            plan.operations.push(Operation::InsertProgress(key.clone()));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    /// In-memory stand-in for one user's rows of one kit.
    #[derive(Debug, Default, Clone)]
    struct Model {
        selected: BTreeSet<String>,
        /// Progress rows: key -> acquired flag for this kit.
        progress: BTreeMap<String, bool>,
    }

    impl Model {
        fn apply(&mut self, plan: &Plan) {
            for op in &plan.operations {
                match op {
                    Operation::InsertSelection(k) => {
                        assert!(self.selected.insert(k.clone()), "duplicate selection {k}");
                    }
                    Operation::DeleteSelection(k) => {
                        self.selected.remove(k);
                    }
                    Operation::ClearAcquired(k) => {
                        if let Some(flag) = self.progress.get_mut(k) {
                            *flag = false;
                        }
                    }
                    Operation::SetAcquired(k) => {
                        let flag = self.progress.get_mut(k).expect("update needs a row");
                        *flag = true;
                    }
                    Operation::InsertProgress(k) => {
                        assert!(
                            self.progress.insert(k.clone(), true).is_none(),
                            "duplicate progress row {k}"
                        );
                    }
                }
            }
        }

        fn acquired(&self) -> BTreeSet<String> {
            self.progress
                .iter()
                .filter(|(_, flag)| **flag)
                .map(|(k, _)| k.clone())
                .collect()
        }

        fn tracked(&self) -> BTreeSet<String> {
            self.progress.keys().cloned().collect()
        }

        fn invariant_holds(&self) -> bool {
            self.acquired().is_subset(&self.selected)
        }
    }

    #[test]
    fn test_go_bag_scenario() {
        let first = reconcile(
            1,
            KitType::GoBag,
            &BTreeSet::new(),
            &keys(&["water-uuid", "flashlight-uuid"]),
        );
        assert_eq!(first.inserts(), 2);
        assert_eq!(first.deletes(), 0);
        assert_eq!(first.updates(), 0);

        let second = reconcile(
            1,
            KitType::GoBag,
            &keys(&["water-uuid", "flashlight-uuid"]),
            &keys(&["water-uuid"]),
        );
        assert_eq!(
            second.operations,
            vec![
                Operation::ClearAcquired("flashlight-uuid".to_string()),
                Operation::DeleteSelection("flashlight-uuid".to_string()),
            ]
        );
        assert!(second.operations.iter().all(|op| op.key() != "water-uuid"));
    }

    #[test]
    fn test_unchanged_submission_is_noop() {
        let set = keys(&["a", "b"]);
        assert!(reconcile(1, KitType::Shelter, &set, &set).is_empty());
    }

    #[test]
    fn test_removals_precede_insertions() {
        let plan = reconcile(1, KitType::Task, &keys(&["b"]), &keys(&["a"]));
        assert_eq!(
            plan.operations,
            vec![
                Operation::ClearAcquired("b".to_string()),
                Operation::DeleteSelection("b".to_string()),
                Operation::InsertSelection("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_progress_updates_row_tracked_from_other_kit() {
        let plan = reconcile_progress(
            1,
            KitType::Shelter,
            &BTreeSet::new(),
            &keys(&["water-uuid", "radio-uuid"]),
            &keys(&["water-uuid"]),
        );
        assert_eq!(
            plan.operations,
            vec![
                Operation::InsertProgress("radio-uuid".to_string()),
                Operation::SetAcquired("water-uuid".to_string()),
            ]
        );
    }

    #[test]
    fn test_progress_unchecking_clears_flag() {
        let plan = reconcile_progress(
            1,
            KitType::GoBag,
            &keys(&["water-uuid"]),
            &BTreeSet::new(),
            &keys(&["water-uuid"]),
        );
        assert_eq!(
            plan.operations,
            vec![Operation::ClearAcquired("water-uuid".to_string())]
        );
        assert_eq!(plan.updates(), 1);
    }

    #[test]
    fn test_operation_serializes_with_tag() {
        let json = serde_json::to_string(&Operation::InsertSelection("k".to_string())).unwrap();
        assert_eq!(json, r#"{"op":"insert_selection","key":"k"}"#);
    }

    fn key_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[a-f]", 0..6)
    }

    proptest! {
        #[test]
        fn prop_membership_is_idempotent(prev in key_set(), next in key_set()) {
            let mut model = Model { selected: prev, ..Model::default() };
            let plan = reconcile(1, KitType::GoBag, &model.selected.clone(), &next);
            model.apply(&plan);
            prop_assert_eq!(&model.selected, &next);

            let again = reconcile(1, KitType::GoBag, &model.selected.clone(), &next);
            prop_assert!(again.is_empty());
        }

        #[test]
        fn prop_invariant_survives_any_sequence(
            steps in prop::collection::vec((key_set(), key_set()), 1..8)
        ) {
            let mut model = Model::default();
            for (selection, checked) in steps {
                let plan = reconcile(1, KitType::GoBag, &model.selected.clone(), &selection);
                model.apply(&plan);
                prop_assert!(model.invariant_holds());

                // Only keys currently in the kit can be checked off.
                let checked: BTreeSet<String> =
                    checked.intersection(&model.selected).cloned().collect();
                let plan = reconcile_progress(
                    1,
                    KitType::GoBag,
                    &model.acquired(),
                    &checked,
                    &model.tracked(),
                );
                model.apply(&plan);
                prop_assert!(model.invariant_holds());
                prop_assert_eq!(model.acquired(), checked.clone());

                let again = reconcile_progress(
                    1,
                    KitType::GoBag,
                    &model.acquired(),
                    &checked,
                    &model.tracked(),
                );
                prop_assert!(again.is_empty());
            }
        }
    }
}
