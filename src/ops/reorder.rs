use std::cmp::Ordering;
use std::fmt;

use crate::model::category::{Category, SortEntry, SortKey};

/// Gap left between keys when a scope is renumbered
pub const RENUMBER_STRIDE: i64 = 10;

/// Error type for reorder operations
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error("category not found: {0}")]
    NotFound(i64),
    #[error("category {id} is not shown in the {scope} scope")]
    NotInScope { id: i64, scope: ScopeFilter },
}

// ---------------------------------------------------------------------------
// Scope and ordering
// ---------------------------------------------------------------------------

/// Which categories the reorder list currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    /// Every category
    #[default]
    All,
    /// Categories without a parent
    TopLevel,
    /// Children of one category
    Parent(i64),
}

impl ScopeFilter {
    pub fn contains(self, category: &Category) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::TopLevel => category.parent_id.is_none(),
            ScopeFilter::Parent(id) => category.parent_id == Some(id),
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeFilter::All => write!(f, "all"),
            ScopeFilter::TopLevel => write!(f, "top-level"),
            ScopeFilter::Parent(id) => write!(f, "parent {}", id),
        }
    }
}

/// Display order: keyed categories by key (ties by id), then unkeyed ones by id.
pub fn compare_categories(a: &Category, b: &Category) -> Ordering {
    match (a.sort, b.sort) {
        (SortKey::Value(x), SortKey::Value(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (SortKey::Value(_), SortKey::Unset) => Ordering::Less,
        (SortKey::Unset, SortKey::Value(_)) => Ordering::Greater,
        (SortKey::Unset, SortKey::Unset) => a.id.cmp(&b.id),
    }
}

/// The ordered list shown for `filter`. Recomputed on every call.
pub fn view(categories: &[Category], filter: ScopeFilter) -> Vec<&Category> {
    let mut items: Vec<&Category> = categories.iter().filter(|c| filter.contains(c)).collect();
    items.sort_by(|a, b| compare_categories(a, b));
    items
}

// ---------------------------------------------------------------------------
// Move computation
// ---------------------------------------------------------------------------

/// Source and destination of a move within one ordered view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub old_index: usize,
    pub new_index: usize,
    pub moving_down: bool,
}

/// Locate the dragged item and the drop target in `view`.
/// Returns `None` when either is missing.
pub fn resolve_move(view: &[&Category], active_id: i64, over_id: i64) -> Option<MovePlan> {
    let old_index = view.iter().position(|c| c.id == active_id)?;
    let new_index = view.iter().position(|c| c.id == over_id)?;
    Some(MovePlan {
        old_index,
        new_index,
        moving_down: old_index < new_index,
    })
}

/// Result of computing a key for the moved item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAssignment {
    /// The moved item takes this key; nothing else changes
    Key(i64),
    /// No room between the neighbours; the whole scope must be renumbered
    Collision,
}

/// Compute the moved item's new key from its future neighbours.
///
/// `view` is the pre-move order: the moved item still sits at
/// `plan.old_index`, so the neighbour pair is picked differently for each
/// direction.
pub fn assign_sort_key(view: &[&Category], plan: MovePlan) -> KeyAssignment {
    let last = view.len().saturating_sub(1);

    // Keys near the ends of the i64 range have no room left: renumber
    if plan.new_index == 0 {
        return view[0]
            .sort
            .or(10)
            .checked_sub(5)
            .map_or(KeyAssignment::Collision, KeyAssignment::Key);
    }
    if plan.new_index == last {
        return view[last]
            .sort
            .or(0)
            .checked_add(10)
            .map_or(KeyAssignment::Collision, KeyAssignment::Key);
    }

    let (prev, next) = if plan.moving_down {
        (view[plan.new_index], view[plan.new_index + 1])
    } else {
        (view[plan.new_index - 1], view[plan.new_index])
    };
    let prev_sort = prev.sort.or(0);
    let next_sort = match next.sort.value() {
        Some(v) => v,
        None => match prev_sort.checked_add(20) {
            Some(v) => v,
            None => return KeyAssignment::Collision,
        },
    };
    // The midpoint of two i64 values always fits back into an i64
    let new_sort = (i128::from(prev_sort) + i128::from(next_sort)).div_euclid(2) as i64;

    if new_sort == prev_sort || new_sort == next_sort {
        KeyAssignment::Collision
    } else {
        KeyAssignment::Key(new_sort)
    }
}

/// New `(id, sort)` pairs for every item of `view` after the move, spaced by
/// [`RENUMBER_STRIDE`] starting at one stride.
pub fn renumber(view: &[&Category], plan: MovePlan) -> Vec<SortEntry> {
    let mut ids: Vec<i64> = view.iter().map(|c| c.id).collect();
    let moved = ids.remove(plan.old_index);
    let insert_at = if plan.new_index > plan.old_index {
        plan.new_index - 1
    } else {
        plan.new_index
    };
    ids.insert(insert_at.min(ids.len()), moved);

    ids.into_iter()
        .enumerate()
        .map(|(pos, id)| SortEntry {
            id,
            sort: (pos as i64 + 1) * RENUMBER_STRIDE,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What a move did to the in-memory list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped on itself, or on something outside the scope
    Unchanged,
    /// Only the moved category got a new key
    Assigned { id: i64, sort: i64 },
    /// Every category in the scope was renumbered
    Renumbered { count: usize },
}

impl MoveOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, MoveOutcome::Unchanged)
    }
}

/// The category list being reordered, with its active scope and unsaved flag
#[derive(Debug, Clone, Default)]
pub struct ReorderSession {
    categories: Vec<Category>,
    filter: ScopeFilter,
    dirty: bool,
}

impl ReorderSession {
    pub fn new(categories: Vec<Category>) -> Self {
        ReorderSession {
            categories,
            filter: ScopeFilter::All,
            dirty: false,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filter(&self) -> ScopeFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ScopeFilter) {
        self.filter = filter;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn find(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Ordered categories in the active scope
    pub fn view(&self) -> Vec<&Category> {
        view(&self.categories, self.filter)
    }

    /// Top-level categories that have at least one child, in display order
    pub fn parents(&self) -> Vec<&Category> {
        view(&self.categories, ScopeFilter::TopLevel)
            .into_iter()
            .filter(|p| self.categories.iter().any(|c| c.parent_id == Some(p.id)))
            .collect()
    }

    /// Check that `id` is shown in the active scope
    pub fn ensure_in_view(&self, id: i64) -> Result<(), ReorderError> {
        let category = self.find(id).ok_or(ReorderError::NotFound(id))?;
        if self.filter.contains(category) {
            Ok(())
        } else {
            Err(ReorderError::NotInScope {
                id,
                scope: self.filter,
            })
        }
    }

    /// Drop `active_id` onto the position of `over_id` in the active scope.
    pub fn move_item(&mut self, active_id: i64, over_id: i64) -> MoveOutcome {
        if active_id == over_id {
            return MoveOutcome::Unchanged;
        }

        let (outcome, changes) = {
            let current = self.view();
            let Some(plan) = resolve_move(&current, active_id, over_id) else {
                return MoveOutcome::Unchanged;
            };
            match assign_sort_key(&current, plan) {
                KeyAssignment::Key(sort) => (
                    MoveOutcome::Assigned { id: active_id, sort },
                    vec![SortEntry { id: active_id, sort }],
                ),
                KeyAssignment::Collision => {
                    let entries = renumber(&current, plan);
                    let count = entries.len();
                    (MoveOutcome::Renumbered { count }, entries)
                }
            }
        };

        for entry in &changes {
            if let Some(c) = self.categories.iter_mut().find(|c| c.id == entry.id) {
                c.sort = SortKey::Value(entry.sort);
            }
        }
        self.dirty = true;
        outcome
    }

    /// `{id, sort}` for every category in memory, unset keys sent as 0
    pub fn sort_payload(&self) -> Vec<SortEntry> {
        self.categories
            .iter()
            .map(|c| SortEntry {
                id: c.id,
                sort: c.sort.or(0),
            })
            .collect()
    }

    /// Called after the batch save succeeded
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Swap in a freshly fetched list, dropping unsaved changes
    pub fn replace_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.dirty = false;
        if let ScopeFilter::Parent(id) = self.filter
            && self.find(id).is_none()
        {
            self.filter = ScopeFilter::All;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cat(id: i64, sort: Option<i64>) -> Category {
        let mut c = Category::new(id, format!("C{}", id));
        c.sort = sort.map_or(SortKey::Unset, SortKey::Value);
        c
    }

    fn child(id: i64, parent: i64, sort: i64) -> Category {
        let mut c = cat(id, Some(sort));
        c.parent_id = Some(parent);
        c
    }

    fn sorts(session: &ReorderSession) -> Vec<i64> {
        session.view().iter().map(|c| c.sort.or(0)).collect()
    }

    fn ids(session: &ReorderSession) -> Vec<i64> {
        session.view().iter().map(|c| c.id).collect()
    }

    fn ten_twenty_thirty() -> ReorderSession {
        ReorderSession::new(vec![cat(1, Some(10)), cat(2, Some(20)), cat(3, Some(30))])
    }

    // --- Comparator ---

    #[test]
    fn comparator_orders_by_key_regardless_of_id() {
        let a = cat(99, Some(5));
        let b = cat(1, Some(50));
        assert_eq!(compare_categories(&a, &b), Ordering::Less);
        assert_eq!(compare_categories(&b, &a), Ordering::Greater);
    }

    #[test]
    fn comparator_breaks_unset_ties_by_id() {
        let a = cat(3, None);
        let b = cat(8, None);
        assert_eq!(compare_categories(&a, &b), Ordering::Less);
        assert_eq!(compare_categories(&b, &a), Ordering::Greater);
    }

    #[test]
    fn comparator_breaks_equal_keys_by_id() {
        let a = cat(4, Some(10));
        let b = cat(2, Some(10));
        assert_eq!(compare_categories(&a, &b), Ordering::Greater);
    }

    #[test]
    fn keyed_categories_come_before_unkeyed() {
        let list = vec![cat(1, None), cat(2, Some(100)), cat(3, None), cat(4, Some(-3))];
        let ordered: Vec<i64> = view(&list, ScopeFilter::All).iter().map(|c| c.id).collect();
        assert_eq!(ordered, vec![4, 2, 1, 3]);
    }

    // --- Scope ---

    #[test]
    fn view_filters_by_scope() {
        let list = vec![cat(1, Some(10)), child(2, 1, 20), child(3, 1, 5), cat(4, Some(30))];
        let top: Vec<i64> = view(&list, ScopeFilter::TopLevel).iter().map(|c| c.id).collect();
        assert_eq!(top, vec![1, 4]);
        let kids: Vec<i64> = view(&list, ScopeFilter::Parent(1)).iter().map(|c| c.id).collect();
        assert_eq!(kids, vec![3, 2]);
    }

    #[test]
    fn resolve_move_reports_direction() {
        let list = vec![cat(1, Some(10)), cat(2, Some(20)), cat(3, Some(30))];
        let v = view(&list, ScopeFilter::All);
        let plan = resolve_move(&v, 1, 3).unwrap();
        assert_eq!(
            plan,
            MovePlan {
                old_index: 0,
                new_index: 2,
                moving_down: true
            }
        );
        assert!(!resolve_move(&v, 3, 2).unwrap().moving_down);
        assert!(resolve_move(&v, 1, 42).is_none());
    }

    // --- Moves ---

    #[test]
    fn drop_on_itself_is_noop() {
        let mut session = ten_twenty_thirty();
        assert_eq!(session.move_item(2, 2), MoveOutcome::Unchanged);
        assert_eq!(sorts(&session), vec![10, 20, 30]);
        assert!(!session.is_dirty());
    }

    #[test]
    fn move_to_front_takes_first_key_minus_five() {
        let mut session = ten_twenty_thirty();
        let outcome = session.move_item(3, 1);
        assert_eq!(outcome, MoveOutcome::Assigned { id: 3, sort: 5 });
        assert_eq!(ids(&session), vec![3, 1, 2]);
        assert_eq!(sorts(&session), vec![5, 10, 20]);
        assert!(session.is_dirty());
    }

    #[test]
    fn move_to_back_takes_last_key_plus_ten() {
        let mut session = ten_twenty_thirty();
        let outcome = session.move_item(1, 3);
        assert_eq!(outcome, MoveOutcome::Assigned { id: 1, sort: 40 });
        assert_eq!(ids(&session), vec![2, 3, 1]);
    }

    #[test]
    fn move_up_into_middle_takes_midpoint() {
        let mut session = ten_twenty_thirty();
        let outcome = session.move_item(3, 2);
        assert_eq!(outcome, MoveOutcome::Assigned { id: 3, sort: 15 });
        assert_eq!(sorts(&session), vec![10, 15, 20]);
        assert_eq!(ids(&session), vec![1, 3, 2]);
    }

    #[test]
    fn move_down_into_middle_uses_target_and_its_successor() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            cat(2, Some(20)),
            cat(3, Some(30)),
            cat(4, Some(40)),
        ]);
        let outcome = session.move_item(1, 3);
        assert_eq!(outcome, MoveOutcome::Assigned { id: 1, sort: 35 });
        assert_eq!(ids(&session), vec![2, 3, 1, 4]);
    }

    #[test]
    fn collision_renumbers_whole_scope() {
        let mut session =
            ReorderSession::new(vec![cat(1, Some(10)), cat(2, Some(11)), cat(3, Some(20))]);
        let outcome = session.move_item(3, 2);
        assert_eq!(outcome, MoveOutcome::Renumbered { count: 3 });
        assert_eq!(ids(&session), vec![1, 3, 2]);
        assert_eq!(sorts(&session), vec![10, 20, 30]);
        assert!(session.is_dirty());
    }

    #[test]
    fn collision_moving_down_reinserts_before_target() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            cat(2, Some(20)),
            cat(3, Some(21)),
            cat(4, Some(22)),
        ]);
        let outcome = session.move_item(1, 3);
        assert_eq!(outcome, MoveOutcome::Renumbered { count: 4 });
        assert_eq!(ids(&session), vec![2, 1, 3, 4]);
        assert_eq!(sorts(&session), vec![10, 20, 30, 40]);
    }

    #[test]
    fn unset_neighbours_use_fallback_keys() {
        // Middle move between two unset keys: prev 0, next 0 + 20
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            cat(2, None),
            cat(3, None),
            cat(4, None),
        ]);
        // view: 1(10), 2, 3, 4 -> move 1 over 3 (down): prev = 3 (0), next = 4 (20)
        let outcome = session.move_item(1, 3);
        assert_eq!(outcome, MoveOutcome::Assigned { id: 1, sort: 10 });
    }

    #[test]
    fn front_and_back_fallbacks_when_unset() {
        let mut session = ReorderSession::new(vec![cat(1, None), cat(2, None)]);
        assert_eq!(
            session.move_item(2, 1),
            MoveOutcome::Assigned { id: 2, sort: 5 }
        );

        let mut session = ReorderSession::new(vec![cat(1, None), cat(2, None)]);
        assert_eq!(
            session.move_item(1, 2),
            MoveOutcome::Assigned { id: 1, sort: 10 }
        );
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut session = ten_twenty_thirty();
        assert_eq!(session.move_item(1, 99), MoveOutcome::Unchanged);
        assert_eq!(session.move_item(99, 1), MoveOutcome::Unchanged);
        assert!(!session.is_dirty());
    }

    #[test]
    fn negative_midpoint_floors() {
        let mut session =
            ReorderSession::new(vec![cat(1, Some(-7)), cat(2, Some(0)), cat(3, Some(30))]);
        // move 3 up over 2: prev -7, next 0 -> floor(-3.5) = -4
        assert_eq!(
            session.move_item(3, 2),
            MoveOutcome::Assigned { id: 3, sort: -4 }
        );
    }

    #[test]
    fn huge_keys_take_exact_midpoint() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(5_000_000_000_000_000_000)),
            cat(2, Some(6_000_000_000_000_000_000)),
            cat(3, Some(7_000_000_000_000_000_000)),
        ]);
        assert_eq!(
            session.move_item(3, 2),
            MoveOutcome::Assigned {
                id: 3,
                sort: 5_500_000_000_000_000_000
            }
        );
        assert_eq!(ids(&session), vec![1, 3, 2]);
    }

    #[test]
    fn no_room_after_max_key_renumbers() {
        let mut session = ReorderSession::new(vec![cat(1, Some(10)), cat(2, Some(i64::MAX))]);
        assert_eq!(session.move_item(1, 2), MoveOutcome::Renumbered { count: 2 });
        assert_eq!(sorts(&session), vec![10, 20]);
        assert!(session.is_dirty());
    }

    #[test]
    fn no_room_before_min_key_renumbers() {
        let mut session = ReorderSession::new(vec![cat(1, Some(i64::MIN)), cat(2, Some(0))]);
        assert_eq!(session.move_item(2, 1), MoveOutcome::Renumbered { count: 2 });
        assert_eq!(ids(&session), vec![2, 1]);
        assert_eq!(sorts(&session), vec![10, 20]);
    }

    #[test]
    fn unset_successor_after_max_key_renumbers() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            cat(2, Some(i64::MAX)),
            cat(3, None),
            cat(4, None),
        ]);
        // move 4 up over 3: prev is MAX, next is unset
        assert_eq!(session.move_item(4, 3), MoveOutcome::Renumbered { count: 4 });
        assert_eq!(ids(&session), vec![1, 2, 4, 3]);
        assert_eq!(sorts(&session), vec![10, 20, 30, 40]);
    }

    #[test]
    fn midpoint_spanning_whole_range() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(i64::MIN)),
            cat(2, Some(i64::MAX)),
            cat(3, None),
        ]);
        // move 3 up over 2: prev MIN, next MAX -> floor(-0.5) = -1
        assert_eq!(
            session.move_item(3, 2),
            MoveOutcome::Assigned { id: 3, sort: -1 }
        );
    }

    // --- Scope-limited behavior ---

    #[test]
    fn renumbering_leaves_other_scopes_untouched() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            child(2, 1, 10),
            child(3, 1, 11),
            child(4, 1, 20),
            cat(5, Some(11)),
            child(6, 5, 10),
        ]);
        session.set_filter(ScopeFilter::Parent(1));
        let outcome = session.move_item(4, 3);
        assert_eq!(outcome, MoveOutcome::Renumbered { count: 3 });
        assert_eq!(ids(&session), vec![2, 4, 3]);

        assert_eq!(session.find(1).unwrap().sort, SortKey::Value(10));
        assert_eq!(session.find(5).unwrap().sort, SortKey::Value(11));
        assert_eq!(session.find(6).unwrap().sort, SortKey::Value(10));
    }

    #[test]
    fn moves_outside_scope_are_ignored() {
        let mut session = ReorderSession::new(vec![cat(1, Some(10)), child(2, 1, 10), cat(3, Some(20))]);
        session.set_filter(ScopeFilter::TopLevel);
        assert_eq!(session.move_item(2, 3), MoveOutcome::Unchanged);
        assert!(session.ensure_in_view(2).is_err());
        assert!(session.ensure_in_view(3).is_ok());
        assert!(matches!(
            session.ensure_in_view(77),
            Err(ReorderError::NotFound(77))
        ));
    }

    // --- Save ---

    #[test]
    fn payload_covers_every_category_with_unset_as_zero() {
        let mut session = ReorderSession::new(vec![
            cat(1, Some(10)),
            child(2, 1, 10),
            child(3, 1, 11),
            cat(4, None),
        ]);
        session.set_filter(ScopeFilter::Parent(1));
        session.move_item(3, 2);

        let payload = session.sort_payload();
        assert_eq!(
            payload,
            vec![
                SortEntry { id: 1, sort: 10 },
                SortEntry { id: 2, sort: 10 },
                SortEntry { id: 3, sort: 5 },
                SortEntry { id: 4, sort: 0 },
            ]
        );
    }

    #[test]
    fn mark_saved_and_reload_clear_dirty() {
        let mut session = ten_twenty_thirty();
        session.move_item(3, 1);
        assert!(session.is_dirty());
        session.mark_saved();
        assert!(!session.is_dirty());

        session.move_item(1, 2);
        session.set_filter(ScopeFilter::Parent(7));
        session.replace_categories(vec![cat(1, Some(10))]);
        assert!(!session.is_dirty());
        assert_eq!(session.filter(), ScopeFilter::All);
    }

    #[test]
    fn parents_lists_only_categories_with_children() {
        let session = ReorderSession::new(vec![
            cat(1, Some(20)),
            child(2, 1, 10),
            cat(3, Some(10)),
            cat(4, Some(5)),
            child(5, 4, 10),
        ]);
        let parents: Vec<i64> = session.parents().iter().map(|c| c.id).collect();
        assert_eq!(parents, vec![4, 1]);
    }
}
