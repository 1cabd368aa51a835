use crate::cli::commands::{CategoriesAction, CategoriesCmd, CategoryMvArgs, ScopeArgs};
use crate::cli::output::*;
use crate::io::api::CategoryStore;
use crate::model::category::SortEntry;
use crate::ops::reorder::{MoveOutcome, ReorderSession, ScopeFilter};

use super::{Context, api_error, print_json};

pub fn cmd_categories(ctx: &Context, args: CategoriesCmd) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.client()?;
    match args.action {
        None => cmd_categories_list(ctx, &client, args.scope),
        Some(CategoriesAction::Mv(mv)) => cmd_categories_mv(ctx, &client, mv),
    }
}

fn scope_filter(scope: ScopeArgs) -> ScopeFilter {
    match (scope.parent, scope.top_level) {
        (Some(id), _) => ScopeFilter::Parent(id),
        (None, true) => ScopeFilter::TopLevel,
        (None, false) => ScopeFilter::All,
    }
}

fn load_session(
    store: &dyn CategoryStore,
    filter: ScopeFilter,
) -> Result<ReorderSession, Box<dyn std::error::Error>> {
    let categories = store.fetch_categories().map_err(api_error)?;
    let mut session = ReorderSession::new(categories);
    if let ScopeFilter::Parent(id) = filter
        && session.find(id).is_none()
    {
        return Err(format!("parent category not found: {}", id).into());
    }
    session.set_filter(filter);
    Ok(session)
}

fn cmd_categories_list(
    ctx: &Context,
    store: &dyn CategoryStore,
    scope: ScopeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = scope_filter(scope);
    let session = load_session(store, filter)?;
    let view = session.view();

    if ctx.json {
        return print_json(&CategoryViewJson {
            scope: filter.to_string(),
            categories: category_rows(&view),
        });
    }
    let lines = match filter {
        ScopeFilter::All => format_category_tree(&view),
        _ => format_category_view(&view, filter),
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// What a single move did
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub saved: bool,
    pub changes: Vec<SortEntry>,
    pub session: ReorderSession,
}

/// Load, move `id` onto `over` in `filter`, and save the full batch unless `dry_run`
pub fn run_move(
    store: &dyn CategoryStore,
    filter: ScopeFilter,
    id: i64,
    over: i64,
    dry_run: bool,
) -> Result<MoveReport, Box<dyn std::error::Error>> {
    let mut session = load_session(store, filter)?;
    session.ensure_in_view(id)?;
    session.ensure_in_view(over)?;

    let before = session.sort_payload();
    let outcome = session.move_item(id, over);
    let changes: Vec<SortEntry> = session
        .sort_payload()
        .into_iter()
        .filter(|e| !before.contains(e))
        .collect();

    let mut saved = false;
    if outcome.changed() && !dry_run {
        store.save_sort(&session.sort_payload()).map_err(api_error)?;
        session.mark_saved();
        saved = true;
    }
    Ok(MoveReport {
        outcome,
        saved,
        changes,
        session,
    })
}

fn cmd_categories_mv(
    ctx: &Context,
    store: &dyn CategoryStore,
    args: CategoryMvArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = scope_filter(args.scope);
    let report = run_move(store, filter, args.id, args.over, args.dry_run)?;
    let view = report.session.view();

    if ctx.json {
        return print_json(&MoveJson {
            id: args.id,
            over: args.over,
            outcome: outcome_name(report.outcome),
            saved: report.saved,
            changes: report.changes,
            order: category_rows(&view),
        });
    }

    println!("{}", format_move_summary(args.id, args.over, report.outcome));
    for line in format_category_view(&view, filter) {
        println!("{}", line);
    }
    if report.outcome.changed() {
        if report.saved {
            println!("saved {} sort keys", report.session.categories().len());
        } else {
            println!("dry run: nothing saved");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::ApiError;
    use crate::model::category::{Category, SortKey};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct FakeStore {
        categories: Vec<Category>,
        saved: RefCell<Vec<Vec<SortEntry>>>,
    }

    impl FakeStore {
        fn new(sorts: &[(i64, Option<i64>, Option<i64>)]) -> Self {
            let categories = sorts
                .iter()
                .map(|&(id, parent, sort)| {
                    let mut c = Category::new(id, format!("c{}", id));
                    c.parent_id = parent;
                    c.sort = sort.map(SortKey::Value).unwrap_or_default();
                    c
                })
                .collect();
            FakeStore {
                categories,
                saved: RefCell::new(Vec::new()),
            }
        }
    }

    impl CategoryStore for FakeStore {
        fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
            Ok(self.categories.clone())
        }

        fn save_sort(&self, entries: &[SortEntry]) -> Result<(), ApiError> {
            self.saved.borrow_mut().push(entries.to_vec());
            Ok(())
        }
    }

    #[test]
    fn move_saves_full_batch() {
        let store = FakeStore::new(&[(1, None, Some(10)), (2, None, Some(20)), (3, None, Some(30))]);
        let report = run_move(&store, ScopeFilter::All, 3, 1, false).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Assigned { id: 3, sort: 5 });
        assert!(report.saved);
        assert_eq!(report.changes, vec![SortEntry { id: 3, sort: 5 }]);
        assert!(!report.session.is_dirty());

        let saved = store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            saved[0],
            vec![
                SortEntry { id: 1, sort: 10 },
                SortEntry { id: 2, sort: 20 },
                SortEntry { id: 3, sort: 5 },
            ]
        );
    }

    #[test]
    fn dry_run_does_not_save() {
        let store = FakeStore::new(&[(1, None, Some(10)), (2, None, Some(11)), (3, None, Some(20))]);
        let report = run_move(&store, ScopeFilter::All, 3, 2, true).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Renumbered { count: 3 });
        assert!(!report.saved);
        assert!(report.session.is_dirty());
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn unchanged_move_does_not_save() {
        let store = FakeStore::new(&[(1, None, Some(10)), (2, None, Some(20))]);
        let report = run_move(&store, ScopeFilter::All, 2, 2, false).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Unchanged);
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn move_outside_scope_is_rejected() {
        let store = FakeStore::new(&[(1, None, Some(10)), (2, Some(1), Some(10)), (3, Some(1), Some(20))]);
        assert!(run_move(&store, ScopeFilter::TopLevel, 2, 1, false).is_err());
        assert!(run_move(&store, ScopeFilter::Parent(7), 2, 3, false).is_err());

        let report = run_move(&store, ScopeFilter::Parent(1), 3, 2, false).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Assigned { id: 3, sort: 5 });
    }

    #[test]
    fn scope_flags_map_to_filters() {
        assert_eq!(scope_filter(ScopeArgs::default()), ScopeFilter::All);
        assert_eq!(
            scope_filter(ScopeArgs {
                parent: None,
                top_level: true
            }),
            ScopeFilter::TopLevel
        );
        assert_eq!(
            scope_filter(ScopeArgs {
                parent: Some(4),
                top_level: false
            }),
            ScopeFilter::Parent(4)
        );
    }
}
