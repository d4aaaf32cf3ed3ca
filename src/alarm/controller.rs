use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::api::{ApiError, ShieldApi};
use super::feedback::{Confirmation, Notifier};
use super::models::{
    AlertShieldListItem, Pagination, PatchShieldRequest, ShieldForm, ShieldId, ShieldQuery,
};
use super::render::{self, ColumnDef, LocalizedTimeFormatter, PageChrome, ShieldRowView};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Applied,
    /// The backend answered without a record.
    Rejected,
    /// A toggle for the same row is still in flight; nothing was sent.
    AlreadyPending,
}

/// Rows with a status change in flight. Shared by every controller that
/// works on the same backend, so a row stays busy across requests.
pub type BusyRows = Arc<Mutex<HashSet<ShieldId>>>;

/// Page state owned by one list controller.
#[derive(Debug, Clone)]
pub struct ShieldListState {
    pub data_list: Vec<AlertShieldListItem>,
    pub pagination: Pagination,
    pub search_key: String,
    // Fetches started and not yet settled.
    pending_loads: usize,
    // Rows on the page as of the last successful fetch.
    list_count: usize,
}

impl ShieldListState {
    fn new(page_size: u32) -> Self {
        Self {
            data_list: Vec::new(),
            pagination: Pagination::new(page_size),
            search_key: String::new(),
            pending_loads: 0,
            list_count: 0,
        }
    }

    pub fn table_loading(&self) -> bool {
        self.pending_loads > 0
    }

    fn query(&self) -> ShieldQuery {
        let name = self.search_key.trim();
        ShieldQuery {
            page: self.pagination.current,
            page_size: self.pagination.page_size,
            name: (!name.is_empty()).then(|| name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldPageView {
    pub chrome: PageChrome,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<ShieldRowView>,
    pub pagination: Pagination,
    pub loading: bool,
    pub search_key: String,
}

/// Drives the shield-strategy list page.
///
/// The state lock is never held across a backend call, so toggles on
/// different rows can be awaited concurrently through a shared reference.
pub struct ShieldListController {
    api: Arc<dyn ShieldApi>,
    notifier: Arc<dyn Notifier>,
    locale: String,
    time_formatter: LocalizedTimeFormatter,
    state: Mutex<ShieldListState>,
    busy: BusyRows,
}

impl ShieldListController {
    pub fn new(
        api: Arc<dyn ShieldApi>,
        notifier: Arc<dyn Notifier>,
        locale: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            notifier,
            locale: locale.into(),
            time_formatter: LocalizedTimeFormatter::default(),
            state: Mutex::new(ShieldListState::new(page_size)),
            busy: BusyRows::default(),
        }
    }

    /// Shares the busy-row set with other controllers.
    pub fn with_busy_rows(mut self, busy: BusyRows) -> Self {
        self.busy = busy;
        self
    }

    pub fn with_time_formatter(mut self, time_formatter: LocalizedTimeFormatter) -> Self {
        self.time_formatter = time_formatter;
        self
    }

    /// Seeds pagination and filter text without fetching, e.g. from request parameters.
    pub async fn restore(&self, current: u32, page_size: u32, search_key: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.pagination.current = current.max(1);
        state.pagination.page_size = page_size.max(1);
        state.search_key = search_key.into();
    }

    pub async fn snapshot(&self) -> ShieldListState {
        self.state.lock().await.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.lock().await.pagination
    }

    pub async fn is_row_busy(&self, id: ShieldId) -> bool {
        self.busy.lock().await.contains(&id)
    }

    pub async fn busy_rows(&self) -> HashSet<ShieldId> {
        self.busy.lock().await.clone()
    }

    /// Fetches the page described by the current pagination and filter text.
    ///
    /// On failure the previous rows are kept and the error is returned after
    /// the user has been told.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let query = {
            let mut state = self.state.lock().await;
            state.pending_loads += 1;
            state.query()
        };

        let result = self.api.list_shields(&query).await;

        let mut state = self.state.lock().await;
        state.pending_loads = state.pending_loads.saturating_sub(1);
        match result {
            Ok(page) => {
                debug!(page = query.page, rows = page.items.len(), total = page.count, "Shield list loaded.");
                state.list_count = page.items.len();
                state.data_list = page.items;
                state.pagination.total = page.count;
                Ok(())
            }
            Err(e) => {
                drop(state);
                error!(error = %e, page = query.page, "Failed to load shield list.");
                self.notifier
                    .error(&t!("common.loadListFailed", locale = self.locale.as_str()));
                Err(e)
            }
        }
    }

    /// Filter from the search box; always starts again from page 1.
    pub async fn apply_filter(&self, search_key: impl Into<String>) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock().await;
            state.search_key = search_key.into();
            state.pagination.current = 1;
        }
        self.refresh().await
    }

    pub async fn clear_filter(&self) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock().await;
            state.search_key.clear();
            state.pagination.current = 1;
        }
        self.refresh().await
    }

    pub async fn change_page(&self, current: u32, page_size: u32) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock().await;
            state.pagination.current = current.max(1);
            state.pagination.page_size = page_size.max(1);
        }
        self.refresh().await
    }

    /// Deletes a shield after confirmation.
    ///
    /// Removing the only row of a page past the first moves back one page so
    /// the table never lands on an empty trailing page.
    pub async fn delete_shield(
        &self,
        id: ShieldId,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, ApiError> {
        let confirmed = confirmation
            .confirm(
                &t!("deleteTitle", locale = self.locale.as_str()),
                &t!("deleteContent", locale = self.locale.as_str()),
            )
            .await;
        if !confirmed {
            debug!(shield_id = id, "Shield deletion cancelled.");
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(e) = self.api.delete_shield(id).await {
            error!(shield_id = id, error = %e, "Failed to delete shield.");
            self.notifier
                .error(&t!("AlertAssign.operateFailed", locale = self.locale.as_str()));
            return Err(e);
        }

        info!(shield_id = id, "Shield deleted.");
        self.notifier
            .success(&t!("successfullyDeleted", locale = self.locale.as_str()));

        {
            let mut state = self.state.lock().await;
            if state.pagination.current > 1 && state.list_count == 1 {
                state.pagination.current -= 1;
            }
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Shield list refresh after delete failed.");
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Switches a shield on or off, then reloads the page from the backend.
    ///
    /// The row stays busy from before the request until the reload settles,
    /// on every path.
    pub async fn toggle_active(&self, id: ShieldId, checked: bool) -> Result<ToggleOutcome, ApiError> {
        if !self.busy.lock().await.insert(id) {
            warn!(shield_id = id, "Toggle already in flight for shield; ignoring.");
            return Ok(ToggleOutcome::AlreadyPending);
        }

        let patched = self
            .api
            .patch_shield(id, &PatchShieldRequest { is_active: checked })
            .await;

        let outcome = match patched {
            Ok(Some(_)) => {
                info!(shield_id = id, is_active = checked, "Shield status updated.");
                let text = if checked {
                    t!("settings.enableSuccess", locale = self.locale.as_str())
                } else {
                    t!("settings.disableSuccess", locale = self.locale.as_str())
                };
                self.notifier.success(&text);
                Ok(ToggleOutcome::Applied)
            }
            Ok(None) => {
                warn!(shield_id = id, "Backend returned no record for shield status update.");
                self.notifier
                    .error(&t!("common.operateFailed", locale = self.locale.as_str()));
                Ok(ToggleOutcome::Rejected)
            }
            Err(e) => {
                error!(shield_id = id, error = %e, "Failed to update shield status.");
                self.notifier
                    .error(&t!("common.operateFailed", locale = self.locale.as_str()));
                Err(e)
            }
        };

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Shield list refresh after toggle failed.");
        }

        self.busy.lock().await.remove(&id);
        outcome
    }

    /// Creates (`existing_id == None`) or updates a shield from the edit form,
    /// then goes back to page 1.
    pub async fn save_shield(
        &self,
        form: &ShieldForm,
        existing_id: Option<ShieldId>,
    ) -> Result<AlertShieldListItem, ApiError> {
        let saved = match existing_id {
            Some(id) => self.api.update_shield(id, form).await,
            None => self.api.create_shield(form).await,
        };

        let saved = match saved {
            Ok(saved) => saved,
            Err(e) => {
                error!(shield_id = ?existing_id, error = %e, "Failed to save shield.");
                self.notifier
                    .error(&t!("common.operateFailed", locale = self.locale.as_str()));
                return Err(e);
            }
        };

        let text = if existing_id.is_some() {
            t!("successfullyModified", locale = self.locale.as_str())
        } else {
            t!("successfullyAdded", locale = self.locale.as_str())
        };
        self.notifier.success(&text);

        self.state.lock().await.pagination.current = 1;
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Shield list refresh after save failed.");
        }
        Ok(saved)
    }

    pub fn columns(&self) -> Vec<ColumnDef> {
        render::build_columns(&self.locale)
    }

    /// Row views for the current page, built fresh from the busy set and rows.
    pub async fn rows(&self) -> Vec<ShieldRowView> {
        let busy = self.busy_rows().await;
        let state = self.state.lock().await;
        self.rows_from(&state, &busy)
    }

    pub async fn view(&self) -> ShieldPageView {
        let busy = self.busy_rows().await;
        let state = self.state.lock().await;
        ShieldPageView {
            chrome: render::build_chrome(&self.locale),
            columns: self.columns(),
            rows: self.rows_from(&state, &busy),
            pagination: state.pagination,
            loading: state.table_loading(),
            search_key: state.search_key.clone(),
        }
    }

    fn rows_from(&self, state: &ShieldListState, busy: &HashSet<ShieldId>) -> Vec<ShieldRowView> {
        state
            .data_list
            .iter()
            .map(|item| render::build_row(item, &self.locale, busy.contains(&item.id), &self.time_formatter))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::feedback::{AutoConfirm, CollectingNotifier, MessageLevel};
    use crate::alarm::models::{ShieldPage, SuppressionKind, SuppressionTime};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    fn item(id: ShieldId, name: &str, is_active: bool) -> AlertShieldListItem {
        AlertShieldListItem {
            id,
            name: name.to_string(),
            suppression_time: SuppressionTime {
                kind: SuppressionKind::One,
                start_time: "2024-01-01 00:00:00".to_string(),
                end_time: "2024-01-01 01:00:00".to_string(),
                week_month: None,
            },
            is_active,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            extra: Map::new(),
        }
    }

    /// In-memory backend holding `total` shields, paged like the real one.
    struct FakeApi {
        shields: StdMutex<Vec<AlertShieldListItem>>,
        queries: StdMutex<Vec<ShieldQuery>>,
        fail_list: StdMutex<bool>,
        fail_patch: bool,
        patch_returns_none: bool,
        patch_calls: StdMutex<u32>,
        // When set, patch waits on `release` after signalling `entered`.
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl FakeApi {
        fn with_shields(count: i64) -> Self {
            Self {
                shields: StdMutex::new((1..=count).map(|i| item(i, &format!("shield-{i}"), true)).collect()),
                queries: StdMutex::new(Vec::new()),
                fail_list: StdMutex::new(false),
                fail_patch: false,
                patch_returns_none: false,
                patch_calls: StdMutex::new(0),
                gate: None,
            }
        }

        fn last_query(&self) -> ShieldQuery {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ShieldApi for FakeApi {
        async fn list_shields(&self, query: &ShieldQuery) -> Result<ShieldPage, ApiError> {
            self.queries.lock().unwrap().push(query.clone());
            if *self.fail_list.lock().unwrap() {
                return Err(ApiError::Rejected("list down".to_string()));
            }
            let shields = self.shields.lock().unwrap();
            let filtered: Vec<_> = shields
                .iter()
                .filter(|s| query.name.as_ref().is_none_or(|n| s.name.contains(n.as_str())))
                .cloned()
                .collect();
            let start = ((query.page - 1) * query.page_size) as usize;
            let items = filtered
                .iter()
                .skip(start)
                .take(query.page_size as usize)
                .cloned()
                .collect();
            Ok(ShieldPage { items, count: filtered.len() as u64 })
        }

        async fn create_shield(&self, form: &ShieldForm) -> Result<AlertShieldListItem, ApiError> {
            let mut shields = self.shields.lock().unwrap();
            let id = shields.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            let mut created = item(id, &form.name, form.is_active);
            created.suppression_time = form.suppression_time.clone();
            shields.push(created.clone());
            Ok(created)
        }

        async fn update_shield(&self, id: ShieldId, form: &ShieldForm) -> Result<AlertShieldListItem, ApiError> {
            let mut shields = self.shields.lock().unwrap();
            let shield = shields
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(ApiError::Status { status: 404, body: "missing".to_string() })?;
            shield.name = form.name.clone();
            Ok(shield.clone())
        }

        async fn delete_shield(&self, id: ShieldId) -> Result<(), ApiError> {
            self.shields.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }

        async fn patch_shield(
            &self,
            id: ShieldId,
            patch: &PatchShieldRequest,
        ) -> Result<Option<AlertShieldListItem>, ApiError> {
            *self.patch_calls.lock().unwrap() += 1;
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            if self.fail_patch {
                return Err(ApiError::Rejected("patch down".to_string()));
            }
            if self.patch_returns_none {
                return Ok(None);
            }
            let mut shields = self.shields.lock().unwrap();
            let shield = shields.iter_mut().find(|s| s.id == id);
            Ok(shield.map(|s| {
                s.is_active = patch.is_active;
                s.clone()
            }))
        }
    }

    struct Decline;

    #[async_trait]
    impl Confirmation for Decline {
        async fn confirm(&self, _title: &str, _content: &str) -> bool {
            false
        }
    }

    fn controller(api: Arc<FakeApi>, notifier: Arc<CollectingNotifier>) -> ShieldListController {
        ShieldListController::new(api, notifier, "en", 2)
    }

    #[tokio::test]
    async fn test_refresh_loads_page() {
        let api = Arc::new(FakeApi::with_shields(3));
        let ctrl = controller(api.clone(), Arc::new(CollectingNotifier::new()));

        ctrl.refresh().await.unwrap();
        let state = ctrl.snapshot().await;
        assert_eq!(state.data_list.len(), 2);
        assert_eq!(state.pagination.total, 3);
        assert!(!state.table_loading());
        assert_eq!(api.last_query(), ShieldQuery { page: 1, page_size: 2, name: None });
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_rows_and_reports() {
        let api = Arc::new(FakeApi::with_shields(3));
        let notifier = Arc::new(CollectingNotifier::new());
        let ctrl = controller(api.clone(), notifier.clone());
        ctrl.refresh().await.unwrap();

        *api.fail_list.lock().unwrap() = true;
        assert!(ctrl.refresh().await.is_err());

        let state = ctrl.snapshot().await;
        assert_eq!(state.data_list.len(), 2);
        assert!(!state.table_loading());
        let messages = notifier.take();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Error);
        assert_eq!(messages[0].text, "Failed to load list");
    }

    #[tokio::test]
    async fn test_filter_apply_and_clear_reset_to_first_page() {
        let api = Arc::new(FakeApi::with_shields(5));
        let ctrl = controller(api.clone(), Arc::new(CollectingNotifier::new()));
        ctrl.change_page(3, 2).await.unwrap();
        assert_eq!(api.last_query().page, 3);

        ctrl.apply_filter("shield-4").await.unwrap();
        assert_eq!(
            api.last_query(),
            ShieldQuery { page: 1, page_size: 2, name: Some("shield-4".to_string()) }
        );
        assert_eq!(ctrl.snapshot().await.data_list.len(), 1);

        ctrl.change_page(2, 2).await.unwrap();
        ctrl.clear_filter().await.unwrap();
        assert_eq!(api.last_query(), ShieldQuery { page: 1, page_size: 2, name: None });
        assert_eq!(ctrl.snapshot().await.search_key, "");
    }

    #[tokio::test]
    async fn test_deleting_sole_row_moves_to_previous_page() {
        let api = Arc::new(FakeApi::with_shields(3));
        let ctrl = controller(api.clone(), Arc::new(CollectingNotifier::new()));
        ctrl.change_page(2, 2).await.unwrap();
        assert_eq!(ctrl.snapshot().await.data_list.len(), 1);

        let outcome = ctrl.delete_shield(3, &AutoConfirm).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let state = ctrl.snapshot().await;
        assert_eq!(state.pagination.current, 1);
        assert_eq!(api.last_query().page, 1);
        let ids: Vec<_> = state.data_list.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_deleting_non_sole_row_keeps_page() {
        let api = Arc::new(FakeApi::with_shields(5));
        let ctrl = controller(api.clone(), Arc::new(CollectingNotifier::new()));
        ctrl.change_page(2, 2).await.unwrap();

        ctrl.delete_shield(3, &AutoConfirm).await.unwrap();

        let state = ctrl.snapshot().await;
        assert_eq!(state.pagination.current, 2);
        let ids: Vec<_> = state.data_list.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let api = Arc::new(FakeApi::with_shields(2));
        let notifier = Arc::new(CollectingNotifier::new());
        let ctrl = controller(api.clone(), notifier.clone());

        let outcome = ctrl.delete_shield(1, &Decline).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(api.shields.lock().unwrap().len(), 2);
        assert!(notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_marks_row_busy_only_while_in_flight() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeApi::with_shields(2);
        fake.gate = Some((entered.clone(), release.clone()));
        let api = Arc::new(fake);
        let notifier = Arc::new(CollectingNotifier::new());
        let ctrl = controller(api.clone(), notifier.clone());

        let (outcome, _) = tokio::join!(ctrl.toggle_active(1, false), async {
            entered.notified().await;
            let busy = ctrl.busy_rows().await;
            assert_eq!(busy.len(), 1);
            assert!(busy.contains(&1));
            release.notify_one();
        });

        assert_eq!(outcome.unwrap(), ToggleOutcome::Applied);
        assert!(!ctrl.is_row_busy(1).await);
        assert!(!ctrl.snapshot().await.data_list[0].is_active);
        assert_eq!(notifier.take()[0].text, "Disabled successfully");
    }

    #[tokio::test]
    async fn test_toggle_failure_clears_busy_and_refetches() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeApi::with_shields(2);
        fake.fail_patch = true;
        fake.gate = Some((entered.clone(), release.clone()));
        let api = Arc::new(fake);
        let notifier = Arc::new(CollectingNotifier::new());
        let ctrl = controller(api.clone(), notifier.clone());

        let (outcome, _) = tokio::join!(ctrl.toggle_active(2, true), async {
            entered.notified().await;
            let busy = ctrl.busy_rows().await;
            assert_eq!(busy.len(), 1);
            assert!(busy.contains(&2));
            release.notify_one();
        });

        assert!(outcome.is_err());
        assert!(!ctrl.is_row_busy(2).await);
        assert_eq!(api.queries.lock().unwrap().len(), 1);
        assert_eq!(notifier.take()[0].text, "Operation failed");
    }

    #[tokio::test]
    async fn test_toggle_without_record_is_rejected() {
        let mut fake = FakeApi::with_shields(1);
        fake.patch_returns_none = true;
        let ctrl = controller(Arc::new(fake), Arc::new(CollectingNotifier::new()));

        assert_eq!(ctrl.toggle_active(1, true).await.unwrap(), ToggleOutcome::Rejected);
        assert!(!ctrl.is_row_busy(1).await);
    }

    #[tokio::test]
    async fn test_duplicate_toggle_is_ignored() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeApi::with_shields(1);
        fake.gate = Some((entered.clone(), release.clone()));
        let api = Arc::new(fake);
        let ctrl = controller(api.clone(), Arc::new(CollectingNotifier::new()));

        let (first, second) = tokio::join!(ctrl.toggle_active(1, false), async {
            entered.notified().await;
            let second = ctrl.toggle_active(1, false).await;
            release.notify_one();
            second
        });

        assert_eq!(first.unwrap(), ToggleOutcome::Applied);
        assert_eq!(second.unwrap(), ToggleOutcome::AlreadyPending);
        assert_eq!(*api.patch_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_returns_to_first_page() {
        let api = Arc::new(FakeApi::with_shields(3));
        let notifier = Arc::new(CollectingNotifier::new());
        let ctrl = controller(api.clone(), notifier.clone());
        ctrl.change_page(2, 2).await.unwrap();

        let form = ShieldForm {
            name: "maintenance".to_string(),
            suppression_time: SuppressionTime {
                kind: SuppressionKind::Week,
                start_time: "01:00:00".to_string(),
                end_time: "02:00:00".to_string(),
                week_month: Some(vec![6, 7]),
            },
            is_active: true,
            extra: Map::new(),
        };
        let saved = ctrl.save_shield(&form, None).await.unwrap();

        assert_eq!(saved.id, 4);
        assert_eq!(ctrl.pagination().await.current, 1);
        assert_eq!(ctrl.pagination().await.total, 4);
        assert_eq!(notifier.take()[0].text, "Successfully added");
    }

    #[tokio::test]
    async fn test_view_reflects_busy_rows() {
        let api = Arc::new(FakeApi::with_shields(2));
        let ctrl = controller(api, Arc::new(CollectingNotifier::new()));
        ctrl.refresh().await.unwrap();
        ctrl.busy.lock().await.insert(2);

        let view = ctrl.view().await;
        assert_eq!(view.columns.len(), 6);
        assert_eq!(view.chrome.search_placeholder, "Search");
        assert!(!view.rows[0].switch.loading);
        assert!(view.rows[1].switch.loading);
        assert_eq!(view.rows[0].time_range, "2024-01-01 00:00:00-2024-01-01 01:00:00");
        assert_eq!(view.rows[0].created_at, "2024-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_busy_rows_are_shared_between_controllers() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeApi::with_shields(1);
        fake.gate = Some((entered.clone(), release.clone()));
        let api = Arc::new(fake);
        let busy = BusyRows::default();
        let first = controller(api.clone(), Arc::new(CollectingNotifier::new())).with_busy_rows(busy.clone());
        let second = controller(api.clone(), Arc::new(CollectingNotifier::new())).with_busy_rows(busy);

        let (applied, pending) = tokio::join!(first.toggle_active(1, false), async {
            entered.notified().await;
            second.refresh().await.unwrap();
            assert!(second.view().await.rows[0].switch.loading);
            let pending = second.toggle_active(1, true).await;
            release.notify_one();
            pending
        });

        assert_eq!(applied.unwrap(), ToggleOutcome::Applied);
        assert_eq!(pending.unwrap(), ToggleOutcome::AlreadyPending);
        assert_eq!(*api.patch_calls.lock().unwrap(), 1);
        assert!(!second.is_row_busy(1).await);
    }

    #[tokio::test]
    async fn test_loading_stays_on_until_last_fetch_settles() {
        let api = Arc::new(FakeApi::with_shields(2));
        let ctrl = controller(api, Arc::new(CollectingNotifier::new()));

        ctrl.state.lock().await.pending_loads = 1;
        ctrl.refresh().await.unwrap();
        assert!(ctrl.snapshot().await.table_loading());
        assert!(ctrl.view().await.loading);

        ctrl.refresh().await.unwrap();
        assert!(ctrl.snapshot().await.table_loading());
        ctrl.state.lock().await.pending_loads -= 1;
        assert!(!ctrl.view().await.loading);
    }
}
