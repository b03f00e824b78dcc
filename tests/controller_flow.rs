//! End-to-end controller flows: events go through `handle_event`, remote
//! requests through `RemoteDispatcher` against an in-memory backend, and the
//! responses back into the handler.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use usergrid::app::{ModalKind, NoticeLevel};
use usergrid::domain::{NewUser, OperationError, UserPatch, UserRecord, UserStatus};
use usergrid::remote::{ApiResult, RemoteDispatcher, RemoteRequest, RemoteResponse, UserApi, LOGIN_FAILURE_MESSAGE};
use usergrid::session::{AuthToken, Credentials, SessionContext};
use usergrid::ui::theme::ThemeMode;
use usergrid::{handle_event, Action, AppState, Event};

/// Backend that keeps users in memory and fails on request.
#[derive(Default)]
struct InMemoryApi {
    users: Mutex<Vec<UserRecord>>,
    delete_failure: Mutex<Option<OperationError>>,
    list_calls: AtomicU32,
}

impl InMemoryApi {
    fn with_users(users: Vec<UserRecord>) -> Self {
        Self { users: Mutex::new(users), ..Self::default() }
    }

    fn fail_deletes_with(&self, error: OperationError) {
        *self.delete_failure.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl UserApi for InMemoryApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        if credentials.password == "secret" {
            Ok(AuthToken { access_token: "token-1".into(), expires_at: Utc::now() + chrono::Duration::hours(1) })
        } else {
            Err(OperationError::from_status(401, Some(LOGIN_FAILURE_MESSAGE.into())))
        }
    }

    async fn list_users(&self, search: Option<&str>) -> ApiResult<Vec<UserRecord>> {
        assert!(search.is_none(), "loads fetch the whole collection");
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, user: &NewUser) -> ApiResult<UserRecord> {
        let record = UserRecord {
            id: "9".into(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            status: user.status,
            date_of_birth: user.date_of_birth,
        };
        self.users.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> ApiResult<Option<UserRecord>> {
        let mut users = self.users.lock().unwrap();
        let record = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| OperationError::not_found(Some("User not found".into())))?;
        record.merge(patch);
        Ok(Some(record.clone()))
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        if let Some(error) = self.delete_failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

fn john() -> UserRecord {
    UserRecord {
        id: "1".into(),
        first_name: "John".into(),
        last_name: Some("Doe".into()),
        email: "john@example.com".into(),
        status: UserStatus::Active,
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    }
}

fn jane() -> NewUser {
    NewUser {
        first_name: "Jane".into(),
        last_name: None,
        email: "jane@example.com".into(),
        status: UserStatus::Locked,
        date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
    }
}

/// Handles `event` and every response it transitively causes. Returns the
/// non-remote actions in the order they were emitted.
async fn drive(state: &mut AppState, dispatcher: &RemoteDispatcher, event: Event) -> Vec<Action> {
    let mut queue = VecDeque::from([event]);
    let mut effects = Vec::new();
    while let Some(event) = queue.pop_front() {
        let (_, actions) = handle_event(state, &event).unwrap();
        for action in actions {
            match action {
                Action::Remote(request) => {
                    queue.push_back(Event::Remote(dispatcher.handle_request(request).await));
                }
                other => effects.push(other),
            }
        }
    }
    effects
}

fn signed_out() -> AppState {
    AppState::new(SessionContext::new(ThemeMode::Light), None)
}

async fn signed_in(api: &std::sync::Arc<InMemoryApi>) -> (AppState, RemoteDispatcher) {
    let dispatcher = RemoteDispatcher::new(api.clone());
    let mut state = signed_out();
    let credentials = Credentials { email: "admin@example.com".into(), password: "secret".into() };
    drive(&mut state, &dispatcher, Event::Login(credentials)).await;
    assert!(state.session.is_authenticated());
    (state, dispatcher)
}

fn visible_ids(state: &AppState) -> Vec<&str> {
    state.visible_users().iter().map(|u| u.id.as_str()).collect()
}

#[tokio::test]
async fn login_loads_and_search_filters() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;
    assert_eq!(state.cache.len(), 1);
    assert!(!state.status.is_loading());

    drive(&mut state, &dispatcher, Event::Search("doe".into())).await;
    assert_eq!(visible_ids(&state), vec!["1"]);

    drive(&mut state, &dispatcher, Event::Search("zzz".into())).await;
    assert!(visible_ids(&state).is_empty());
    let viewmodel = state.compute_viewmodel(24, 80);
    assert_eq!(viewmodel.empty_state.unwrap().message, "No users found.");
}

#[tokio::test]
async fn wrong_password_reports_login_failure() {
    let api = std::sync::Arc::new(InMemoryApi::default());
    let dispatcher = RemoteDispatcher::new(api.clone());
    let mut state = signed_out();

    let credentials = Credentials { email: "admin@example.com".into(), password: "nope".into() };
    drive(&mut state, &dispatcher, Event::Login(credentials)).await;

    assert!(!state.session.is_authenticated());
    let error = state.status.error().unwrap();
    assert_eq!(error.status_code, 401);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mount_with_cached_users_skips_reload() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);

    drive(&mut state, &dispatcher, Event::Mount).await;
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);

    drive(&mut state, &dispatcher, Event::RetryLoad).await;
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn confirmed_delete_removes_user_and_closes_dialog() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;

    drive(&mut state, &dispatcher, Event::OpenDelete("1".into())).await;
    let effects = drive(&mut state, &dispatcher, Event::ConfirmDelete).await;

    assert!(state.cache.is_empty());
    assert!(!state.modal.is_open());
    assert!(matches!(
        &effects[..],
        [Action::Notify(n)] if n.level == NoticeLevel::Success && n.message == "User John deleted successfully!"
    ));
}

#[tokio::test]
async fn failed_delete_keeps_user_and_dialog() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;
    api.fail_deletes_with(OperationError::from_status(500, Some("Database unavailable".into())));

    drive(&mut state, &dispatcher, Event::OpenDelete("1".into())).await;
    let effects = drive(&mut state, &dispatcher, Event::ConfirmDelete).await;

    assert!(effects.is_empty());
    assert_eq!(state.cache.records(), &[john()]);
    assert!(state.modal.matches(ModalKind::Delete, "1"));
    let error = state.status.error().unwrap();
    assert_eq!(error.status_code, 500);
    assert_eq!(error.message, "Database unavailable");
    assert!(!state.mutations.has_pending());
}

#[tokio::test]
async fn created_user_is_prepended() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;

    let effects = drive(&mut state, &dispatcher, Event::Create(jane())).await;

    let ids: Vec<&str> = state.cache.records().iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["9", "1"]);
    assert_eq!(visible_ids(&state), vec!["9", "1"]);
    assert!(matches!(&effects[..], [Action::Notify(n)] if n.message == "User Jane created successfully!"));
}

#[tokio::test]
async fn confirmed_edit_writes_through() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;

    drive(&mut state, &dispatcher, Event::OpenEdit("1".into())).await;
    let patch = UserPatch { email: Some("jd@example.com".into()), ..UserPatch::default() };
    drive(&mut state, &dispatcher, Event::ConfirmEdit(patch)).await;

    assert_eq!(state.cache.get("1").unwrap().email, "jd@example.com");
    assert_eq!(api.users.lock().unwrap()[0].email, "jd@example.com");
    assert!(!state.modal.is_open());
}

#[tokio::test]
async fn editing_a_user_deleted_elsewhere_reports_not_found() {
    let api = std::sync::Arc::new(InMemoryApi::with_users(vec![john()]));
    let (mut state, dispatcher) = signed_in(&api).await;
    api.users.lock().unwrap().clear();

    drive(&mut state, &dispatcher, Event::OpenEdit("1".into())).await;
    let patch = UserPatch { first_name: Some("Johnny".into()), ..UserPatch::default() };
    drive(&mut state, &dispatcher, Event::ConfirmEdit(patch)).await;

    assert_eq!(state.status.error().unwrap().status_code, 404);
    assert_eq!(state.cache.get("1").unwrap().first_name, "John");
    assert!(state.modal.matches(ModalKind::Edit, "1"));
}

/// Requests are issued by hand and their responses delivered out of order.
mod sequencing {
    use super::*;

    fn authenticated_with_john() -> AppState {
        let mut session = SessionContext::new(ThemeMode::Light);
        session.start(AuthToken { access_token: "t".into(), expires_at: Utc::now() + chrono::Duration::hours(1) });
        let mut state = AppState::new(session, None);
        state.cache.replace(vec![john()], Utc::now());
        state.apply_search_filter();
        state
    }

    fn single_request(actions: Vec<Action>) -> RemoteRequest {
        match actions.into_iter().next() {
            Some(Action::Remote(request)) => request,
            other => panic!("expected a remote request, got {other:?}"),
        }
    }

    #[test]
    fn late_update_after_newer_delete_is_dropped() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        handle_event(&mut state, &Event::OpenEdit("1".into())).unwrap();
        let patch = UserPatch { first_name: Some("Johnny".into()), ..UserPatch::default() };
        let (_, actions) = handle_event(&mut state, &Event::ConfirmEdit(patch.clone())).unwrap();
        let RemoteRequest::UpdateUser { seq: update_seq, .. } = single_request(actions) else {
            panic!("expected update");
        };

        handle_event(&mut state, &Event::OpenDelete("1".into())).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::ConfirmDelete).unwrap();
        let RemoteRequest::DeleteUser { seq: delete_seq, .. } = single_request(actions) else {
            panic!("expected delete");
        };
        assert!(delete_seq > update_seq);

        let deleted = RemoteResponse::UserDeleted { epoch, seq: delete_seq, id: "1".into(), result: Ok(()) };
        handle_event(&mut state, &Event::Remote(deleted)).unwrap();
        assert!(state.cache.is_empty());

        let mut server_copy = john();
        server_copy.merge(&patch);
        let updated = RemoteResponse::UserUpdated {
            epoch,
            seq: update_seq,
            id: "1".into(),
            patch,
            result: Ok(Some(server_copy)),
        };
        let (render, actions) = handle_event(&mut state, &Event::Remote(updated)).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
        assert!(state.cache.is_empty());
    }

    #[test]
    fn only_newest_load_applies() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        let (_, first) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let (_, second) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let RemoteRequest::ListUsers { generation: old, .. } = single_request(first) else { panic!() };
        let RemoteRequest::ListUsers { generation: new, .. } = single_request(second) else { panic!() };

        let mut renamed = john();
        renamed.first_name = "Newest".into();
        let newest = RemoteResponse::UsersLoaded { epoch, generation: new, result: Ok(vec![renamed]) };
        handle_event(&mut state, &Event::Remote(newest)).unwrap();

        let stale = RemoteResponse::UsersLoaded { epoch, generation: old, result: Ok(vec![]) };
        let (render, _) = handle_event(&mut state, &Event::Remote(stale)).unwrap();
        assert!(!render);
        assert_eq!(state.cache.get("1").unwrap().first_name, "Newest");
    }

    fn load_request(actions: Vec<Action>) -> u64 {
        match single_request(actions) {
            RemoteRequest::ListUsers { generation, .. } => generation,
            other => panic!("expected a load, got {other:?}"),
        }
    }

    fn cached_ids(state: &AppState) -> Vec<&str> {
        state.cache.records().iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn load_issued_before_delete_does_not_bring_user_back() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        let (_, actions) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let generation = load_request(actions);

        handle_event(&mut state, &Event::OpenDelete("1".into())).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::ConfirmDelete).unwrap();
        let RemoteRequest::DeleteUser { seq, .. } = single_request(actions) else { panic!() };
        let deleted = RemoteResponse::UserDeleted { epoch, seq, id: "1".into(), result: Ok(()) };
        handle_event(&mut state, &Event::Remote(deleted)).unwrap();
        assert!(state.cache.is_empty());

        let loaded = RemoteResponse::UsersLoaded { epoch, generation, result: Ok(vec![john()]) };
        handle_event(&mut state, &Event::Remote(loaded)).unwrap();
        assert!(cached_ids(&state).is_empty());
        assert!(visible_ids(&state).is_empty());
    }

    #[test]
    fn load_issued_before_create_keeps_created_user() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        let (_, actions) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let generation = load_request(actions);

        let (_, actions) = handle_event(&mut state, &Event::Create(jane())).unwrap();
        let RemoteRequest::CreateUser { seq, .. } = single_request(actions) else { panic!() };
        let mut created = john();
        created.id = "9".into();
        created.first_name = "Jane".into();
        let response = RemoteResponse::UserCreated { epoch, seq, result: Ok(created) };
        handle_event(&mut state, &Event::Remote(response)).unwrap();

        let loaded = RemoteResponse::UsersLoaded { epoch, generation, result: Ok(vec![john()]) };
        handle_event(&mut state, &Event::Remote(loaded)).unwrap();
        assert_eq!(cached_ids(&state), vec!["9", "1"]);
        assert_eq!(visible_ids(&state), vec!["9", "1"]);
    }

    #[test]
    fn load_issued_after_delete_is_taken_as_is() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        handle_event(&mut state, &Event::OpenDelete("1".into())).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::ConfirmDelete).unwrap();
        let RemoteRequest::DeleteUser { seq, .. } = single_request(actions) else { panic!() };
        let deleted = RemoteResponse::UserDeleted { epoch, seq, id: "1".into(), result: Ok(()) };
        handle_event(&mut state, &Event::Remote(deleted)).unwrap();

        // the server recreated the id in the meantime
        let (_, actions) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let generation = load_request(actions);
        let loaded = RemoteResponse::UsersLoaded { epoch, generation, result: Ok(vec![john()]) };
        handle_event(&mut state, &Event::Remote(loaded)).unwrap();
        assert_eq!(cached_ids(&state), vec!["1"]);
    }

    #[test]
    fn failed_create_leaves_cache_untouched() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        let (_, actions) = handle_event(&mut state, &Event::Create(jane())).unwrap();
        let RemoteRequest::CreateUser { seq, .. } = single_request(actions) else { panic!() };

        let error = OperationError::from_status(422, Some("Email already in use".into()));
        let response = RemoteResponse::UserCreated { epoch, seq, result: Err(error.clone()) };
        let (render, actions) = handle_event(&mut state, &Event::Remote(response)).unwrap();

        assert!(render);
        assert!(actions.is_empty());
        assert_eq!(state.cache.records(), &[john()]);
        assert_eq!(state.status.error(), Some(&error));
        assert!(!state.mutations.has_pending());
    }

    #[test]
    fn failed_load_keeps_cache_and_clears_on_success() {
        let mut session = SessionContext::new(ThemeMode::Light);
        session.start(AuthToken { access_token: "t".into(), expires_at: Utc::now() + chrono::Duration::hours(1) });
        let mut state = AppState::new(session, None);
        let epoch = state.session.epoch();

        let (_, actions) = handle_event(&mut state, &Event::Mount).unwrap();
        let generation = load_request(actions);
        assert!(state.status.is_loading());

        let failure = RemoteResponse::UsersLoaded {
            epoch,
            generation,
            result: Err(OperationError::network("Request timed out")),
        };
        let (render, _) = handle_event(&mut state, &Event::Remote(failure)).unwrap();
        assert!(render);
        assert!(state.cache.is_empty());
        assert!(!state.status.is_loading());
        assert_eq!(state.status.error().unwrap().status_code, 500);

        let (_, actions) = handle_event(&mut state, &Event::RetryLoad).unwrap();
        let generation = load_request(actions);
        let loaded = RemoteResponse::UsersLoaded { epoch, generation, result: Ok(vec![john()]) };
        handle_event(&mut state, &Event::Remote(loaded)).unwrap();
        assert!(state.status.error().is_none());
        assert_eq!(cached_ids(&state), vec!["1"]);
    }

    #[test]
    fn responses_from_before_logout_are_discarded() {
        let mut state = authenticated_with_john();
        let epoch = state.session.epoch();

        let (_, actions) = handle_event(&mut state, &Event::Create(jane())).unwrap();
        let RemoteRequest::CreateUser { seq, .. } = single_request(actions) else { panic!() };

        handle_event(&mut state, &Event::Logout).unwrap();
        assert!(state.cache.is_empty());

        let mut created = john();
        created.id = "9".into();
        let response = RemoteResponse::UserCreated { epoch, seq, result: Ok(created) };
        let (render, actions) = handle_event(&mut state, &Event::Remote(response)).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
        assert!(state.cache.is_empty());
    }
}
