use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::client::api::ProjectsApi;
use crate::client::error::{ClientError, ClientResult};
use crate::client::state::ProjectsState;
use crate::models::{CreateProject, Project, UpdateProject};

/// Client-side project cache.
///
/// `create_project` waits for the server before touching local state, since
/// ids are server-assigned. `update_project` and `delete_project` apply
/// locally first and then either adopt the server's canonical record or, on
/// failure, reload the whole list from the server.
///
/// Every operation remembers the snapshot generation it started under. A
/// response arriving after [`ProjectsStore::reset`] is returned to its caller
/// but never written into the new session's snapshot.
pub struct ProjectsStore {
    api: Arc<dyn ProjectsApi>,
    state: watch::Sender<ProjectsState>,
}

impl ProjectsStore {
    pub fn new(api: Arc<dyn ProjectsApi>) -> Self {
        let (state, _) = watch::channel(ProjectsState::default());
        Self { api, state }
    }

    /// Observe every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ProjectsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProjectsState {
        self.state.borrow().clone()
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Publish `transition(current)` if the snapshot is still at `generation`.
    fn commit(
        &self,
        generation: u64,
        transition: impl FnOnce(ProjectsState) -> ProjectsState,
    ) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            *state = transition(std::mem::take(state));
            true
        });

        if !applied {
            tracing::debug!(generation, "Discarding response from a reset session");
        }
        applied
    }

    pub async fn load_projects(&self) -> ClientResult<()> {
        let generation = self.generation();
        self.commit(generation, ProjectsState::begin_load);

        match self.api.list().await {
            Ok(projects) => {
                self.commit(generation, |state| state.loaded(projects));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load projects");
                self.commit(generation, |state| state.load_failed(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn create_project(&self, draft: &CreateProject) -> ClientResult<Project> {
        let generation = self.generation();

        match self.api.create(draft).await {
            Ok(project) => {
                self.commit(generation, |state| state.prepend(project.clone()));
                Ok(project)
            }
            Err(e) => {
                self.commit(generation, |state| state.with_error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn update_project(&self, id: Uuid, patch: &UpdateProject) -> ClientResult<Project> {
        let generation = self.generation();
        self.commit(generation, |state| state.merge_patch(id, patch));

        match self.api.update(id, patch).await {
            Ok(project) => {
                self.commit(generation, |state| state.replace(project.clone()));
                Ok(project)
            }
            Err(e) => {
                self.roll_back(generation, id, &e).await;
                Err(e)
            }
        }
    }

    pub async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        let generation = self.generation();
        self.commit(generation, |state| state.remove(id));

        match self.api.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.roll_back(generation, id, &e).await;
                Err(e)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state
            .send_modify(|state| *state = std::mem::take(state).without_error());
    }

    /// Drop all cached state at a session boundary
    pub fn reset(&self) {
        self.state
            .send_modify(|state| *state = std::mem::take(state).reset());
    }

    /// Discard speculative local state by reloading from the server, then
    /// record the write failure.
    async fn roll_back(&self, generation: u64, id: Uuid, error: &ClientError) {
        if self.generation() != generation {
            tracing::debug!(project_id = %id, "Skipping rollback for a reset session");
            return;
        }

        tracing::warn!(project_id = %id, error = %error, "Write rejected, reloading projects");
        if let Err(reload_error) = self.load_projects().await {
            tracing::warn!(error = %reload_error, "Reload after rejected write failed");
        }
        self.commit(generation, |state| state.with_error(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProjectStatus, DEFAULT_PROJECT_COLOR};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use time::{Duration, OffsetDateTime};
    use tokio::sync::{Notify, Semaphore};

    /// Scripted server: holds canonical records, can fail or pause calls
    struct FakeApi {
        projects: Mutex<Vec<Project>>,
        fail_lists: AtomicBool,
        fail_creates: AtomicBool,
        fail_updates: AtomicBool,
        fail_deletes: AtomicBool,
        gated: AtomicBool,
        entered: Notify,
        release: Semaphore,
        list_calls: AtomicUsize,
    }

    impl FakeApi {
        fn with_projects(projects: Vec<Project>) -> Arc<Self> {
            Arc::new(Self {
                projects: Mutex::new(projects),
                fail_lists: AtomicBool::new(false),
                fail_creates: AtomicBool::new(false),
                fail_updates: AtomicBool::new(false),
                fail_deletes: AtomicBool::new(false),
                gated: AtomicBool::new(false),
                entered: Notify::new(),
                release: Semaphore::new(0),
                list_calls: AtomicUsize::new(0),
            })
        }

        fn failure(message: &str) -> ClientError {
            ClientError::Api {
                status: 500,
                message: message.to_string(),
            }
        }

        /// Blocks while gated until the test hands out a permit
        async fn pause(&self) {
            if self.gated.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.acquire().await.unwrap().forget();
            }
        }

        fn server_view(&self) -> Vec<Project> {
            let mut projects = self.projects.lock().unwrap().clone();
            projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            projects
        }
    }

    #[async_trait]
    impl ProjectsApi for FakeApi {
        async fn list(&self) -> ClientResult<Vec<Project>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(Self::failure("Failed to load projects"));
            }
            Ok(self.server_view())
        }

        async fn create(&self, draft: &CreateProject) -> ClientResult<Project> {
            self.pause().await;
            if self.fail_creates.load(Ordering::SeqCst) {
                return Err(Self::failure("Project name is required"));
            }
            let now = OffsetDateTime::now_utc();
            let project = Project {
                id: Uuid::new_v4(),
                name: draft.name.trim().to_string(),
                description: draft.description.clone(),
                owner_id: Uuid::nil(),
                status: ProjectStatus::Active,
                color: draft
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
                created_at: now,
                updated_at: now,
            };
            self.projects.lock().unwrap().push(project.clone());
            Ok(project)
        }

        async fn get(&self, id: Uuid) -> ClientResult<Option<Project>> {
            Ok(self
                .projects
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn update(&self, id: Uuid, patch: &UpdateProject) -> ClientResult<Project> {
            self.pause().await;
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(Self::failure("Failed to update project"));
            }
            let mut projects = self.projects.lock().unwrap();
            let project = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| Self::failure("Project not found"))?;
            project.apply_patch(patch);
            project.updated_at += Duration::seconds(1);
            Ok(project.clone())
        }

        async fn delete(&self, id: Uuid) -> ClientResult<()> {
            self.pause().await;
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(Self::failure("Failed to delete project"));
            }
            self.projects.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    fn project(name: &str, age_minutes: i64) -> Project {
        let at = OffsetDateTime::now_utc() - Duration::minutes(age_minutes);
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            owner_id: Uuid::nil(),
            status: ProjectStatus::Active,
            color: DEFAULT_PROJECT_COLOR.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn rename(name: &str) -> UpdateProject {
        UpdateProject {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    async fn loaded_store(api: &Arc<FakeApi>) -> ProjectsStore {
        let store = ProjectsStore::new(api.clone());
        store.load_projects().await.unwrap();
        store
    }

    #[tokio::test]
    async fn load_replaces_projects_and_clears_loading() {
        let api = FakeApi::with_projects(vec![project("Old", 10), project("New", 1)]);
        let store = loaded_store(&api).await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.projects, api.server_view());
    }

    #[tokio::test]
    async fn failed_load_keeps_stale_projects() {
        let api = FakeApi::with_projects(vec![project("Cached", 1)]);
        let store = loaded_store(&api).await;
        let before = store.snapshot().projects;

        api.fail_lists.store(true, Ordering::SeqCst);
        assert!(store.load_projects().await.is_err());

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.projects, before);
        assert_eq!(state.error.as_deref(), Some("Failed to load projects"));
    }

    #[tokio::test]
    async fn create_prepends_only_after_confirmation() {
        let api = FakeApi::with_projects(vec![project("Existing", 5)]);
        let store = loaded_store(&api).await;
        api.gated.store(true, Ordering::SeqCst);

        let draft = CreateProject {
            name: "Website Redesign".to_string(),
            color: Some("#3B82F6".to_string()),
            ..Default::default()
        };
        let (created, ()) = tokio::join!(store.create_project(&draft), async {
            api.entered.notified().await;
            // Nothing is synthesized while the request is in flight
            assert_eq!(store.snapshot().projects.len(), 1);
            api.release.add_permits(1);
        });

        let created = created.unwrap();
        let state = store.snapshot();
        assert_eq!(state.projects.len(), 2);
        assert_eq!(state.projects[0], created);
    }

    #[tokio::test]
    async fn failed_create_changes_nothing_but_error() {
        let api = FakeApi::with_projects(vec![project("Existing", 5)]);
        let store = loaded_store(&api).await;
        let before = store.snapshot();
        api.fail_creates.store(true, Ordering::SeqCst);

        let err = store
            .create_project(&CreateProject::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Project name is required");

        let state = store.snapshot();
        assert_eq!(state.projects, before.projects);
        assert_eq!(state.error.as_deref(), Some("Project name is required"));
    }

    #[tokio::test]
    async fn update_is_visible_before_the_server_answers() {
        let target = project("Original", 3);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        api.gated.store(true, Ordering::SeqCst);

        let patch = rename("X");
        let (result, ()) = tokio::join!(store.update_project(target.id, &patch), async {
            api.entered.notified().await;
            let speculative = store.snapshot();
            let entry = speculative.project(target.id).unwrap();
            assert_eq!(entry.name, "X");
            assert_eq!(entry.description, target.description);
            assert_eq!(entry.updated_at, target.updated_at);
            api.release.add_permits(1);
        });

        // The canonical record replaces the optimistic guess
        let canonical = result.unwrap();
        assert!(canonical.updated_at > target.updated_at);
        assert_eq!(store.snapshot().project(target.id), Some(&canonical));
    }

    #[tokio::test]
    async fn failed_update_converges_to_server_truth() {
        let target = project("Original", 3);
        let other = project("Other", 1);
        let api = FakeApi::with_projects(vec![target.clone(), other]);
        let store = loaded_store(&api).await;
        api.fail_updates.store(true, Ordering::SeqCst);

        let err = store
            .update_project(target.id, &rename("X"))
            .await
            .unwrap_err();

        let state = store.snapshot();
        assert_eq!(state.projects, api.server_view());
        assert_eq!(state.project(target.id).unwrap().name, "Original");
        assert_eq!(state.error, Some(err.to_string()));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn delete_removes_immediately_and_stays_removed() {
        let target = project("Doomed", 2);
        let api = FakeApi::with_projects(vec![target.clone(), project("Kept", 1)]);
        let store = loaded_store(&api).await;
        api.gated.store(true, Ordering::SeqCst);

        let (result, ()) = tokio::join!(store.delete_project(target.id), async {
            api.entered.notified().await;
            assert!(store.snapshot().project(target.id).is_none());
            api.release.add_permits(1);
        });

        result.unwrap();
        let state = store.snapshot();
        assert!(state.project(target.id).is_none());
        assert_eq!(state.projects.len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_restores_the_entry() {
        let target = project("Survivor", 2);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        api.fail_deletes.store(true, Ordering::SeqCst);

        assert!(store.delete_project(target.id).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.project(target.id), Some(&target));
        assert_eq!(state.error.as_deref(), Some("Failed to delete project"));
    }

    #[tokio::test]
    async fn write_error_outlives_a_failing_reload() {
        let target = project("Original", 3);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        api.fail_updates.store(true, Ordering::SeqCst);
        api.fail_lists.store(true, Ordering::SeqCst);

        assert!(store.update_project(target.id, &rename("X")).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("Failed to update project"));
        // The speculative patch survives only because the server was unreachable
        assert_eq!(state.project(target.id).unwrap().name, "X");
    }

    #[tokio::test]
    async fn response_after_reset_is_discarded() {
        let target = project("Before reset", 3);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        api.gated.store(true, Ordering::SeqCst);
        let patch = rename("X");

        let (result, ()) = tokio::join!(store.update_project(target.id, &patch), async {
            api.entered.notified().await;
            store.reset();
            api.release.add_permits(1);
        });

        // The caller still gets the server's answer
        assert_eq!(result.unwrap().name, "X");
        let state = store.snapshot();
        assert!(state.projects.is_empty());
        assert_eq!(state.generation, 1);
    }

    #[tokio::test]
    async fn failure_after_reset_does_not_reload() {
        let target = project("Before reset", 3);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        let lists_before = api.list_calls.load(Ordering::SeqCst);
        api.fail_deletes.store(true, Ordering::SeqCst);
        api.gated.store(true, Ordering::SeqCst);

        let (result, ()) = tokio::join!(store.delete_project(target.id), async {
            api.entered.notified().await;
            store.reset();
            api.release.add_permits(1);
        });

        assert!(result.is_err());
        assert_eq!(api.list_calls.load(Ordering::SeqCst), lists_before);
        let state = store.snapshot();
        assert!(state.projects.is_empty());
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn clear_error_only_touches_error() {
        let api = FakeApi::with_projects(vec![project("P", 1)]);
        let store = loaded_store(&api).await;
        api.fail_creates.store(true, Ordering::SeqCst);
        let _ = store.create_project(&CreateProject::default()).await;

        let before = store.snapshot();
        store.clear_error();
        let after = store.snapshot();

        assert_eq!(after.error, None);
        assert_eq!(after.projects, before.projects);
        assert_eq!(after.generation, before.generation);
    }

    #[tokio::test]
    async fn subscribers_see_the_optimistic_snapshot() {
        let target = project("Watched", 1);
        let api = FakeApi::with_projects(vec![target.clone()]);
        let store = loaded_store(&api).await;
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update_project(target.id, &rename("Seen")).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().project(target.id).unwrap().name, "Seen");
    }
}
