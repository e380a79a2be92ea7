//! Fetches the workspace listing and hands it to the registry in one piece.

use crate::backend::DeskBackend;
use crate::error::{DeskError, DeskResult};
use crate::item::DirectorySnapshot;
use crate::registry::ItemRegistry;
use crate::session::SessionContext;
use crate::store::WorkspaceStore;
use crate::task::{TaskId, TaskSet};
use std::rc::Rc;
use std::sync::Arc;

pub struct DirectoryLoader {
    backend: Arc<dyn DeskBackend>,
    session: SessionContext,
    store: Rc<dyn WorkspaceStore>,
    tasks: TaskSet<DeskResult<DirectorySnapshot>>,
    /// The request whose answer will be applied; anything else is stale.
    current: Option<TaskId>,
    loading: bool,
    last_error: Option<DeskError>,
    workspace_id: String,
}

impl DirectoryLoader {
    pub fn new(
        backend: Arc<dyn DeskBackend>,
        session: SessionContext,
        store: Rc<dyn WorkspaceStore>,
    ) -> Self {
        Self {
            backend,
            session,
            store,
            tasks: TaskSet::new(),
            current: None,
            loading: true,
            last_error: None,
            workspace_id: String::new(),
        }
    }

    /// Starts fetching the listing for `workspace_id`, or for the persisted /
    /// session workspace when none is supplied.
    ///
    /// An unresolvable id is still sent (as an empty string); the backend decides
    /// what that means.
    pub fn load_directory(&mut self, workspace_id: Option<&str>) {
        let persisted = self.store.workspace_id();
        if let Some(id) = &persisted {
            self.session.set_workspace_id(id);
        }

        let resolved = self
            .session
            .resolve_workspace_id(workspace_id.or(persisted.as_deref()))
            .unwrap_or_default();
        if resolved.is_empty() {
            log::warn!("No workspace id available; requesting the listing anyway");
        }

        if let Some(previous) = self.current.take() {
            log::debug!("Superseding directory request {previous}");
            self.tasks.cancel(previous);
        }

        self.loading = true;
        self.last_error = None;
        self.workspace_id = resolved.clone();

        log::info!("Loading directory for workspace '{resolved}'");
        let backend = Arc::clone(&self.backend);
        let id = self
            .tasks
            .spawn(move || backend.fetch_directory(&resolved));
        self.current = Some(id);
    }

    /// Re-issues the last failed load. Only ever called on explicit user action.
    pub fn retry(&mut self) {
        if self.last_error.is_none() {
            return;
        }
        let workspace_id = self.workspace_id.clone();
        self.load_directory(Some(&workspace_id));
    }

    /// Applies a finished listing, if any. Returns true when the registry was
    /// repopulated.
    pub fn poll(&mut self, registry: &mut ItemRegistry) -> bool {
        let mut repopulated = false;
        while let Some((id, result)) = self.tasks.try_next() {
            if self.current != Some(id) {
                continue;
            }
            self.current = None;

            match result {
                Ok(snapshot) => {
                    log::info!(
                        "Loaded {} folders and {} files",
                        snapshot.folders.len(),
                        snapshot.files.len()
                    );
                    registry.apply_snapshot(&snapshot);
                    self.loading = false;
                    repopulated = true;
                }
                Err(err) => {
                    log::error!("{err}");
                    self.last_error = Some(err);
                }
            }
        }
        repopulated
    }

    /// Drops interest in every in-flight request; late answers are discarded.
    pub fn shutdown(&mut self) {
        self.current = None;
        self.tasks.cancel_all();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_fetching(&self) -> bool {
        self.current.is_some()
    }

    pub fn last_error(&self) -> Option<&DeskError> {
        self.last_error.as_ref()
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }
}
