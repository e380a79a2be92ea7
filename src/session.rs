//! The active workspace/user identifiers, shared by handle rather than as a global.

use crate::store::WorkspaceStore;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSession {
    pub user_id: String,
    pub workspace_id: String,
}

/// Cloneable handle onto the process-wide session. Every component that needs
/// the identifiers receives one at construction time.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Rc<RefCell<WorkspaceSession>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the workspace id from persisted storage, if one is stored.
    pub fn seeded(store: &dyn WorkspaceStore) -> Self {
        let context = Self::new();
        if let Some(id) = store.workspace_id() {
            context.set_workspace_id(&id);
        }
        context
    }

    pub fn get(&self) -> WorkspaceSession {
        self.inner.borrow().clone()
    }

    pub fn set_workspace_id(&self, id: &str) {
        self.inner.borrow_mut().workspace_id = id.to_string();
    }

    pub fn set_user_id(&self, id: &str) {
        self.inner.borrow_mut().user_id = id.to_string();
    }

    /// Picks the freshest workspace id: an explicitly supplied value first,
    /// then the session's cached one. Returns `None` when neither is non-empty.
    pub fn resolve_workspace_id(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| {
                let cached = &self.inner.borrow().workspace_id;
                (!cached.is_empty()).then(|| cached.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_clones_share_state() {
        let a = SessionContext::new();
        let b = a.clone();
        a.set_workspace_id("ws-9");
        b.set_user_id("u-1");
        assert_eq!(
            a.get(),
            WorkspaceSession {
                user_id: "u-1".into(),
                workspace_id: "ws-9".into()
            }
        );
    }

    #[test]
    fn test_seeded_from_store() {
        let store = MemoryStore::with_workspace("ws-stored");
        assert_eq!(SessionContext::seeded(&store).get().workspace_id, "ws-stored");
        assert_eq!(SessionContext::seeded(&MemoryStore::default()).get().workspace_id, "");
    }

    #[test]
    fn test_explicit_id_beats_cached() {
        let session = SessionContext::new();
        session.set_workspace_id("cached");
        assert_eq!(session.resolve_workspace_id(Some("fresh")).as_deref(), Some("fresh"));
        assert_eq!(session.resolve_workspace_id(Some("")).as_deref(), Some("cached"));
        assert_eq!(session.resolve_workspace_id(None).as_deref(), Some("cached"));
        assert_eq!(SessionContext::new().resolve_workspace_id(None), None);
    }
}
