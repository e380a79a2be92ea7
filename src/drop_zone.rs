//! Container-level file drops: upload the first dropped file and put the
//! backend's record on the desk once it answers.

use crate::backend::{DeskBackend, UploadBody, UploadRequest};
use crate::error::{DeskError, DeskResult};
use crate::item::UploadedRecord;
use crate::registry::ItemRegistry;
use crate::store::WorkspaceStore;
use crate::task::TaskSet;
use eframe::egui::{self, Pos2};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPhase {
    Idle,
    DragOver,
    Uploading,
}

/// A file handed over by the window system, by path or by content.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub name: String,
    pub path: Option<PathBuf>,
    pub bytes: Option<Arc<[u8]>>,
}

impl DroppedFile {
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            name: String::new(),
            path: Some(path),
            bytes: None,
        }
    }

    fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string()
    }

    /// Shares in-memory content or opens the file for streaming. Runs on a
    /// worker, never during the drop event.
    fn into_body(self) -> DeskResult<UploadBody> {
        if let Some(bytes) = self.bytes {
            return Ok(UploadBody::Bytes(bytes));
        }
        let path = self.path.ok_or_else(|| {
            DeskError::UploadFailure(format!("{} has neither content nor path", self.name))
        })?;
        UploadBody::open(&path)
            .map_err(|err| DeskError::UploadFailure(format!("failed to read {}: {err}", path.display())))
    }
}

impl From<&egui::DroppedFile> for DroppedFile {
    fn from(file: &egui::DroppedFile) -> Self {
        Self {
            name: file.name.clone(),
            path: file.path.clone(),
            bytes: file.bytes.clone(),
        }
    }
}

type UploadOutcome = (Uuid, DeskResult<UploadedRecord>);

pub struct DropZone {
    backend: Arc<dyn DeskBackend>,
    store: Rc<dyn WorkspaceStore>,
    tasks: TaskSet<UploadOutcome>,
    drag_over: bool,
}

impl DropZone {
    pub fn new(backend: Arc<dyn DeskBackend>, store: Rc<dyn WorkspaceStore>) -> Self {
        Self {
            backend,
            store,
            tasks: TaskSet::new(),
            drag_over: false,
        }
    }

    pub fn phase(&self) -> DropPhase {
        if !self.tasks.is_idle() {
            DropPhase::Uploading
        } else if self.drag_over {
            DropPhase::DragOver
        } else {
            DropPhase::Idle
        }
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.tasks.pending()
    }

    /// True while external files hover the container, regardless of uploads.
    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    /// Uploads the first of `files`, dropped at `at` (container coordinates).
    ///
    /// Without a persisted workspace nothing is sent and `MissingWorkspace` is
    /// returned; an empty drop is silently ignored. Returns the request id of the
    /// started upload. The file itself is only opened by the upload task, so an
    /// unreadable file surfaces from `poll`.
    pub fn drop(&mut self, files: Vec<DroppedFile>, at: Pos2) -> DeskResult<Option<Uuid>> {
        self.drag_over = false;

        let Some(workspace_id) = self.store.workspace_id() else {
            let err = DeskError::MissingWorkspace;
            log::error!("Upload aborted: {err}");
            return Err(err);
        };

        let Some(file) = files.into_iter().next() else {
            return Ok(None);
        };

        let file_name = file.display_name();
        let request_id = Uuid::new_v4();
        log::info!("[{request_id}] Uploading {file_name} to workspace {workspace_id}");

        let backend = Arc::clone(&self.backend);
        self.tasks.spawn(move || {
            let result = file.into_body().and_then(|body| {
                log::debug!("[{request_id}] Sending {} bytes", body.byte_len());
                backend.upload(UploadRequest {
                    request_id,
                    workspace_id,
                    file_name,
                    body,
                    drop_position: at,
                })
            });
            (request_id, result)
        });
        Ok(Some(request_id))
    }

    /// Appends every upload that has been acknowledged since the last poll.
    /// Returns how many items were added.
    pub fn poll(&mut self, registry: &mut ItemRegistry) -> usize {
        let mut appended = 0;
        while let Some((_, (request_id, result))) = self.tasks.try_next() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    log::error!("{err}");
                    continue;
                }
            };
            let item = record.into_canvas_item(registry.next_icon_index());
            let item_id = item.id().to_string();
            match registry.append(item) {
                Ok(()) => {
                    log::info!("[{request_id}] Uploaded {item_id}");
                    appended += 1;
                }
                Err(err) => log::error!("[{request_id}] {err}"),
            }
        }
        appended
    }

    /// Drops interest in in-flight uploads; their answers will be discarded.
    pub fn shutdown(&mut self) {
        self.tasks.cancel_all();
    }
}
