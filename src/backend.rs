//! HTTP transport to the workspace service.

use crate::config::AppConfig;
use crate::error::{DeskError, DeskResult};
use crate::item::{DirectorySnapshot, RemoteSnapshot, UploadedRecord};
use eframe::egui::Pos2;
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// File content for an upload. Streamed into the request body, never copied.
pub enum UploadBody {
    Bytes(Arc<[u8]>),
    File { file: File, len: u64 },
}

impl UploadBody {
    /// Opens `path` for streaming. Only regular files can be uploaded.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        Ok(Self::File {
            file,
            len: metadata.len(),
        })
    }

    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::File { len, .. } => *len,
        }
    }

    fn into_part(self) -> multipart::Part {
        match self {
            Self::Bytes(bytes) => {
                let len = bytes.len() as u64;
                multipart::Part::reader_with_length(Cursor::new(bytes), len)
            }
            Self::File { file, len } => multipart::Part::reader_with_length(file, len),
        }
    }
}

/// A single-file upload.
pub struct UploadRequest {
    pub request_id: Uuid,
    pub workspace_id: String,
    pub file_name: String,
    pub body: UploadBody,
    /// Where the file was dropped, relative to the container.
    pub drop_position: Pos2,
}

/// The remote calls the desk makes. Implementations block; callers run them
/// off the UI thread.
pub trait DeskBackend: Send + Sync {
    fn fetch_directory(&self, workspace_id: &str) -> DeskResult<DirectorySnapshot>;

    fn upload(&self, request: UploadRequest) -> DeskResult<UploadedRecord>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> DeskResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| DeskError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }
}

impl DeskBackend for HttpBackend {
    fn fetch_directory(&self, workspace_id: &str) -> DeskResult<DirectorySnapshot> {
        let response = self
            .client
            .get(self.url("get-directory"))
            .query(&[("folder_id", workspace_id)])
            .send()
            .map_err(|err| DeskError::LoadFailure(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(DeskError::LoadFailure(format!(
                "get-directory answered {}",
                response.status()
            )));
        }

        let remote: RemoteSnapshot = response
            .json()
            .map_err(|err| DeskError::LoadFailure(format!("bad listing body: {err}")))?;
        Ok(remote.into())
    }

    fn upload(&self, request: UploadRequest) -> DeskResult<UploadedRecord> {
        let UploadRequest {
            request_id,
            workspace_id,
            file_name,
            body,
            drop_position,
        } = request;

        let form = multipart::Form::new()
            .part("file", body.into_part().file_name(file_name))
            .text("folder_id", workspace_id)
            .text("x_coordinate", drop_position.x.to_string())
            .text("y_coordinate", drop_position.y.to_string());

        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .map_err(|err| DeskError::UploadFailure(format!("[{request_id}] {err}")))?;

        if response.status() != StatusCode::OK {
            return Err(DeskError::UploadFailure(format!(
                "[{request_id}] upload answered {}",
                response.status()
            )));
        }

        response
            .json()
            .map_err(|err| DeskError::UploadFailure(format!("[{request_id}] bad upload body: {err}")))
    }
}

/// Stands in when no HTTP client could be built; every call fails with the
/// original reason so the UI can still show it.
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(err: &DeskError) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

impl DeskBackend for UnavailableBackend {
    fn fetch_directory(&self, _workspace_id: &str) -> DeskResult<DirectorySnapshot> {
        Err(DeskError::LoadFailure(self.reason.clone()))
    }

    fn upload(&self, request: UploadRequest) -> DeskResult<UploadedRecord> {
        Err(DeskError::UploadFailure(format!(
            "[{}] {}",
            request.request_id, self.reason
        )))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::io::Read;
    use std::sync::Mutex;

    /// What an upload carried, with its body drained.
    #[derive(Debug, Clone)]
    pub struct RecordedUpload {
        pub workspace_id: String,
        pub file_name: String,
        pub bytes: Vec<u8>,
        pub drop_position: Pos2,
    }

    /// Scripted backend: answers calls in order and records what it was asked.
    /// Listings are scripted per workspace id.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        listings: Arc<Mutex<HashMap<String, VecDeque<DeskResult<DirectorySnapshot>>>>>,
        uploads: Arc<Mutex<VecDeque<DeskResult<UploadedRecord>>>>,
        fetched: Arc<Mutex<Vec<String>>>,
        uploaded: Arc<Mutex<Vec<RecordedUpload>>>,
    }

    impl FakeBackend {
        pub fn push_listing(&self, workspace_id: &str, result: DeskResult<DirectorySnapshot>) {
            self.listings
                .lock()
                .unwrap()
                .entry(workspace_id.to_string())
                .or_default()
                .push_back(result);
        }

        pub fn push_upload(&self, result: DeskResult<UploadedRecord>) {
            self.uploads.lock().unwrap().push_back(result);
        }

        pub fn fetch_calls(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }

        pub fn upload_calls(&self) -> Vec<RecordedUpload> {
            self.uploaded.lock().unwrap().clone()
        }
    }

    impl DeskBackend for FakeBackend {
        fn fetch_directory(&self, workspace_id: &str) -> DeskResult<DirectorySnapshot> {
            self.fetched.lock().unwrap().push(workspace_id.to_string());
            self.listings
                .lock()
                .unwrap()
                .get_mut(workspace_id)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(DeskError::LoadFailure("no scripted listing".into())))
        }

        fn upload(&self, request: UploadRequest) -> DeskResult<UploadedRecord> {
            let bytes = match request.body {
                UploadBody::Bytes(bytes) => bytes.to_vec(),
                UploadBody::File { mut file, .. } => {
                    let mut bytes = Vec::new();
                    file.read_to_end(&mut bytes).unwrap();
                    bytes
                }
            };
            self.uploaded.lock().unwrap().push(RecordedUpload {
                workspace_id: request.workspace_id,
                file_name: request.file_name,
                bytes,
                drop_position: request.drop_position,
            });
            self.uploads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DeskError::UploadFailure("no scripted upload".into())))
        }
    }

    pub fn record(id: &str, name: &str, x: f64, y: f64) -> UploadedRecord {
        UploadedRecord {
            id: id.to_string(),
            name: name.to_string(),
            x: Some(x),
            y: Some(y),
            icon: None,
        }
    }
}
