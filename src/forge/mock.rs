//! forge::mock
//!
//! Mock provisioner and remote shell for deterministic testing.
//!
//! # Design
//!
//! [`MockProvisioner`] records every request and answers with a fixed push
//! URL or a configured failure. [`RecordingShell`] records `(host, script)`
//! pairs so tests can assert on the exact remote command without ssh.
//!
//! # Example
//!
//! ```
//! use mkgit::core::types::{TargetDescriptor, Visibility};
//! use mkgit::forge::mock::MockProvisioner;
//! use mkgit::forge::{ProvisionRequest, Provisioner};
//!
//! # tokio_test::block_on(async {
//! let provisioner = MockProvisioner::new("ssh://example.org/srv/git/tool.git");
//!
//! let result = provisioner.provision(&ProvisionRequest {
//!     target: TargetDescriptor::new("/tmp/tool"),
//!     visibility: Visibility::Public,
//!     description: None,
//!     fork: false,
//!     origin_url: None,
//! }).await.unwrap();
//!
//! assert_eq!(result.push_url, "ssh://example.org/srv/git/tool.git");
//! assert_eq!(provisioner.requests().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::ssh::RemoteShell;
use super::traits::{ForgeError, ProvisionRequest, Provisioner};
use crate::core::types::ProvisionResult;

/// Failure a [`MockProvisioner`] should report.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Non-2xx from a hosting API.
    Api { status: u16, message: String },
    /// Non-zero exit from the remote shell.
    Shell(String),
}

impl MockFailure {
    fn to_error(&self) -> ForgeError {
        match self {
            MockFailure::Api { status, message } => ForgeError::ApiError {
                status: *status,
                message: message.clone(),
            },
            MockFailure::Shell(stderr) => ForgeError::RemoteShellFailure {
                host: "mock".to_string(),
                status: "exit 1".to_string(),
                stderr: stderr.clone(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct MockProvisionerInner {
    push_url: String,
    fail_with: Option<MockFailure>,
    requests: Vec<ProvisionRequest>,
}

/// Mock provisioner for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockProvisioner {
    inner: Arc<Mutex<MockProvisionerInner>>,
}

impl MockProvisioner {
    /// A provisioner that succeeds with `push_url`.
    pub fn new(push_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockProvisionerInner {
                push_url: push_url.into(),
                ..Default::default()
            })),
        }
    }

    /// Fail every call with `failure`.
    pub fn fail_with(self, failure: MockFailure) -> Self {
        self.lock().fail_with = Some(failure);
        self
    }

    /// Requests received, in order.
    pub fn requests(&self) -> Vec<ProvisionRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockProvisionerInner> {
        self.inner.lock().expect("mock provisioner lock poisoned")
    }
}

#[async_trait]
impl Provisioner for MockProvisioner {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());
        if let Some(failure) = &inner.fail_with {
            return Err(failure.to_error());
        }
        Ok(ProvisionResult {
            push_url: inner.push_url.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct RecordingShellInner {
    calls: Vec<(String, String)>,
    fail_with: Option<String>,
}

/// [`RemoteShell`] that records calls instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingShell {
    inner: Arc<Mutex<RecordingShellInner>>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shell whose every call fails with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        let shell = Self::default();
        shell.lock().fail_with = Some(stderr.to_string());
        shell
    }

    /// Recorded `(host, script)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingShellInner> {
        self.inner.lock().expect("recording shell lock poisoned")
    }
}

impl RemoteShell for RecordingShell {
    fn run(&self, host: &str, script: &str) -> Result<(), ForgeError> {
        let mut inner = self.lock();
        inner.calls.push((host.to_string(), script.to_string()));
        match &inner.fail_with {
            Some(stderr) => Err(ForgeError::RemoteShellFailure {
                host: host.to_string(),
                status: "exit 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}
