//! Permission broker gating side effects
//!
//! Mutating tools route every effect through [`PermissionBroker::request`]
//! before acting. The broker canonicalizes the target into the directory
//! boundary, applies a hard floor (paths outside both the user's home and
//! the project tree are refused without prompting), consults session grants,
//! and otherwise defers to an [`ApprovalHandler`] — typically an interactive
//! prompt in the host application.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::boundary::Boundary;

/// Outcome of an approval prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Refuse this request
    Denied,
    /// Allow this request only
    Allowed,
    /// Allow this request and remember the (operation, directory) pair
    /// for the rest of the session
    AllowedForSession,
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed | Self::AllowedForSession)
    }
}

/// What the user is being asked to approve
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    /// Human-readable operation, e.g. "Write file" or "Execute bash command"
    pub operation: String,
    /// Canonical target path
    pub path: PathBuf,
    /// Directory a session grant would cover
    pub grant_dir: PathBuf,
    /// Extra context shown to the user (e.g. the full shell command)
    pub details: Option<String>,
}

/// Answers approval requests. Implemented by the embedding application;
/// test doubles live in [`crate::test_utils`].
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn prompt(&self, request: &ApprovalRequest) -> PermissionDecision;
}

/// Gates every mutating operation against the directory boundary.
///
/// Session grants are keyed by (operation, directory) and held only in
/// memory — nothing persists across broker instances.
pub struct PermissionBroker {
    boundary: RwLock<Boundary>,
    grants: Mutex<HashSet<(String, PathBuf)>>,
    approver: Arc<dyn ApprovalHandler>,
}

impl PermissionBroker {
    pub fn new(boundary: Boundary, approver: Arc<dyn ApprovalHandler>) -> Self {
        Self {
            boundary: RwLock::new(boundary),
            grants: Mutex::new(HashSet::new()),
            approver,
        }
    }

    /// Canonicalize a requested path into the boundary. Never fails.
    pub fn canonicalize(&self, requested: &Path) -> PathBuf {
        self.boundary.read().canonicalize(requested)
    }

    /// Canonicalize without the rebase: `Err` carries where the path
    /// actually resolved when that is outside the boundary.
    pub fn canonicalize_strict(&self, requested: &Path) -> Result<PathBuf, PathBuf> {
        self.boundary.read().canonicalize_strict(requested)
    }

    /// The current working directory paths resolve against
    pub fn working_dir(&self) -> PathBuf {
        self.boundary.read().working_dir().to_path_buf()
    }

    /// Rebind the working directory. Grants are untouched; every later
    /// request re-resolves against the new boundary.
    pub fn set_working_dir(&self, working_dir: impl AsRef<Path>) -> std::io::Result<()> {
        self.boundary.write().set_working_dir(working_dir)
    }

    /// Ask whether `operation` may act on `requested`.
    ///
    /// The path is canonicalized first, so the decision applies to where the
    /// effect actually lands. Order: hard floor, then session grants, then
    /// the approval handler. An `AllowedForSession` answer is recorded
    /// before it is returned.
    pub async fn request(
        &self,
        operation: &str,
        requested: &Path,
        details: Option<String>,
    ) -> PermissionDecision {
        let (path, grant_dir, floor_ok) = {
            let boundary = self.boundary.read();
            let path = boundary.canonicalize(requested);
            let floor_ok = boundary.within_home(&path) || boundary.within_project(&path);
            (path, boundary.grant_dir().to_path_buf(), floor_ok)
        };

        // Hard floor: outside both home and project there is nothing the
        // user could meaningfully approve.
        if !floor_ok {
            return PermissionDecision::Denied;
        }

        let key = (operation.to_string(), grant_dir.clone());
        if path.starts_with(&grant_dir) && self.grants.lock().contains(&key) {
            return PermissionDecision::Allowed;
        }

        let request = ApprovalRequest {
            operation: operation.to_string(),
            path,
            grant_dir,
            details,
        };
        let decision = self.approver.prompt(&request).await;
        if decision == PermissionDecision::AllowedForSession {
            self.grants.lock().insert(key);
        }
        decision
    }
}

impl std::fmt::Debug for PermissionBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionBroker")
            .field("boundary", &*self.boundary.read())
            .field("grants", &self.grants.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingApprover, ScriptedApprover};
    use tempfile::TempDir;

    fn broker_with(
        work: &TempDir,
        home: &TempDir,
        approver: Arc<dyn ApprovalHandler>,
    ) -> PermissionBroker {
        let boundary = Boundary::with_dirs(
            work.path().canonicalize().unwrap(),
            Some(work.path().canonicalize().unwrap()),
            home.path().canonicalize().unwrap(),
        );
        PermissionBroker::new(boundary, approver)
    }

    #[tokio::test]
    async fn test_allowed_decision_is_not_remembered() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(CountingApprover::new(PermissionDecision::Allowed));
        let broker = broker_with(&work, &home, approver.clone());

        let d1 = broker
            .request("Write file", Path::new("a.txt"), None)
            .await;
        let d2 = broker
            .request("Write file", Path::new("b.txt"), None)
            .await;
        assert_eq!(d1, PermissionDecision::Allowed);
        assert_eq!(d2, PermissionDecision::Allowed);
        // One-shot approvals prompt every time.
        assert_eq!(approver.prompts(), 2);
    }

    #[tokio::test]
    async fn test_session_grant_skips_later_prompts() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(CountingApprover::new(
            PermissionDecision::AllowedForSession,
        ));
        let broker = broker_with(&work, &home, approver.clone());

        broker
            .request("Write file", Path::new("a.txt"), None)
            .await;
        let d2 = broker
            .request("Write file", Path::new("nested/b.txt"), None)
            .await;
        assert_eq!(d2, PermissionDecision::Allowed);
        assert_eq!(approver.prompts(), 1);
    }

    #[tokio::test]
    async fn test_grant_is_per_operation() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(CountingApprover::new(
            PermissionDecision::AllowedForSession,
        ));
        let broker = broker_with(&work, &home, approver.clone());

        broker
            .request("Write file", Path::new("a.txt"), None)
            .await;
        broker
            .request("Delete file", Path::new("a.txt"), None)
            .await;
        // Different operation, separate grant, separate prompt.
        assert_eq!(approver.prompts(), 2);
    }

    #[tokio::test]
    async fn test_denied_outside_home_and_project_without_prompt() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(CountingApprover::new(PermissionDecision::Allowed));
        // No project dir; working dir is outside home, so only home passes
        // the floor. Use a boundary where working_dir is outside home and
        // there is no project dir.
        let boundary = Boundary::with_dirs(
            work.path().canonicalize().unwrap(),
            None,
            home.path().canonicalize().unwrap(),
        );
        let broker = PermissionBroker::new(boundary, approver.clone());

        // Traversal rebases into the working dir, which is outside home
        // and there is no project dir, so the floor refuses it outright.
        let d = broker
            .request("Write file", Path::new("anything.txt"), None)
            .await;
        assert_eq!(d, PermissionDecision::Denied);
        assert_eq!(approver.prompts(), 0);
    }

    #[tokio::test]
    async fn test_denied_decision_is_not_cached() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(ScriptedApprover::new(vec![
            PermissionDecision::Denied,
            PermissionDecision::Allowed,
        ]));
        let broker = broker_with(&work, &home, approver);

        let d1 = broker
            .request("Write file", Path::new("a.txt"), None)
            .await;
        let d2 = broker
            .request("Write file", Path::new("a.txt"), None)
            .await;
        assert_eq!(d1, PermissionDecision::Denied);
        assert_eq!(d2, PermissionDecision::Allowed);
    }

    #[tokio::test]
    async fn test_request_resolves_traversal_before_deciding() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let approver = Arc::new(CountingApprover::new(PermissionDecision::Allowed));
        let broker = broker_with(&work, &home, approver.clone());

        broker
            .request("Write file", Path::new("../../etc/passwd"), None)
            .await;
        let request = approver.last_request().unwrap();
        // The prompt shows the rebased path the effect would land on.
        assert!(request.path.starts_with(work.path().canonicalize().unwrap()));
        assert!(request.path.ends_with("passwd"));
    }
}
