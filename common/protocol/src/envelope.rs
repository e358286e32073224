//! UI message stream envelope and the server→client / client→server
//! tagged-union message sets (spec §6).
//!
//! Every frame on the wire is `{type, payload, id?, timestamp}`; `type`
//! selects the variant below and `payload` is its associated data: one
//! outer envelope struct wrapping an inner `#[serde(tag = "type")]`
//! enum, so dispatch code can match on type without re-parsing the
//! envelope.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::buffer::Buffer;
use crate::coaching_message::CoachingMessage;
use crate::review::ReviewResult;
use crate::session::Phase;
use crate::session::Session;

/// Generic wire envelope carrying one server- or client-bound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(flatten)]
    pub message: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sender-generated, milliseconds since epoch. Not comparable across
    /// senders (spec §6).
    pub timestamp: i64,
}

impl<T> Envelope<T> {
    pub fn new(message: T) -> Self {
        Self {
            message,
            id: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Capabilities advertised by the server at handshake time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerHello {
    pub server_id: String,
    pub version: String,
    pub capabilities: Vec<String>,
}

/// Session/feature-flag state sent immediately after `connection:hello`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,
    pub capabilities: Vec<String>,
    pub feature_flags: Vec<String>,
}

/// Payload shared by the three `error:*` server messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Payload for `planning:progress`. `stage` is one of
/// `fetching|exploring|planning|writing_hints`; `progress` is `0..100`,
/// monotonically non-decreasing within a stage (spec §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningProgress {
    pub stage: String,
    pub progress: u8,
    pub message: String,
}

/// Payload for `planning:error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningError {
    pub reason: String,
    pub message: String,
}

/// All 28 server→client message types (spec §6). Variants for
/// out-of-scope surfaces (`dashboard:*`, `fs:*`, `explorer:*`, `editor:*`
/// decorations, `repos:*`, `repo:*`) carry an opaque JSON payload: this
/// process forwards/produces them at the envelope level without owning
/// their internal shape, since the collaborators that populate them
/// (UI renderer, GitHub client, dashboard data sources) are out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename = "connection:hello")]
    ConnectionHello(ServerHello),
    #[serde(rename = "connection:init")]
    ConnectionInit(ConnectionInit),
    #[serde(rename = "connection:error")]
    ConnectionError(ErrorPayload),

    #[serde(rename = "session:start")]
    SessionStart(Session),
    #[serde(rename = "session:restore")]
    SessionRestore(Session),
    #[serde(rename = "session:end")]
    SessionEnd(Session),

    #[serde(rename = "dashboard:dreyfus")]
    DashboardDreyfus(Value),
    #[serde(rename = "dashboard:stats")]
    DashboardStats(Value),
    #[serde(rename = "dashboard:in_progress")]
    DashboardInProgress(Value),
    #[serde(rename = "dashboard:issues")]
    DashboardIssues(Value),
    #[serde(rename = "dashboard:challenges")]
    DashboardChallenges(Value),
    #[serde(rename = "dashboard:materials")]
    DashboardMaterials(Value),
    #[serde(rename = "dashboard:issue")]
    DashboardIssue(Value),
    #[serde(rename = "dashboard:issues_complete")]
    DashboardIssuesComplete(Value),

    #[serde(rename = "fs:tree")]
    FsTree(Value),
    #[serde(rename = "fs:tree_update")]
    FsTreeUpdate(Value),

    #[serde(rename = "buffer:content")]
    BufferContent(Buffer),
    #[serde(rename = "save:ack")]
    SaveAck(Value),

    #[serde(rename = "explorer:hint_files")]
    ExplorerHintFiles(Value),
    #[serde(rename = "explorer:clear_hints")]
    ExplorerClearHints(Value),

    #[serde(rename = "editor:decorations")]
    EditorDecorations(Value),
    #[serde(rename = "editor:clear_decorations")]
    EditorClearDecorations(Value),

    #[serde(rename = "coaching:message")]
    CoachingMessage(CoachingMessage),
    #[serde(rename = "coaching:review_result")]
    CoachingReviewResult(ReviewResult),
    #[serde(rename = "coaching:clear")]
    CoachingClear(Value),

    #[serde(rename = "phase:transition")]
    PhaseTransition(Phase),
    #[serde(rename = "observer:nudge")]
    ObserverNudge(CoachingMessage),

    #[serde(rename = "planning:started")]
    PlanningStarted(Value),
    #[serde(rename = "planning:progress")]
    PlanningProgress(PlanningProgress),
    #[serde(rename = "planning:phase_update")]
    PlanningPhaseUpdate(Phase),
    #[serde(rename = "planning:complete")]
    PlanningComplete(Value),
    #[serde(rename = "planning:error")]
    PlanningError(PlanningError),

    #[serde(rename = "error:file_not_found")]
    ErrorFileNotFound(ErrorPayload),
    #[serde(rename = "error:permission_denied")]
    ErrorPermissionDenied(ErrorPayload),
    #[serde(rename = "error:general")]
    ErrorGeneral(ErrorPayload),

    #[serde(rename = "repos:list_response")]
    ReposListResponse(Value),
    #[serde(rename = "repo:activity")]
    RepoActivity(Value),
    #[serde(rename = "session:repo_started")]
    SessionRepoStarted(Value),
    #[serde(rename = "session:issue_selected")]
    SessionIssueSelected(Value),
}

/// Payload for `buffer:update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferUpdateRequest {
    pub path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u32>,
}

/// Payload for `user:explain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Payload for `coaching:feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingFeedback {
    pub message_id: u64,
    pub helpful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// All 23 client→server message types (spec §6). Same scoping note as
/// [`ServerMessage`] applies to out-of-scope surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename = "connection:ready")]
    ConnectionReady(Value),

    #[serde(rename = "dashboard:stats_period")]
    DashboardStatsPeriod(Value),
    #[serde(rename = "dashboard:resume_task")]
    DashboardResumeTask(Value),
    #[serde(rename = "dashboard:start_issue")]
    DashboardStartIssue(Value),

    #[serde(rename = "file:open")]
    FileOpen(Value),
    #[serde(rename = "file:close")]
    FileClose(Value),
    #[serde(rename = "file:save")]
    FileSave(Value),

    #[serde(rename = "buffer:update")]
    BufferUpdate(BufferUpdateRequest),

    #[serde(rename = "editor:cursor")]
    EditorCursor(Value),
    #[serde(rename = "editor:scroll")]
    EditorScroll(Value),
    #[serde(rename = "editor:selection")]
    EditorSelection(Value),

    #[serde(rename = "terminal:ready")]
    TerminalReady(Value),
    #[serde(rename = "terminal:input")]
    TerminalInput(Value),
    #[serde(rename = "terminal:resize")]
    TerminalResize(Value),

    #[serde(rename = "hints:level_change")]
    HintsLevelChange(Value),

    #[serde(rename = "user:explain")]
    UserExplain(ExplainRequest),
    #[serde(rename = "user:review")]
    UserReview(Value),

    #[serde(rename = "coaching:dismiss")]
    CoachingDismiss(Value),
    #[serde(rename = "coaching:feedback")]
    CoachingFeedback(CoachingFeedback),

    #[serde(rename = "user:idle_start")]
    UserIdleStart(Value),
    #[serde(rename = "user:idle_end")]
    UserIdleEnd(Value),
    #[serde(rename = "user:navigation")]
    UserNavigation(Value),

    #[serde(rename = "phase:expand_step")]
    PhaseExpandStep(Value),

    #[serde(rename = "repos:list")]
    ReposList(Value),
    #[serde(rename = "repos:activity")]
    ReposActivity(Value),

    #[serde(rename = "session:start_repo")]
    SessionStartRepo(Value),
    #[serde(rename = "session:select_issue")]
    SessionSelectIssue(Value),
}

impl ServerMessage {
    /// The wire `type` string for this variant, used for handler-map
    /// dispatch (spec §4.1).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ConnectionHello(_) => "connection:hello",
            Self::ConnectionInit(_) => "connection:init",
            Self::ConnectionError(_) => "connection:error",
            Self::SessionStart(_) => "session:start",
            Self::SessionRestore(_) => "session:restore",
            Self::SessionEnd(_) => "session:end",
            Self::DashboardDreyfus(_) => "dashboard:dreyfus",
            Self::DashboardStats(_) => "dashboard:stats",
            Self::DashboardInProgress(_) => "dashboard:in_progress",
            Self::DashboardIssues(_) => "dashboard:issues",
            Self::DashboardChallenges(_) => "dashboard:challenges",
            Self::DashboardMaterials(_) => "dashboard:materials",
            Self::DashboardIssue(_) => "dashboard:issue",
            Self::DashboardIssuesComplete(_) => "dashboard:issues_complete",
            Self::FsTree(_) => "fs:tree",
            Self::FsTreeUpdate(_) => "fs:tree_update",
            Self::BufferContent(_) => "buffer:content",
            Self::SaveAck(_) => "save:ack",
            Self::ExplorerHintFiles(_) => "explorer:hint_files",
            Self::ExplorerClearHints(_) => "explorer:clear_hints",
            Self::EditorDecorations(_) => "editor:decorations",
            Self::EditorClearDecorations(_) => "editor:clear_decorations",
            Self::CoachingMessage(_) => "coaching:message",
            Self::CoachingReviewResult(_) => "coaching:review_result",
            Self::CoachingClear(_) => "coaching:clear",
            Self::PhaseTransition(_) => "phase:transition",
            Self::ObserverNudge(_) => "observer:nudge",
            Self::PlanningStarted(_) => "planning:started",
            Self::PlanningProgress(_) => "planning:progress",
            Self::PlanningPhaseUpdate(_) => "planning:phase_update",
            Self::PlanningComplete(_) => "planning:complete",
            Self::PlanningError(_) => "planning:error",
            Self::ErrorFileNotFound(_) => "error:file_not_found",
            Self::ErrorPermissionDenied(_) => "error:permission_denied",
            Self::ErrorGeneral(_) => "error:general",
            Self::ReposListResponse(_) => "repos:list_response",
            Self::RepoActivity(_) => "repo:activity",
            Self::SessionRepoStarted(_) => "session:repo_started",
            Self::SessionIssueSelected(_) => "session:issue_selected",
        }
    }
}

impl ClientMessage {
    /// The wire `type` string for this variant, used for handler-map
    /// dispatch (spec §4.1).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ConnectionReady(_) => "connection:ready",
            Self::DashboardStatsPeriod(_) => "dashboard:stats_period",
            Self::DashboardResumeTask(_) => "dashboard:resume_task",
            Self::DashboardStartIssue(_) => "dashboard:start_issue",
            Self::FileOpen(_) => "file:open",
            Self::FileClose(_) => "file:close",
            Self::FileSave(_) => "file:save",
            Self::BufferUpdate(_) => "buffer:update",
            Self::EditorCursor(_) => "editor:cursor",
            Self::EditorScroll(_) => "editor:scroll",
            Self::EditorSelection(_) => "editor:selection",
            Self::TerminalReady(_) => "terminal:ready",
            Self::TerminalInput(_) => "terminal:input",
            Self::TerminalResize(_) => "terminal:resize",
            Self::HintsLevelChange(_) => "hints:level_change",
            Self::UserExplain(_) => "user:explain",
            Self::UserReview(_) => "user:review",
            Self::CoachingDismiss(_) => "coaching:dismiss",
            Self::CoachingFeedback(_) => "coaching:feedback",
            Self::UserIdleStart(_) => "user:idle_start",
            Self::UserIdleEnd(_) => "user:idle_end",
            Self::UserNavigation(_) => "user:navigation",
            Self::PhaseExpandStep(_) => "phase:expand_step",
            Self::ReposList(_) => "repos:list",
            Self::ReposActivity(_) => "repos:activity",
            Self::SessionStartRepo(_) => "session:start_repo",
            Self::SessionSelectIssue(_) => "session:select_issue",
        }
    }
}

/// Builds the `error:*` server message matching a [`crate::Action`]-free
/// `ui_error_kind` string from `paige-error`, per spec §7's error-broadcast
/// mapping.
pub fn error_message_for_kind(kind: &str, message: impl Into<String>, path: Option<String>) -> ServerMessage {
    let payload = ErrorPayload {
        message: message.into(),
        path,
    };
    match kind {
        "file_not_found" => ServerMessage::ErrorFileNotFound(payload),
        "permission_denied" => ServerMessage::ErrorPermissionDenied(payload),
        _ => ServerMessage::ErrorGeneral(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_serializes_with_tag_and_payload() {
        let msg = ServerMessage::ObserverNudge(CoachingMessage {
            id: 1,
            session_id: 1,
            trigger: crate::coaching_message::NudgeTrigger::Manual,
            confidence: 0.9,
            title: "t".to_string(),
            body: "b".to_string(),
            delivered_at: Utc::now(),
        });
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["type"], "observer:nudge");
        assert!(value["payload"].is_object());
    }

    #[test]
    fn envelope_round_trips() {
        let env = Envelope::new(ClientMessage::UserExplain(ExplainRequest {
            question: "why?".to_string(),
            path: None,
        }))
        .with_id("abc");
        let s = serde_json::to_string(&env).expect("serialize");
        let back: Envelope<ClientMessage> = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(back.id.as_deref(), Some("abc"));
    }

    #[test]
    fn client_message_type_name_matches_serde_tag() {
        let msg = ClientMessage::UserExplain(ExplainRequest {
            question: "why?".to_string(),
            path: None,
        });
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["type"], msg.type_name());
    }

    #[test]
    fn error_message_for_kind_maps_file_not_found() {
        let msg = error_message_for_kind("file_not_found", "missing", Some("/a.rs".to_string()));
        assert_eq!(msg.type_name(), "error:file_not_found");
    }
}
