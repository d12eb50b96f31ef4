//! Editor session: one open document, its three text/structured buffers, and
//! the edit-intake state machine that keeps them in step.
//!
//! Every edit goes through the same pipeline: convert the originating view's
//! input to a candidate, validate it, and only on success replace the
//! canonical document and regenerate every buffer from it. A failed edit
//! leaves the canonical document untouched and only the originating buffer
//! shows the user's input.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::convert::{self, ConvertError};
use crate::document::path::FieldPath;
use crate::document::Resume;
use crate::models::document::{DocumentPatch, DocumentRow};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::preview::Preview;
use crate::render::{
    self, apply_array_mutation, ArrayMutation, ArrayMutationError, FieldChange, RenderedForm,
    UiSchemaNode,
};
use crate::schema::resume_schema;
use crate::validation::{format_errors, validate_candidate, FieldError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Form,
    Json,
    Yaml,
    Schema,
    Upload,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::Form => "form",
            ViewMode::Json => "json",
            ViewMode::Yaml => "yaml",
            ViewMode::Schema => "schema",
            ViewMode::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Clean,
    DirtyValid,
    DirtyInvalid,
    Saving,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditPayload {
    /// Full buffer contents from the JSON or YAML view.
    Text { text: String },
    /// Raw widget input, coerced by the control bound to `path`.
    FieldInput { path: FieldPath, input: Value },
    FieldChange(FieldChange),
    Array { path: FieldPath, mutation: ArrayMutation },
    /// An already-structured candidate (form submit, upload result).
    Object { value: Value },
}

impl EditPayload {
    fn name(&self) -> &'static str {
        match self {
            EditPayload::Text { .. } => "text",
            EditPayload::FieldInput { .. } => "field_input",
            EditPayload::FieldChange(_) => "field_change",
            EditPayload::Array { .. } => "array",
            EditPayload::Object { .. } => "object",
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The schema view is read-only")]
    ReadOnlyView,

    #[error("The {view} view does not accept {payload} edits")]
    PayloadMismatch { view: ViewMode, payload: &'static str },

    #[error("No control is bound to '{0}'")]
    NoControl(FieldPath),

    #[error("Stored document is not valid:\n{0}")]
    InvalidStoredDocument(String),

    #[error("Nothing to save (status: {0:?})")]
    NothingToSave(SessionStatus),

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("Save ticket for revision {0} is not the save in flight")]
    StaleTicket(u64),

    #[error(transparent)]
    Array(#[from] ArrayMutationError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Why the last edit was not applied. Cleared by the next accepted edit.
#[derive(Debug, Clone, PartialEq)]
enum PendingError {
    Syntax(String),
    Schema(Vec<FieldError>),
    Input(String),
}

impl PendingError {
    fn message(&self) -> String {
        match self {
            PendingError::Syntax(msg) | PendingError::Input(msg) => msg.clone(),
            PendingError::Schema(errors) => format_errors(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub applied: bool,
    pub status: SessionStatus,
    pub revision: u64,
}

/// Snapshot of what a save writes, taken when the save starts.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub revision: u64,
    pub data: Value,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub title_dirty: bool,
    pub template: String,
    pub status: SessionStatus,
    pub view: ViewMode,
    pub revision: u64,
    pub json_text: String,
    pub yaml_text: String,
    pub form_data: Value,
    pub error: Option<String>,
    pub errors: Vec<FieldError>,
    pub last_save_error: Option<String>,
    pub last_saved_at: DateTime<Utc>,
}

pub struct EditorSession {
    id: Uuid,
    document_id: Uuid,
    owner: Uuid,
    title: String,
    persisted_title: String,
    template: String,
    document: Resume,
    json_text: String,
    yaml_text: String,
    form_data: Value,
    view: ViewMode,
    ui_schema: Option<UiSchemaNode>,
    validation: ValidationResult,
    pending: Option<PendingError>,
    revision: u64,
    persisted_revision: u64,
    saving: Option<u64>,
    last_save_error: Option<String>,
    last_saved_at: DateTime<Utc>,
}

impl EditorSession {
    /// Opens a session over a stored row. The stored body must be valid.
    pub fn open(id: Uuid, row: DocumentRow) -> Result<Self, SessionError> {
        let validation = validate_candidate(&row.data);
        if let Some(message) = validation.formatted() {
            warn!("Refusing to open document {}: stored data is invalid", row.id);
            return Err(SessionError::InvalidStoredDocument(message));
        }
        let document = convert::candidate_to_document(row.data)?;

        let mut session = Self {
            id,
            document_id: row.id,
            owner: row.user_id,
            persisted_title: row.title.clone(),
            title: row.title,
            template: row.template,
            document,
            json_text: String::new(),
            yaml_text: String::new(),
            form_data: Value::Null,
            view: ViewMode::Form,
            ui_schema: None,
            validation,
            pending: None,
            revision: 0,
            persisted_revision: 0,
            saving: None,
            last_save_error: None,
            last_saved_at: row.updated_at,
        };
        session.regenerate_buffers()?;
        info!("Opened editor session {id} for document {}", session.document_id);
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn document(&self) -> &Resume {
        &self.document
    }

    pub fn json_text(&self) -> &str {
        &self.json_text
    }

    pub fn yaml_text(&self) -> &str {
        &self.yaml_text
    }

    pub fn form_data(&self) -> &Value {
        &self.form_data
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn status(&self) -> SessionStatus {
        if self.saving.is_some() {
            SessionStatus::Saving
        } else if self.pending.is_some() {
            SessionStatus::DirtyInvalid
        } else if self.revision != self.persisted_revision {
            SessionStatus::DirtyValid
        } else {
            SessionStatus::Clean
        }
    }

    /// The user-facing error for the last rejected edit, if any.
    pub fn error_message(&self) -> Option<String> {
        self.pending.as_ref().map(PendingError::message)
    }

    /// Only changes which buffer is visible; never re-validates.
    pub fn set_view(&mut self, view: ViewMode) {
        debug!("Session {}: view {} -> {view}", self.id, self.view);
        self.view = view;
    }

    pub fn set_ui_schema(&mut self, ui: Option<UiSchemaNode>) {
        self.ui_schema = ui;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Edit intake
    // ────────────────────────────────────────────────────────────────────────

    pub fn edit(&mut self, view: ViewMode, payload: EditPayload) -> Result<EditOutcome, SessionError> {
        let schema = resume_schema();
        let mismatch = |payload: &EditPayload| SessionError::PayloadMismatch {
            view,
            payload: payload.name(),
        };

        let candidate = match (view, payload) {
            (ViewMode::Schema, _) => return Err(SessionError::ReadOnlyView),
            (ViewMode::Json, EditPayload::Text { text }) => {
                let parsed = convert::json_text_to_candidate(&text);
                self.json_text = text;
                parsed.map_err(|e| PendingError::Syntax(e.to_string()))
            }
            (ViewMode::Yaml, EditPayload::Text { text }) => {
                let parsed = convert::yaml_text_to_candidate(&text);
                self.yaml_text = text;
                parsed.map_err(|e| PendingError::Syntax(e.to_string()))
            }
            (ViewMode::Form, EditPayload::FieldInput { path, input }) => {
                let field = schema
                    .at_path(&path)
                    .ok_or_else(|| SessionError::NoControl(path.clone()))?;
                let control = render::control_for_path(
                    render::default_registry(),
                    schema,
                    self.ui_schema.as_ref(),
                    &self.form_data,
                    &path,
                )
                .ok_or_else(|| SessionError::NoControl(path.clone()))?;
                match control.emit_change(field, &path, &input) {
                    Ok(change) => self.form_candidate(|data| change.apply(data).map_err(Into::into))?,
                    Err(rejected) => Err(PendingError::Input(rejected.to_string())),
                }
            }
            (ViewMode::Form, EditPayload::FieldChange(change)) => {
                self.form_candidate(|data| change.apply(data).map_err(Into::into))?
            }
            (ViewMode::Form, EditPayload::Array { path, mutation }) => {
                self.form_candidate(|data| apply_array_mutation(schema, data, &path, &mutation))?
            }
            (ViewMode::Form | ViewMode::Upload, EditPayload::Object { value }) => Ok(value),
            (_, other) => return Err(mismatch(&other)),
        };

        match candidate {
            Ok(value) => self.intake(view, value),
            Err(pending) => {
                debug!("Session {}: {view} edit rejected before validation", self.id);
                self.pending = Some(pending);
                Ok(self.outcome(false))
            }
        }
    }

    /// Applies a structural change to a copy of the form buffer.
    fn form_candidate(
        &self,
        change: impl FnOnce(&mut Value) -> Result<(), ArrayMutationError>,
    ) -> Result<Result<Value, PendingError>, SessionError> {
        let mut next = self.form_data.clone();
        change(&mut next)?;
        Ok(Ok(next))
    }

    fn intake(&mut self, view: ViewMode, candidate: Value) -> Result<EditOutcome, SessionError> {
        let validation = validate_candidate(&candidate);
        if !validation.is_valid() {
            debug!(
                "Session {}: {view} edit failed validation with {} error(s)",
                self.id,
                validation.errors().len()
            );
            self.pending = Some(PendingError::Schema(validation.errors().to_vec()));
            self.validation = validation;
            if view == ViewMode::Form {
                self.form_data = candidate;
            }
            return Ok(self.outcome(false));
        }

        self.document = convert::candidate_to_document(candidate)?;
        self.validation = validation;
        self.pending = None;
        self.revision += 1;
        self.regenerate_buffers()?;
        Ok(self.outcome(true))
    }

    fn regenerate_buffers(&mut self) -> Result<(), ConvertError> {
        self.json_text = convert::document_to_json_text(&self.document)?;
        self.yaml_text = convert::document_to_yaml_text(&self.document)?;
        self.form_data = convert::document_to_value(&self.document)?;
        Ok(())
    }

    fn outcome(&self, applied: bool) -> EditOutcome {
        EditOutcome {
            applied,
            status: self.status(),
            revision: self.revision,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Saving
    // ────────────────────────────────────────────────────────────────────────

    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        if self.saving.is_some() {
            return Err(SessionError::SaveInFlight);
        }
        // A rejected edit after accepted ones does not block saving them.
        if self.revision == self.persisted_revision {
            return Err(SessionError::NothingToSave(self.status()));
        }
        let ticket = SaveTicket {
            revision: self.revision,
            data: convert::document_to_value(&self.document)?,
            preview: Preview::from_document(&self.document).to_markdown(),
        };
        self.saving = Some(ticket.revision);
        self.last_save_error = None;
        Ok(ticket)
    }

    /// Settles the save started by `ticket`. A failure keeps every local
    /// edit and is returned so the caller can surface it.
    pub fn complete_save(
        &mut self,
        ticket: &SaveTicket,
        result: Result<DocumentRow, PersistenceError>,
    ) -> Result<(), SessionError> {
        if self.saving != Some(ticket.revision) {
            return Err(SessionError::StaleTicket(ticket.revision));
        }
        self.saving = None;
        match result {
            Ok(row) => {
                self.persisted_revision = ticket.revision;
                self.last_saved_at = row.updated_at;
                info!(
                    "Session {}: saved revision {} of document {}",
                    self.id, ticket.revision, self.document_id
                );
                Ok(())
            }
            Err(e) => {
                warn!("Session {}: save of revision {} failed: {e}", self.id, ticket.revision);
                self.last_save_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn save(&mut self, gateway: &dyn PersistenceGateway) -> Result<(), SessionError> {
        let ticket = self.begin_save()?;
        let patch = DocumentPatch::body(ticket.data.clone(), ticket.preview.clone());
        let result = gateway.update_row(self.owner, self.document_id, patch).await;
        self.complete_save(&ticket, result)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Title (saved independently of the body)
    // ────────────────────────────────────────────────────────────────────────

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn title_dirty(&self) -> bool {
        self.title != self.persisted_title
    }

    /// Records the outcome of writing `title`. A rename made while the write
    /// was in flight stays dirty.
    pub fn complete_title_save(
        &mut self,
        title: &str,
        result: Result<DocumentRow, PersistenceError>,
    ) -> Result<(), SessionError> {
        result?;
        self.persisted_title = title.to_string();
        Ok(())
    }

    pub async fn save_title(&mut self, gateway: &dyn PersistenceGateway) -> Result<(), SessionError> {
        let title = self.title.clone();
        let result = gateway
            .update_row(self.owner, self.document_id, DocumentPatch::title(title.clone()))
            .await;
        self.complete_title_save(&title, result)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Projections
    // ────────────────────────────────────────────────────────────────────────

    pub fn render_form(&self) -> RenderedForm {
        render::render_form(
            render::default_registry(),
            resume_schema(),
            self.ui_schema.as_ref(),
            &self.form_data,
            &self.validation,
        )
    }

    pub fn preview(&self) -> Preview {
        Preview::from_document(&self.document)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            document_id: self.document_id,
            title: self.title.clone(),
            title_dirty: self.title_dirty(),
            template: self.template.clone(),
            status: self.status(),
            view: self.view,
            revision: self.revision,
            json_text: self.json_text.clone(),
            yaml_text: self.yaml_text.clone(),
            form_data: self.form_data.clone(),
            error: self.error_message(),
            errors: self.validation.errors().to_vec(),
            last_save_error: self.last_save_error.clone(),
            last_saved_at: self.last_saved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::NewDocument;
    use crate::persistence::memory::MemoryGateway;
    use serde_json::json;

    fn row(data: Value) -> DocumentRow {
        DocumentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "My CV".into(),
            template: "default".into(),
            data,
            preview: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session(data: Value) -> EditorSession {
        EditorSession::open(Uuid::new_v4(), row(data)).unwrap()
    }

    fn text(t: &str) -> EditPayload {
        EditPayload::Text { text: t.to_string() }
    }

    #[test]
    fn test_open_builds_all_buffers() {
        let s = session(json!({"basics": {"name": "A"}}));
        assert_eq!(s.status(), SessionStatus::Clean);
        assert_eq!(s.json_text(), "{\n  \"basics\": {\n    \"name\": \"A\"\n  }\n}");
        assert_eq!(s.yaml_text(), "basics:\n  name: A\n");
        assert_eq!(s.form_data(), &json!({"basics": {"name": "A"}}));
    }

    #[test]
    fn test_open_refuses_invalid_stored_data() {
        let err = EditorSession::open(Uuid::new_v4(), row(json!({"basics": {}}))).err().unwrap();
        assert!(matches!(err, SessionError::InvalidStoredDocument(msg) if msg == "basics.name: Required"));
    }

    #[test]
    fn test_invalid_edit_keeps_canonical_document() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        let before = s.document().clone();

        let outcome = s.edit(ViewMode::Json, text("{\"basics\": {}}")).unwrap();
        assert!(!outcome.applied);
        assert_eq!(outcome.status, SessionStatus::DirtyInvalid);
        assert_eq!(s.document(), &before);
        assert_eq!(s.error_message().as_deref(), Some("basics.name: Required"));
        assert_eq!(s.json_text(), "{\"basics\": {}}");
        assert_eq!(s.yaml_text(), "basics:\n  name: A\n");
        assert!(s
            .validation()
            .errors()
            .iter()
            .any(|e| e.path.to_string() == "basics.name"));
    }

    #[test]
    fn test_syntax_error_leaves_document_byte_identical() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        let before = convert::document_to_json_text(s.document()).unwrap();
        let garbage = "{\"basics\": {\"name\": ";
        s.edit(ViewMode::Json, text(garbage)).unwrap();

        assert_eq!(convert::document_to_json_text(s.document()).unwrap(), before);
        assert_eq!(s.json_text(), garbage);
        assert_eq!(s.status(), SessionStatus::DirtyInvalid);
        assert!(s.error_message().unwrap().starts_with("Invalid JSON format"));
    }

    #[test]
    fn test_valid_yaml_edit_syncs_every_view() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        s.edit(ViewMode::Json, text("not json")).unwrap();

        let outcome = s
            .edit(ViewMode::Yaml, text("basics:\n  name: Grace\n  label: Admiral\n"))
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.status, SessionStatus::DirtyValid);
        assert_eq!(s.document().basics.name, "Grace");
        assert!(s.json_text().contains("\"label\": \"Admiral\""));
        assert_eq!(s.form_data()["basics"]["label"], json!("Admiral"));
        assert_eq!(s.error_message(), None);
    }

    #[test]
    fn test_schema_view_is_read_only_and_mismatches_are_rejected() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        assert!(matches!(
            s.edit(ViewMode::Schema, text("{}")),
            Err(SessionError::ReadOnlyView)
        ));
        assert!(matches!(
            s.edit(ViewMode::Json, EditPayload::Object { value: json!({}) }),
            Err(SessionError::PayloadMismatch { .. })
        ));
        assert_eq!(s.status(), SessionStatus::Clean);
    }

    #[test]
    fn test_switching_view_does_not_revalidate() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        s.edit(ViewMode::Yaml, text("basics: [")).unwrap();
        let error = s.error_message();
        s.set_view(ViewMode::Form);
        s.set_view(ViewMode::Json);
        assert_eq!(s.view(), ViewMode::Json);
        assert_eq!(s.error_message(), error);
        assert_eq!(s.status(), SessionStatus::DirtyInvalid);
    }

    #[test]
    fn test_form_field_input_and_clear() {
        let mut s = session(json!({"basics": {"name": "A", "label": "Dev"}}));
        let label: FieldPath = "basics.label".parse().unwrap();
        let outcome = s
            .edit(
                ViewMode::Form,
                EditPayload::FieldInput { path: label.clone(), input: json!("") },
            )
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(s.document().basics.label, None);

        // clearing a required field is kept in the form buffer but not applied
        let name: FieldPath = "basics.name".parse().unwrap();
        let outcome = s
            .edit(ViewMode::Form, EditPayload::FieldInput { path: name, input: json!("") })
            .unwrap();
        assert!(!outcome.applied);
        assert_eq!(s.document().basics.name, "A");
        assert_eq!(s.form_data(), &json!({"basics": {}}));
        assert_eq!(s.error_message().as_deref(), Some("basics.name: Required"));
    }

    #[test]
    fn test_clearing_array_entry_keeps_its_slot() {
        let mut s = session(json!({
            "basics": {"name": "A"},
            "work": [{
                "company": "X",
                "position": "P",
                "startDate": "2020",
                "highlights": ["one", "two", "three"]
            }]
        }));
        let outcome = s
            .edit(
                ViewMode::Form,
                EditPayload::FieldInput {
                    path: "work[0].highlights[1]".parse().unwrap(),
                    input: json!(""),
                },
            )
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(
            s.form_data()["work"][0]["highlights"],
            json!(["one", "", "three"])
        );

        let err = s
            .edit(
                ViewMode::Form,
                EditPayload::FieldChange(FieldChange {
                    path: "work[0].highlights[2]".parse().unwrap(),
                    value: None,
                }),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Array(ArrayMutationError::Path(_))));
        assert_eq!(s.form_data()["work"][0]["highlights"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_array_add_and_remove_through_form() {
        let mut s = session(json!({
            "basics": {"name": "A"},
            "work": [{"company": "X", "position": "P", "startDate": "2020"}]
        }));
        let work: FieldPath = "work".parse().unwrap();
        s.edit(
            ViewMode::Form,
            EditPayload::Array { path: work.clone(), mutation: ArrayMutation::Add },
        )
        .unwrap();
        let entries = s.document().work.as_ref().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].company, "");

        let err = s
            .edit(
                ViewMode::Form,
                EditPayload::Array {
                    path: work.clone(),
                    mutation: ArrayMutation::Remove { index: 0, confirmed: false },
                },
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Array(ArrayMutationError::Unconfirmed { .. })));

        s.edit(
            ViewMode::Form,
            EditPayload::Array {
                path: work,
                mutation: ArrayMutation::Remove { index: 0, confirmed: true },
            },
        )
        .unwrap();
        assert_eq!(s.document().work.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_widget_input_is_surfaced() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        let outcome = s
            .edit(
                ViewMode::Form,
                EditPayload::FieldInput { path: "basics.name".parse().unwrap(), input: json!(42) },
            )
            .unwrap();
        assert!(!outcome.applied);
        assert_eq!(s.error_message().as_deref(), Some("basics.name: Expected text"));
    }

    #[tokio::test]
    async fn test_save_round_trip_and_failure() {
        let gateway = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let stored = gateway
            .insert_row(
                owner,
                NewDocument {
                    title: "CV".into(),
                    template: "default".into(),
                    data: json!({"basics": {"name": "A"}}),
                    preview: None,
                },
            )
            .await
            .unwrap();
        let mut s = EditorSession::open(Uuid::new_v4(), stored.clone()).unwrap();

        assert!(matches!(s.save(&gateway).await, Err(SessionError::NothingToSave(SessionStatus::Clean))));

        s.edit(ViewMode::Json, text("{\"basics\": {\"name\": \"B\"}}")).unwrap();
        gateway.fail_writes(true);
        assert!(s.save(&gateway).await.is_err());
        assert_eq!(s.status(), SessionStatus::DirtyValid);
        assert_eq!(s.document().basics.name, "B");
        assert!(s.snapshot().last_save_error.is_some());

        gateway.fail_writes(false);
        s.save(&gateway).await.unwrap();
        assert_eq!(s.status(), SessionStatus::Clean);
        let row = gateway.fetch_row(owner, stored.id).await.unwrap();
        assert_eq!(row.data, json!({"basics": {"name": "B"}}));
        assert!(row.preview.unwrap().starts_with("# B"));
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        s.edit(ViewMode::Json, text("{\"basics\": {\"name\": \"B\"}}")).unwrap();
        let ticket = s.begin_save().unwrap();
        assert_eq!(s.status(), SessionStatus::Saving);
        assert!(matches!(s.begin_save(), Err(SessionError::SaveInFlight)));

        s.edit(ViewMode::Json, text("{\"basics\": {\"name\": \"C\"}}")).unwrap();
        let saved = row(ticket.data.clone());
        s.complete_save(&ticket, Ok(saved)).unwrap();
        assert_eq!(s.status(), SessionStatus::DirtyValid);
        assert_eq!(s.document().basics.name, "C");
    }

    #[test]
    fn test_accepted_edits_can_be_saved_past_a_rejected_one() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        s.edit(ViewMode::Json, text("{\"basics\": {\"name\": \"B\"}}")).unwrap();
        s.edit(ViewMode::Yaml, text("basics: [")).unwrap();
        assert_eq!(s.status(), SessionStatus::DirtyInvalid);

        let ticket = s.begin_save().unwrap();
        assert_eq!(ticket.data, json!({"basics": {"name": "B"}}));
        s.complete_save(&ticket, Ok(row(ticket.data.clone()))).unwrap();

        // the rejected YAML is still waiting for a fix, but nothing else is
        assert_eq!(s.status(), SessionStatus::DirtyInvalid);
        assert_eq!(s.yaml_text(), "basics: [");
        assert!(matches!(
            s.begin_save(),
            Err(SessionError::NothingToSave(SessionStatus::DirtyInvalid))
        ));
    }

    #[test]
    fn test_rename_during_title_write_stays_dirty() {
        let mut s = session(json!({"basics": {"name": "A"}}));
        s.rename("Staff CV");
        s.rename("Principal CV");
        s.complete_title_save("Staff CV", Ok(row(json!({"basics": {"name": "A"}}))))
            .unwrap();
        assert!(s.title_dirty());
        assert_eq!(s.snapshot().title, "Principal CV");
    }

    #[tokio::test]
    async fn test_title_is_saved_independently() {
        let gateway = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let stored = gateway
            .insert_row(
                owner,
                NewDocument {
                    title: "CV".into(),
                    template: "default".into(),
                    data: json!({"basics": {"name": "A"}}),
                    preview: None,
                },
            )
            .await
            .unwrap();
        let mut s = EditorSession::open(Uuid::new_v4(), stored.clone()).unwrap();
        s.rename("Staff CV");
        assert!(s.title_dirty());
        assert_eq!(s.status(), SessionStatus::Clean);

        s.save_title(&gateway).await.unwrap();
        assert!(!s.title_dirty());
        assert_eq!(gateway.fetch_row(owner, stored.id).await.unwrap().title, "Staff CV");
    }
}
