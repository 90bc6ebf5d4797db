//! The builder session: single owner of the schema and selection.
//!
//! All canvas mutation funnels through here. Operations are total over
//! valid inputs and never fail; only [`Builder::save`] can go wrong,
//! and it fails by resolving to [`SaveState::Error`] rather than
//! returning one, so callers never wrap builder calls in error
//! handling.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::drag::{splice_move, DragReorder};
use crate::error::DraftError;
use crate::inspector::FieldPatch;
use crate::repository::TemplateRepository;
use crate::schema::factory::FieldFactory;
use crate::schema::{FieldId, FieldType, FormSchema, Template, TemplatePayload};

/// How long Success/Error feedback stays on the save control before it
/// reverts to Idle.
pub const SAVE_FEEDBACK_DELAY: Duration = Duration::from_secs(3);

/// Save control state, exposed for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Success,
    Error,
}

pub struct Builder {
    schema: FormSchema,
    selected: Option<FieldId>,
    factory: FieldFactory,
    pub drag: DragReorder,
    save_state: SaveState,
    feedback_since: Option<Instant>,
    /// Message behind [`SaveState::Error`], for the status line.
    last_save_error: Option<String>,
    /// Server id when editing an existing template; save becomes an
    /// update instead of a create.
    remote_id: Option<String>,
    dirty: bool,
}

impl Builder {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_schema(FormSchema::new(title), None)
    }

    /// Start from a full template fetched via the show call. Field ids
    /// are regenerated; they are not a persisted identity.
    pub fn from_template(template: Template) -> Self {
        let mut factory = FieldFactory::new();
        let schema = FormSchema::from_wire(template.title, template.fields, &mut factory);
        let mut builder = Self::with_schema(schema, Some(factory));
        builder.remote_id = Some(template.id);
        builder
    }

    fn with_schema(schema: FormSchema, factory: Option<FieldFactory>) -> Self {
        Self {
            schema,
            selected: None,
            factory: factory.unwrap_or_default(),
            drag: DragReorder::new(),
            save_state: SaveState::default(),
            feedback_since: None,
            last_save_error: None,
            remote_id: None,
            dirty: false,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&crate::schema::Field> {
        self.selected.and_then(|id| self.schema.field(id))
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_title(&mut self, title: String) {
        self.schema.title = title;
        self.dirty = true;
    }

    /// Append a new field of `kind` and select it.
    pub fn add_field(&mut self, kind: FieldType) -> FieldId {
        let field = self.factory.create(kind);
        let id = field.id;
        self.schema.fields.push(field);
        self.selected = Some(id);
        self.dirty = true;
        id
    }

    /// Palette drop payload: a wire name. Unrecognized names are
    /// ignored, not errors.
    pub fn add_field_named(&mut self, name: &str) -> Option<FieldId> {
        FieldType::from_wire(name).map(|kind| self.add_field(kind))
    }

    /// Remove a field permanently. Clears the selection when it pointed
    /// at the removed field.
    pub fn delete_field(&mut self, id: FieldId) {
        let before = self.schema.fields.len();
        self.schema.fields.retain(|f| f.id != id);
        if self.schema.fields.len() != before {
            self.dirty = true;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub fn select_field(&mut self, id: Option<FieldId>) {
        self.selected = match id {
            Some(id) if self.schema.field(id).is_some() => Some(id),
            _ => None,
        };
    }

    /// Splice-move the field at `source` to `target`. Ids and selection
    /// are untouched; out-of-range indices do nothing.
    pub fn reorder(&mut self, source: usize, target: usize) {
        if source != target
            && source < self.schema.fields.len()
            && target < self.schema.fields.len()
        {
            splice_move(&mut self.schema.fields, source, target);
            self.dirty = true;
        }
    }

    /// Apply a property patch to the field with `id`. Missing ids and
    /// patches the field's type does not edit are inert.
    pub fn update_field(&mut self, id: FieldId, patch: FieldPatch) {
        if let Some(field) = self.schema.field_mut(id) {
            patch.apply(field);
            self.dirty = true;
        }
    }

    // Drag gesture plumbing: the screen reports grab/hover/drop and the
    // engine decides whether anything moves.

    pub fn begin_drag(&mut self, source: usize) {
        if source < self.schema.fields.len() {
            self.drag.begin(source);
        }
    }

    pub fn hover_drag(&mut self, target: usize) {
        if target < self.schema.fields.len() {
            self.drag.hover(target);
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// End the gesture, committing the reorder when one resolved.
    pub fn drop_drag(&mut self) {
        if let Some((source, target)) = self.drag.commit() {
            self.reorder(source, target);
        }
    }

    /// Mark the save in flight. The screen calls this and repaints once
    /// before invoking [`Builder::save`], so the Saving state is
    /// actually visible during the blocking request.
    pub fn mark_saving(&mut self) {
        self.save_state = SaveState::Saving;
    }

    /// Persist the schema. The wire payload strips client-side field
    /// ids. A failure leaves the schema untouched and resubmittable;
    /// the message is kept in [`Builder::last_save_error`] for the
    /// status line.
    pub fn save(&mut self, repo: &dyn TemplateRepository) {
        self.save_state = SaveState::Saving;
        let payload = self.schema.to_payload();
        let result = if let Some(id) = self.remote_id.clone() {
            repo.update(&id, &payload)
        } else {
            match repo.create(&payload) {
                Ok(id) => {
                    self.remote_id = Some(id);
                    Ok(())
                }
                Err(err) => Err(err),
            }
        };
        self.feedback_since = Some(Instant::now());
        match result {
            Ok(()) => {
                self.save_state = SaveState::Success;
                self.last_save_error = None;
                self.dirty = false;
            }
            Err(err) => {
                self.save_state = SaveState::Error;
                self.last_save_error = Some(err.to_string());
            }
        }
    }

    /// Advance timed state: Success/Error feedback reverts to Idle
    /// after [`SAVE_FEEDBACK_DELAY`].
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if matches!(self.save_state, SaveState::Success | SaveState::Error) {
            if let Some(since) = self.feedback_since {
                if now.duration_since(since) >= SAVE_FEEDBACK_DELAY {
                    self.save_state = SaveState::Idle;
                    self.feedback_since = None;
                    self.last_save_error = None;
                }
            }
        }
    }

    // Local draft: the builder's escape hatch when quitting with
    // unsaved work, stored in the same wire shape the backend sees.

    pub fn save_draft(&self, path: &Path) -> Result<(), DraftError> {
        let json = serde_json::to_string_pretty(&self.schema.to_payload())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_draft(path: &Path) -> Result<Self, DraftError> {
        let json = std::fs::read_to_string(path)?;
        let payload: TemplatePayload = serde_json::from_str(&json)?;
        let mut factory = FieldFactory::new();
        let schema = FormSchema::from_wire(payload.title, payload.fields, &mut factory);
        Ok(Self::with_schema(schema, Some(factory)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::schema::{Template, TemplateSummary, WireField};

    struct StubRepo {
        fail: bool,
    }

    impl TemplateRepository for StubRepo {
        fn create(&self, _payload: &TemplatePayload) -> Result<String, RepositoryError> {
            if self.fail {
                Err(RepositoryError::status(500, "/api/form_templates", "boom"))
            } else {
                Ok("42".to_string())
            }
        }

        fn update(&self, _id: &str, _payload: &TemplatePayload) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::transport("connection refused"))
            } else {
                Ok(())
            }
        }

        fn list(&self) -> Result<Vec<TemplateSummary>, RepositoryError> {
            Ok(Vec::new())
        }

        fn show(&self, _id: &str) -> Result<Template, RepositoryError> {
            Err(RepositoryError::missing_key("id"))
        }

        fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
            Ok(())
        }

        fn submit(&self, _id: &str, _body: &serde_json::Value) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn builder_with(kinds: &[FieldType]) -> Builder {
        let mut builder = Builder::new("Test form");
        for kind in kinds {
            builder.add_field(*kind);
        }
        builder
    }

    #[test]
    fn adding_a_text_field_to_an_empty_schema() {
        let mut builder = Builder::new("Empty");
        let id = builder.add_field(FieldType::Text);
        assert_eq!(builder.schema().fields.len(), 1);
        let field = builder.schema().field(id).unwrap();
        assert_eq!(field.kind, FieldType::Text);
        assert_eq!(field.label, "Untitled text");
        assert!(!field.required);
        assert_eq!(builder.selected(), Some(id));
    }

    #[test]
    fn unknown_palette_payload_is_ignored() {
        let mut builder = Builder::new("Test");
        assert!(builder.add_field_named("signature").is_none());
        assert!(builder.schema().fields.is_empty());
        assert!(builder.add_field_named("tel").is_some());
        assert_eq!(builder.schema().fields.len(), 1);
    }

    #[test]
    fn deleting_the_selected_field_clears_selection() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Number]);
        let selected = builder.selected().unwrap();
        builder.delete_field(selected);
        assert_eq!(builder.selected(), None);
        assert_eq!(builder.schema().fields.len(), 1);
    }

    #[test]
    fn deleting_an_unselected_field_keeps_selection() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Number]);
        let first = builder.schema().fields[0].id;
        let selected = builder.selected().unwrap();
        builder.delete_field(first);
        assert_eq!(builder.selected(), Some(selected));
    }

    #[test]
    fn selecting_a_missing_id_clears_selection() {
        let mut builder = builder_with(&[FieldType::Text]);
        builder.select_field(Some(FieldId(999)));
        assert_eq!(builder.selected(), None);
    }

    // Reordering permutes the list and keeps every id stable.
    #[test]
    fn reorder_splices_and_preserves_ids() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Number, FieldType::Date]);
        let ids: Vec<FieldId> = builder.schema().fields.iter().map(|f| f.id).collect();

        builder.reorder(0, 2);

        let after: Vec<FieldId> = builder.schema().fields.iter().map(|f| f.id).collect();
        assert_eq!(after, vec![ids[1], ids[2], ids[0]]);

        let mut sorted = after.clone();
        sorted.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn reorder_out_of_range_is_inert() {
        let mut builder = builder_with(&[FieldType::Text]);
        let before = builder.schema().clone();
        builder.reorder(0, 5);
        builder.reorder(7, 0);
        builder.reorder(0, 0);
        assert_eq!(builder.schema(), &before);
    }

    #[test]
    fn drag_gesture_drives_reorder() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Number, FieldType::Date]);
        let first = builder.schema().fields[0].id;
        builder.begin_drag(0);
        builder.hover_drag(1);
        builder.hover_drag(2);
        builder.drop_drag();
        assert_eq!(builder.schema().fields[2].id, first);
    }

    #[test]
    fn cancelled_drag_does_not_mutate() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Number]);
        let before = builder.schema().clone();
        builder.begin_drag(0);
        builder.hover_drag(1);
        builder.cancel_drag();
        builder.drop_drag();
        assert_eq!(builder.schema(), &before);
    }

    #[test]
    fn update_touches_only_the_named_property() {
        let mut builder = builder_with(&[FieldType::Dropdown, FieldType::Text]);
        let dropdown = builder.schema().fields[0].id;
        let sibling_before = builder.schema().fields[1].clone();

        builder.update_field(
            dropdown,
            FieldPatch::Options(vec!["Red".into(), "Blue".into(), "Green".into()]),
        );

        let field = builder.schema().field(dropdown).unwrap();
        assert_eq!(field.options, vec!["Red", "Blue", "Green"]);
        assert_eq!(field.label, "Untitled dropdown");
        assert_eq!(builder.schema().fields[1], sibling_before);
        // The id survives the update.
        assert_eq!(field.id, dropdown);
    }

    #[test]
    fn update_for_a_deleted_id_is_inert() {
        let mut builder = builder_with(&[FieldType::Text]);
        let id = builder.schema().fields[0].id;
        builder.delete_field(id);
        builder.update_field(id, FieldPatch::Label("ghost".into()));
        assert!(builder.schema().fields.is_empty());
    }

    #[test]
    fn successful_save_marks_success_and_remembers_the_id() {
        let mut builder = builder_with(&[FieldType::Text]);
        builder.save(&StubRepo { fail: false });
        assert_eq!(builder.save_state(), SaveState::Success);
        assert!(!builder.is_dirty());
        assert_eq!(builder.remote_id.as_deref(), Some("42"));
    }

    #[test]
    fn failed_save_preserves_schema_and_reverts() {
        let mut builder = builder_with(&[FieldType::Text, FieldType::Radio]);
        let before = builder.schema().clone();

        builder.save(&StubRepo { fail: true });
        assert_eq!(builder.save_state(), SaveState::Error);
        assert_eq!(builder.schema(), &before);

        // Not yet: the feedback delay has not elapsed.
        builder.tick();
        assert_eq!(builder.save_state(), SaveState::Error);

        builder.tick_at(Instant::now() + SAVE_FEEDBACK_DELAY);
        assert_eq!(builder.save_state(), SaveState::Idle);
    }

    #[test]
    fn failed_save_keeps_the_message_until_feedback_reverts() {
        let mut builder = builder_with(&[FieldType::Text]);

        builder.save(&StubRepo { fail: true });
        let message = builder.last_save_error().unwrap();
        assert!(message.contains("connection refused") || message.contains("boom"));

        builder.tick_at(Instant::now() + SAVE_FEEDBACK_DELAY);
        assert_eq!(builder.last_save_error(), None);

        builder.save(&StubRepo { fail: false });
        assert_eq!(builder.last_save_error(), None);
    }

    #[test]
    fn mark_saving_flips_the_state_before_the_request() {
        let mut builder = builder_with(&[FieldType::Text]);
        builder.mark_saving();
        assert_eq!(builder.save_state(), SaveState::Saving);

        builder.save(&StubRepo { fail: false });
        assert_eq!(builder.save_state(), SaveState::Success);
    }

    #[test]
    fn editing_an_existing_template_updates_in_place() {
        let template = Template {
            id: "7".to_string(),
            title: "Visit form".to_string(),
            fields: vec![WireField {
                kind: FieldType::Text,
                label: "Name".to_string(),
                placeholder: None,
                required: true,
                options: None,
            }],
        };
        let mut builder = Builder::from_template(template);
        assert_eq!(builder.schema().fields.len(), 1);
        assert!(builder.schema().fields[0].required);

        builder.save(&StubRepo { fail: false });
        assert_eq!(builder.save_state(), SaveState::Success);
        assert_eq!(builder.remote_id.as_deref(), Some("7"));
    }

    #[test]
    fn draft_round_trips_through_disk() {
        let mut builder = builder_with(&[FieldType::Dropdown]);
        let id = builder.schema().fields[0].id;
        builder.update_field(id, FieldPatch::Options(vec!["A".into(), "".into()]));

        let path = std::env::temp_dir().join("formsmith_draft_test.json");
        builder.save_draft(&path).unwrap();
        let restored = Builder::load_draft(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.schema().title, builder.schema().title);
        assert_eq!(
            restored.schema().fields[0].options,
            builder.schema().fields[0].options
        );
    }
}
