//! Property editing for the selected field.
//!
//! The inspector shows exactly the properties the registry declares
//! editable for the selected field's type, and writes changes back as a
//! typed [`FieldPatch`]: the property name and its value type are bound
//! together, so options can never be assigned a boolean.

use crate::schema::registry::{self, PropertyKind};
use crate::schema::{Field, FieldType};

/// One property edit. Applying a patch replaces only the named property
/// and leaves everything else, including the field's position, alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch {
    Label(String),
    Placeholder(String),
    Required(bool),
    Options(Vec<String>),
}

impl FieldPatch {
    pub fn kind(&self) -> PropertyKind {
        match self {
            FieldPatch::Label(_) => PropertyKind::Label,
            FieldPatch::Placeholder(_) => PropertyKind::Placeholder,
            FieldPatch::Required(_) => PropertyKind::Required,
            FieldPatch::Options(_) => PropertyKind::Options,
        }
    }

    /// Apply to a field. Patches for properties the field's type does
    /// not edit are ignored, per the registry.
    pub fn apply(self, field: &mut Field) {
        if !registry::supports(field.kind, self.kind()) {
            return;
        }
        match self {
            FieldPatch::Label(label) => field.label = label,
            FieldPatch::Placeholder(placeholder) => field.placeholder = placeholder,
            FieldPatch::Required(required) => field.required = required,
            FieldPatch::Options(options) => field.options = options,
        }
    }
}

/// The inspector rows for a field type, in display order.
pub fn visible_properties(kind: FieldType) -> &'static [PropertyKind] {
    registry::definition(kind).properties
}

/// Split the options editor's text block into the options list: one
/// option per line. Trailing blank lines are preserved as empty-string
/// options so the text block is an exact projection of the list.
pub fn split_options(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.to_string()).collect()
}

/// Inverse of [`split_options`].
pub fn join_options(options: &[String]) -> String {
    options.join("\n")
}

/// The text a property edit buffer starts from.
pub fn property_text(field: &Field, prop: PropertyKind) -> String {
    match prop {
        PropertyKind::Label => field.label.clone(),
        PropertyKind::Placeholder => field.placeholder.clone(),
        PropertyKind::Required => String::new(),
        PropertyKind::Options => join_options(&field.options),
    }
}

/// Build the patch a committed edit buffer stands for.
pub fn patch_from_text(prop: PropertyKind, text: String) -> Option<FieldPatch> {
    match prop {
        PropertyKind::Label => Some(FieldPatch::Label(text)),
        PropertyKind::Placeholder => Some(FieldPatch::Placeholder(text)),
        PropertyKind::Options => Some(FieldPatch::Options(split_options(&text))),
        // Required is a toggle, not a text edit.
        PropertyKind::Required => None,
    }
}

/// A small in-place edit buffer for inspector rows. Supports embedded
/// newlines for the options editor.
#[derive(Debug)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl EditBuffer {
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.chars.len();
    }
}

/// Inspector pane state: which row is focused and whether a text edit
/// is in progress. Selecting a different field resets this wholesale,
/// so no partial edit can leak across fields.
#[derive(Debug, Default)]
pub struct InspectorState {
    pub row: usize,
    pub editing: Option<EditBuffer>,
}

impl InspectorState {
    pub fn reset(&mut self) {
        self.row = 0;
        self.editing = None;
    }
}
