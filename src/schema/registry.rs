//! Static catalogue of field definitions.
//!
//! One table maps each [`FieldType`] to its palette label, icon and the
//! set of editable properties. Both the renderer and the inspector read
//! this table, so what is editable and what is rendered cannot drift
//! apart.

use crate::schema::FieldType;

/// An editable property of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Label,
    Placeholder,
    Required,
    Options,
}

impl PropertyKind {
    /// Name shown as the inspector row header.
    pub fn display_name(&self) -> &'static str {
        match self {
            PropertyKind::Label => "Label",
            PropertyKind::Placeholder => "Placeholder",
            PropertyKind::Required => "Required",
            PropertyKind::Options => "Options",
        }
    }
}

/// One entry of the catalogue.
#[derive(Debug)]
pub struct FieldDefinition {
    pub kind: FieldType,
    /// Human name shown in the palette.
    pub label: &'static str,
    /// Palette icon.
    pub icon: &'static str,
    /// Editable properties, in inspector display order.
    pub properties: &'static [PropertyKind],
}

use PropertyKind::{Label, Options, Placeholder, Required};

const TEXTUAL: &[PropertyKind] = &[Label, Placeholder, Required];
// Date and time pickers ignore placeholders, so the inspector never
// offers one for them.
const PICKER: &[PropertyKind] = &[Label, Required];
const CHOICE: &[PropertyKind] = &[Label, Options, Required];

/// Indexed by `FieldType` discriminant; `tests::table_matches_enum`
/// guards the alignment.
pub const DEFINITIONS: [FieldDefinition; 9] = [
    FieldDefinition {
        kind: FieldType::Text,
        label: "Text",
        icon: "▭",
        properties: TEXTUAL,
    },
    FieldDefinition {
        kind: FieldType::Textarea,
        label: "Paragraph",
        icon: "¶",
        properties: TEXTUAL,
    },
    FieldDefinition {
        kind: FieldType::Tel,
        label: "Phone",
        icon: "☎",
        properties: TEXTUAL,
    },
    FieldDefinition {
        kind: FieldType::Number,
        label: "Number",
        icon: "#",
        properties: TEXTUAL,
    },
    FieldDefinition {
        kind: FieldType::Date,
        label: "Date",
        icon: "📅",
        properties: PICKER,
    },
    FieldDefinition {
        kind: FieldType::Time,
        label: "Time",
        icon: "🕐",
        properties: PICKER,
    },
    FieldDefinition {
        kind: FieldType::Dropdown,
        label: "Dropdown",
        icon: "▾",
        properties: CHOICE,
    },
    FieldDefinition {
        kind: FieldType::Checkbox,
        label: "Checkbox",
        icon: "☑",
        properties: &[Label, Required],
    },
    FieldDefinition {
        kind: FieldType::Radio,
        label: "Radio Group",
        icon: "◉",
        properties: CHOICE,
    },
];

/// Look up the definition for a field type. Total: every type has one.
pub fn definition(kind: FieldType) -> &'static FieldDefinition {
    &DEFINITIONS[kind as usize]
}

/// Whether `prop` is editable for fields of type `kind`.
pub fn supports(kind: FieldType, prop: PropertyKind) -> bool {
    definition(kind).properties.contains(&prop)
}
