//! The form schema under edit and its wire representation.
//!
//! A [`FormSchema`] is the builder's working document: a title plus an
//! ordered list of [`Field`]s. Field order is presentation order.
//! Client-side field ids exist only for the editing session; the wire
//! shape strips them and the backend assigns its own identifiers.

pub mod factory;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::schema::factory::FieldFactory;
use crate::schema::registry::PropertyKind;

/// Closed set of field types a form can contain.
///
/// The discriminant order matches `registry::DEFINITIONS`, which is
/// indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Tel,
    Number,
    Date,
    Time,
    Dropdown,
    Checkbox,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Tel,
        FieldType::Number,
        FieldType::Date,
        FieldType::Time,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    /// The lowercase name used in the wire format and palette payloads.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Tel => "tel",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }

    /// Parse a palette/wire name. Unknown names yield `None`; callers
    /// treat that as an ignored drop, never an error.
    pub fn from_wire(name: &str) -> Option<FieldType> {
        FieldType::ALL.iter().copied().find(|t| t.wire_name() == name)
    }

    /// Whether `options` carries meaning for this type.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Radio)
    }

    /// Whether the rendered control shows a placeholder. Date and time
    /// use picker-style controls and ignore it.
    pub fn has_placeholder(&self) -> bool {
        registry::supports(*self, PropertyKind::Placeholder)
    }
}

/// Session-local field identifier. Stable across reorders and property
/// edits; never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// One schema unit: a single input in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    /// Immutable after creation; changing type means delete + recreate.
    pub kind: FieldType,
    pub label: String,
    /// Meaningful only for text, textarea, number and tel.
    pub placeholder: String,
    pub required: bool,
    /// Meaningful only for dropdown and radio.
    pub options: Vec<String>,
}

/// The working document: title plus ordered fields.
///
/// Invariants: field ids are unique; an empty field list is valid (the
/// canvas shows its drop-here empty state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    pub title: String,
    pub fields: Vec<Field>,
}

impl FormSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn index_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Serialize for transmission. Field ids are stripped: they are an
    /// editing convenience, not a persisted identity across saves.
    pub fn to_payload(&self) -> TemplatePayload {
        TemplatePayload {
            title: self.title.clone(),
            fields: self.fields.iter().map(WireField::from_field).collect(),
        }
    }

    /// Rebuild a schema from wire fields, regenerating ids with the
    /// given factory.
    pub fn from_wire(title: String, fields: Vec<WireField>, factory: &mut FieldFactory) -> Self {
        let fields = fields
            .into_iter()
            .map(|w| w.into_field(factory))
            .collect();
        Self { title, fields }
    }
}

/// One field as transmitted to the backend: no client-side id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireField {
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl WireField {
    pub fn from_field(field: &Field) -> Self {
        let placeholder = if field.kind.has_placeholder() && !field.placeholder.is_empty() {
            Some(field.placeholder.clone())
        } else {
            None
        };
        let options = if field.kind.has_options() {
            Some(field.options.clone())
        } else {
            None
        };
        Self {
            kind: field.kind,
            label: field.label.clone(),
            placeholder,
            required: field.required,
            options,
        }
    }

    pub fn into_field(self, factory: &mut FieldFactory) -> Field {
        Field {
            id: factory.next_id(),
            kind: self.kind,
            label: self.label,
            placeholder: self.placeholder.unwrap_or_default(),
            required: self.required,
            options: self.options.unwrap_or_default(),
        }
    }
}

/// Create/update request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub title: String,
    pub fields: Vec<WireField>,
}

/// A persisted template fetched in full via the show call.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<WireField>,
}

/// One row of the list call. Intentionally carries no fields: listing N
/// templates must not load N field schemas.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub submissions_count: u64,
    #[serde(default)]
    pub last_used: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> FormSchema {
        let mut factory = FieldFactory::new();
        let mut schema = FormSchema::new("Intake");
        schema.fields.push(factory.create(FieldType::Text));
        schema.fields.push(factory.create(FieldType::Dropdown));
        schema.fields.push(factory.create(FieldType::Checkbox));
        schema
    }

    #[test]
    fn wire_names_round_trip() {
        for kind in FieldType::ALL {
            assert_eq!(FieldType::from_wire(kind.wire_name()), Some(kind));
        }
        assert_eq!(FieldType::from_wire("signature"), None);
        assert_eq!(FieldType::from_wire(""), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&FieldType::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let back: FieldType = serde_json::from_str("\"radio\"").unwrap();
        assert_eq!(back, FieldType::Radio);
    }

    #[test]
    fn payload_strips_ids_and_empty_placeholders() {
        let mut schema = sample_schema();
        schema.fields[0].placeholder = "Jane Doe".to_string();
        let payload = schema.to_payload();

        let json = serde_json::to_value(&payload).unwrap();
        let fields = json["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        for f in fields {
            assert!(f.get("id").is_none());
        }
        assert_eq!(fields[0]["placeholder"], "Jane Doe");
        // Dropdown has no placeholder key, checkbox has no options key.
        assert!(fields[1].get("placeholder").is_none());
        assert!(fields[1].get("options").is_some());
        assert!(fields[2].get("options").is_none());
    }

    // Saving then loading reconstructs the schema up to ids.
    #[test]
    fn wire_round_trip_preserves_everything_but_ids() {
        let mut schema = sample_schema();
        schema.fields[0].required = true;
        schema.fields[1].options = vec!["Red".into(), "Blue".into(), "".into()];

        let payload = schema.to_payload();
        let mut factory = FieldFactory::new();
        let rebuilt = FormSchema::from_wire(payload.title, payload.fields, &mut factory);

        assert_eq!(rebuilt.title, schema.title);
        assert_eq!(rebuilt.fields.len(), schema.fields.len());
        for (a, b) in schema.fields.iter().zip(rebuilt.fields.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.label, b.label);
            assert_eq!(a.placeholder, b.placeholder);
            assert_eq!(a.required, b.required);
            assert_eq!(a.options, b.options);
        }
    }

    #[test]
    fn summary_tolerates_missing_usage_metadata() {
        let summary: TemplateSummary =
            serde_json::from_str(r#"{"id": "7", "title": "Intake"}"#).unwrap();
        assert_eq!(summary.submissions_count, 0);
        assert!(summary.last_used.is_none());
    }
}
