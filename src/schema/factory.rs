//! Construction of new fields with per-type defaults.

use crate::schema::{Field, FieldId, FieldType};

/// Options seeded onto newly created dropdown and radio fields.
pub const DEFAULT_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// Creates fields with fresh ids and type-derived defaults.
///
/// Ids come from an owned incrementing counter, so uniqueness within a
/// session holds even under rapid successive creation.
#[derive(Debug)]
pub struct FieldFactory {
    next_id: u64,
}

impl FieldFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next_id(&mut self) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Pure construction; no failure cases.
    pub fn create(&mut self, kind: FieldType) -> Field {
        let label = match kind {
            FieldType::Checkbox => "Checkbox Label".to_string(),
            _ => format!("Untitled {}", kind.wire_name()),
        };
        let options = if kind.has_options() {
            DEFAULT_OPTIONS.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };
        Field {
            id: self.next_id(),
            kind,
            label,
            placeholder: String::new(),
            required: false,
            options,
        }
    }
}

impl Default for FieldFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut factory = FieldFactory::new();
        let a = factory.create(FieldType::Text);
        let b = factory.create(FieldType::Text);
        let c = factory.create(FieldType::Radio);
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn text_field_defaults() {
        let field = FieldFactory::new().create(FieldType::Text);
        assert_eq!(field.kind, FieldType::Text);
        assert_eq!(field.label, "Untitled text");
        assert_eq!(field.placeholder, "");
        assert!(!field.required);
        assert!(field.options.is_empty());
    }

    #[test]
    fn checkbox_gets_its_own_label() {
        let field = FieldFactory::new().create(FieldType::Checkbox);
        assert_eq!(field.label, "Checkbox Label");
    }

    #[test]
    fn choice_types_are_seeded_with_two_options() {
        let mut factory = FieldFactory::new();
        for kind in [FieldType::Dropdown, FieldType::Radio] {
            let field = factory.create(kind);
            assert_eq!(field.options, vec!["Option 1", "Option 2"]);
        }
        // Everything else starts with none.
        let text = factory.create(FieldType::Date);
        assert!(text.options.is_empty());
    }
}
