//! Service areas and their field schemas.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::AreaId;

/// A service/department category a report is filed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One entry of an area's custom field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Typed field kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Image {
        #[serde(default)]
        required: bool,
    },
    Select {
        options: OptionSource,
    },
}

/// Where a select field's options come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionSource {
    Inline(Vec<String>),
    Group { group: String },
}

/// Shared named option groups referenced by select fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionCatalog(HashMap<String, Vec<String>>);

impl OptionCatalog {
    pub fn new(groups: HashMap<String, Vec<String>>) -> Self {
        Self(groups)
    }

    /// Expands an option source. Unknown groups resolve to nothing.
    pub fn resolve(&self, source: &OptionSource) -> Vec<String> {
        match source {
            OptionSource::Inline(options) => options.clone(),
            OptionSource::Group { group } => self.0.get(group).cloned().unwrap_or_default(),
        }
    }
}

/// An ordered image slot derived from an area schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSlotSpec {
    pub key: String,
    pub label: String,
    pub required: bool,
}

impl Area {
    /// Image slots in schema order.
    pub fn image_slots(&self) -> Vec<ImageSlotSpec> {
        image_slots_of(&self.fields)
    }

    /// Selectable-option vocabulary of the area, expanded through the catalog.
    pub fn vocabulary(&self, catalog: &OptionCatalog) -> Vec<String> {
        let mut words = Vec::new();
        for field in &self.fields {
            if let FieldKind::Select { options } = &field.kind {
                for option in catalog.resolve(options) {
                    if !words.contains(&option) {
                        words.push(option);
                    }
                }
            }
        }
        words
    }
}

/// Image slots of an arbitrary field list, in order.
pub fn image_slots_of(fields: &[Field]) -> Vec<ImageSlotSpec> {
    fields
        .iter()
        .filter_map(|field| match field.kind {
            FieldKind::Image { required } => Some(ImageSlotSpec {
                key: field.key.clone(),
                label: field.label.clone(),
                required,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_yaml() -> &'static str {
        r#"
id: tic
name: Soporte TIC
description: Equipos de cómputo, proyectores y red
fields:
  - key: equipo
    label: Tipo de equipo
    type: select
    options:
      group: equipos
  - key: foto_equipo
    label: Foto del equipo
    type: image
    required: true
  - key: serie
    label: Número de serie
    type: text
  - key: foto_ambiente
    label: Foto del ambiente
    type: image
  - key: prioridad
    label: Prioridad
    type: select
    options: [baja, alta]
"#
    }

    fn catalog() -> OptionCatalog {
        let mut groups = HashMap::new();
        groups.insert(
            "equipos".to_string(),
            vec!["proyector".to_string(), "computadora".to_string()],
        );
        OptionCatalog::new(groups)
    }

    #[test]
    fn deserializes_schema_from_yaml() {
        let area: Area = serde_yaml::from_str(area_yaml()).unwrap();
        assert_eq!(area.fields.len(), 5);
        assert_eq!(area.fields[2].kind, FieldKind::Text);
    }

    #[test]
    fn image_slots_keep_schema_order() {
        let area: Area = serde_yaml::from_str(area_yaml()).unwrap();
        let slots = area.image_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].key, "foto_equipo");
        assert!(slots[0].required);
        assert_eq!(slots[1].key, "foto_ambiente");
        assert!(!slots[1].required);
    }

    #[test]
    fn vocabulary_expands_groups_and_inline_options() {
        let area: Area = serde_yaml::from_str(area_yaml()).unwrap();
        assert_eq!(
            area.vocabulary(&catalog()),
            vec!["proyector", "computadora", "baja", "alta"]
        );
    }

    #[test]
    fn unknown_group_resolves_empty() {
        let source = OptionSource::Group {
            group: "missing".to_string(),
        };
        assert!(catalog().resolve(&source).is_empty());
    }
}
