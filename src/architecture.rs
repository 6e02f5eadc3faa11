//! The architecture root.
//!
//! Collects the components declared by an application so the whole
//! definition can be printed or handed to deployment tooling.

use serde::{Deserialize, Serialize};

/// Kind of a declared component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    ApiContainer,
    JsonStore,
    Function,
}

/// One component in a synthesized definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
}

/// Serializable snapshot of an architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureDefinition {
    pub id: String,
    pub components: Vec<ComponentDefinition>,
}

/// Root of a declared architecture.
#[derive(Debug, Clone)]
pub struct Architecture {
    id: String,
    components: Vec<(String, ComponentKind)>,
}

impl Architecture {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declare a component directly under the root.
    pub fn add(&mut self, id: impl Into<String>, kind: ComponentKind) {
        self.components.push((id.into(), kind));
    }

    pub fn synth(&self) -> ArchitectureDefinition {
        ArchitectureDefinition {
            id: self.id.clone(),
            components: self
                .components
                .iter()
                .map(|(id, kind)| ComponentDefinition {
                    id: id.clone(),
                    path: format!("{}/{}", self.id, id),
                    kind: *kind,
                })
                .collect(),
        }
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Self::new("architecture")
    }
}
