//! Objects returned by WBEM operations.

use serde::Serialize;
use serde_json::{Map, Value};
use strum::Display;

/// What a [`CimObject`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Class,
    Instance,
    ClassName,
    InstanceName,
    Count,
    Namespace,
}

/// One object returned from one namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CimObject {
    /// Namespace the object was returned from.
    pub namespace: String,
    /// Object category.
    pub kind: ObjectKind,
    /// Class of the object (or the class itself).
    pub class_name: String,
    /// Instance path, for instances and instance names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Superclass, for classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// Property values (or property types, for classes).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl CimObject {
    /// Creates an object with no path, superclass, or properties.
    pub fn new(namespace: impl Into<String>, kind: ObjectKind, class_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            class_name: class_name.into(),
            path: None,
            superclass: None,
            properties: Map::new(),
        }
    }

    /// Sets the instance path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Identifier shown in listings: the path when present, else the class.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.class_name)
    }
}
