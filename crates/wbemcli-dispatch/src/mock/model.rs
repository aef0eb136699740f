//! Mock server model documents.
//!
//! A model file is YAML:
//!
//! ```yaml
//! pull_operations: true
//! namespaces:
//!   - name: root/cimv2
//!     classes:
//!       - name: CIM_Foo
//!         properties:
//!           InstanceID: string
//!     instances:
//!       - class: CIM_Foo
//!         keys:
//!           InstanceID: CIM_Foo1
//! ```
//!
//! Several files merge in load order: namespaces are matched by name, later
//! classes replace earlier ones of the same name, and later instances
//! replace earlier ones with the same path.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConnectionErrorKind, MockLoadError};

/// Simulated transport failure for every request to a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockFault {
    Timeout,
    Refused,
}

impl MockFault {
    pub(crate) const fn kind(self) -> ConnectionErrorKind {
        match self {
            Self::Timeout => ConnectionErrorKind::Timeout,
            Self::Refused => ConnectionErrorKind::Refused,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelDocument {
    pull_operations: Option<bool>,
    #[serde(default)]
    namespaces: Vec<NamespaceDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamespaceDocument {
    name: String,
    fault: Option<MockFault>,
    #[serde(default)]
    classes: Vec<MockClass>,
    #[serde(default)]
    instances: Vec<InstanceDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceDocument {
    class: String,
    #[serde(default)]
    keys: Map<String, Value>,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// A class declared by a model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockClass {
    /// Class name.
    pub name: String,
    /// Superclass name.
    #[serde(default)]
    pub superclass: Option<String>,
    /// Property name to CIM type.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// An instance declared by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct MockInstance {
    /// Creation class.
    pub class_name: String,
    /// Instance path built from the class and keys.
    pub path: String,
    /// Key and non-key property values.
    pub properties: Map<String, Value>,
}

/// One namespace of the mock server.
#[derive(Debug, Clone, PartialEq)]
pub struct MockNamespace {
    /// Namespace name.
    pub name: String,
    /// Simulated failure, if any.
    pub fault: Option<MockFault>,
    /// Classes in declaration order.
    pub classes: Vec<MockClass>,
    /// Instances in declaration order.
    pub instances: Vec<MockInstance>,
}

impl MockNamespace {
    fn new(name: String) -> Self {
        Self {
            name,
            fault: None,
            classes: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Looks up a class; CIM names are case-insensitive.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&MockClass> {
        self.classes
            .iter()
            .find(|class| class.name.eq_ignore_ascii_case(name))
    }

    /// Returns true when `class` is `ancestor` or derives from it.
    #[must_use]
    pub fn derives_from(&self, class: &str, ancestor: &str) -> bool {
        let mut current = Some(class);
        // The depth bound stops superclass cycles.
        for _ in 0..=self.classes.len() {
            let Some(name) = current else {
                return false;
            };
            if name.eq_ignore_ascii_case(ancestor) {
                return true;
            }
            current = self.class(name).and_then(|found| found.superclass.as_deref());
        }
        false
    }

    fn merge(&mut self, document: NamespaceDocument) {
        if document.fault.is_some() {
            self.fault = document.fault;
        }
        for class in document.classes {
            match self
                .classes
                .iter_mut()
                .find(|existing| existing.name.eq_ignore_ascii_case(&class.name))
            {
                Some(existing) => *existing = class,
                None => self.classes.push(class),
            }
        }
        for instance in document.instances {
            let instance = MockInstance::from_document(instance);
            match self
                .instances
                .iter_mut()
                .find(|existing| existing.path == instance.path)
            {
                Some(existing) => *existing = instance,
                None => self.instances.push(instance),
            }
        }
    }

    fn validate(&self) -> Result<(), MockLoadError> {
        let inconsistent = |message: String| MockLoadError::Inconsistent {
            namespace: self.name.clone(),
            message,
        };
        for class in &self.classes {
            if let Some(superclass) = &class.superclass
                && self.class(superclass).is_none()
            {
                return Err(inconsistent(format!(
                    "class {} names undefined superclass {superclass}",
                    class.name
                )));
            }
        }
        for instance in &self.instances {
            if self.class(&instance.class_name).is_none() {
                return Err(inconsistent(format!(
                    "instance {} has undefined class {}",
                    instance.path, instance.class_name
                )));
            }
        }
        Ok(())
    }
}

impl MockInstance {
    fn from_document(document: InstanceDocument) -> Self {
        let path = instance_path(&document.class, &document.keys);
        let mut properties = document.keys;
        properties.extend(document.properties);
        Self {
            class_name: document.class,
            path,
            properties,
        }
    }
}

/// Builds `Class.key1="value",key2=7` with keys in name order.
#[must_use]
pub fn instance_path(class_name: &str, keys: &Map<String, Value>) -> String {
    if keys.is_empty() {
        return class_name.to_owned();
    }
    let bindings: Vec<String> = keys
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}=\"{text}\""),
            other => format!("{key}={other}"),
        })
        .collect();
    format!("{class_name}.{}", bindings.join(","))
}

/// The merged model behind a mock server.
#[derive(Debug, Clone, PartialEq)]
pub struct MockModel {
    /// Whether the server supports pull operations.
    pub pull_operations: bool,
    /// Namespaces in first-declaration order.
    pub namespaces: Vec<MockNamespace>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self {
            pull_operations: true,
            namespaces: Vec::new(),
        }
    }
}

impl MockModel {
    /// Reads and merges model files in order.
    ///
    /// # Errors
    ///
    /// Returns [`MockLoadError`] when a file cannot be read or parsed, or when
    /// the merged model is inconsistent.
    pub fn load(files: &[Utf8PathBuf]) -> Result<Self, MockLoadError> {
        let mut model = Self::default();
        for path in files {
            let text = fs::read_to_string(path).map_err(|source| MockLoadError::Read {
                path: path.clone(),
                source,
            })?;
            model.merge_str(path, &text)?;
            debug!(target: "wbemcli::dispatch", path = %path, "loaded mock model file");
        }
        model.validate()?;
        Ok(model)
    }

    /// Parses one model document and merges it into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`MockLoadError::Parse`] when `text` is not a model document.
    pub fn merge_str(&mut self, path: &Utf8Path, text: &str) -> Result<(), MockLoadError> {
        let document: ModelDocument = if text.trim().is_empty() {
            ModelDocument::default()
        } else {
            serde_saphyr::from_str(text).map_err(|error| MockLoadError::Parse {
                path: path.to_owned(),
                message: error.to_string(),
            })?
        };
        if let Some(pull_operations) = document.pull_operations {
            self.pull_operations = pull_operations;
        }
        for namespace in document.namespaces {
            let name = normalise_namespace(&namespace.name).to_owned();
            if let Some(existing) = self
                .namespaces
                .iter_mut()
                .find(|existing| existing.name.eq_ignore_ascii_case(&name))
            {
                existing.merge(namespace);
            } else {
                let mut created = MockNamespace::new(name);
                created.merge(namespace);
                self.namespaces.push(created);
            }
        }
        Ok(())
    }

    /// Checks that every reference in the model resolves.
    ///
    /// # Errors
    ///
    /// Returns [`MockLoadError::Inconsistent`] for undefined superclasses or
    /// instance classes.
    pub fn validate(&self) -> Result<(), MockLoadError> {
        self.namespaces.iter().try_for_each(MockNamespace::validate)
    }

    /// Looks up a namespace by name, ignoring case and surrounding slashes.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&MockNamespace> {
        let name = normalise_namespace(name);
        self.namespaces
            .iter()
            .find(|namespace| namespace.name.eq_ignore_ascii_case(name))
    }
}

/// Strips leading and trailing slashes from a namespace name.
#[must_use]
pub fn normalise_namespace(name: &str) -> &str {
    name.trim().trim_matches('/')
}
