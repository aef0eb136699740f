//! Operations issued against a single namespace.

use std::fmt;

/// One WBEM request, independent of the namespace it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Enumerates classes, optionally below `class_name`.
    EnumerateClasses {
        class_name: Option<String>,
        names_only: bool,
    },
    /// Retrieves one class.
    GetClass { class_name: String },
    /// Enumerates the instances of a class and its subclasses.
    EnumerateInstances { class_name: String, names_only: bool },
    /// Retrieves one instance by path, e.g. `CIM_Foo.InstanceID="CIM_Foo1"`.
    GetInstance { path: String },
    /// Counts instances per class; `class_pattern` accepts `*` and `?`.
    CountInstances { class_pattern: Option<String> },
    /// Lists the namespaces of the server.
    EnumerateNamespaces,
}

impl Operation {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EnumerateClasses { names_only: false, .. } => "EnumerateClasses",
            Self::EnumerateClasses { names_only: true, .. } => "EnumerateClassNames",
            Self::GetClass { .. } => "GetClass",
            Self::EnumerateInstances { names_only: false, .. } => "EnumerateInstances",
            Self::EnumerateInstances { names_only: true, .. } => "EnumerateInstanceNames",
            Self::GetInstance { .. } => "GetInstance",
            Self::CountInstances { .. } => "CountInstances",
            Self::EnumerateNamespaces => "EnumerateNamespaces",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
