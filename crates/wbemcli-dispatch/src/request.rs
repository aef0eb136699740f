//! Target namespaces for one command.

use strum::Display;

use crate::mock::normalise_namespace;

/// How results from several namespaces are interleaved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OrderingMode {
    /// All objects of the first namespace, then the second, and so on.
    #[default]
    NamespaceOrder,
    /// Round-robin by position within each namespace's result.
    ObjectOrder,
}

/// Ordered, duplicate-free list of namespaces plus the output ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRequest {
    namespaces: Vec<String>,
    ordering: OrderingMode,
}

impl NamespaceRequest {
    /// Builds a request from repeated and/or comma-separated option values.
    ///
    /// Blank entries are ignored, surrounding slashes are stripped, and
    /// duplicates are dropped keeping the first occurrence. When nothing
    /// remains, `default_namespace` is the single target.
    pub fn parse<I, S>(values: I, default_namespace: &str, ordering: OrderingMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut namespaces: Vec<String> = Vec::new();
        for value in values {
            for entry in value.as_ref().split(',') {
                let entry = normalise_namespace(entry);
                if !entry.is_empty() && !namespaces.iter().any(|known| known == entry) {
                    namespaces.push(entry.to_owned());
                }
            }
        }
        if namespaces.is_empty() {
            namespaces.push(normalise_namespace(default_namespace).to_owned());
        }
        Self {
            namespaces,
            ordering,
        }
    }

    /// A request for exactly one namespace.
    pub fn single(namespace: impl Into<String>) -> Self {
        Self {
            namespaces: vec![namespace.into()],
            ordering: OrderingMode::NamespaceOrder,
        }
    }

    /// Namespaces in request order.
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Output ordering.
    #[must_use]
    pub const fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    /// Returns true when more than one namespace is targeted.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.namespaces.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["root/cimv2,interop"], &["root/cimv2", "interop"])]
    #[case(&["root/cimv2", "interop", "root/cimv2"], &["root/cimv2", "interop"])]
    #[case(&["interop, root/cimv2,,", "/interop/"], &["interop", "root/cimv2"])]
    #[case(&[], &["root/default"])]
    #[case(&[""], &["root/default"])]
    fn combines_repeated_and_comma_separated(#[case] values: &[&str], #[case] expected: &[&str]) {
        let request = NamespaceRequest::parse(values, "root/default", OrderingMode::ObjectOrder);
        assert_eq!(request.namespaces(), expected);
        assert_eq!(request.ordering(), OrderingMode::ObjectOrder);
    }

    #[test]
    fn single_namespace_is_not_multi() {
        assert!(!NamespaceRequest::single("root/cimv2").is_multi());
    }
}
