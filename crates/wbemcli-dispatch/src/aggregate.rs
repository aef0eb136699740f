//! Orders dispatch results for output and counts them.

use crate::dispatcher::OperationOutcome;
use crate::object::CimObject;
use crate::request::OrderingMode;

/// Count for one requested namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSummary {
    /// Namespace name.
    pub namespace: String,
    /// Objects returned; zero when the namespace failed.
    pub count: usize,
    /// Whether the namespace failed.
    pub failed: bool,
}

/// Per-namespace counts plus the combined total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// One entry per outcome, in request order.
    pub namespaces: Vec<NamespaceSummary>,
    /// Sum of all counts.
    pub total: usize,
}

/// Merges per-namespace outcomes into one output sequence.
#[derive(Debug, Clone, Copy)]
pub struct ResultAggregator<'a> {
    outcomes: &'a [OperationOutcome],
    ordering: OrderingMode,
}

impl<'a> ResultAggregator<'a> {
    /// Creates an aggregator over `outcomes`, which must be in request order.
    #[must_use]
    pub const fn new(outcomes: &'a [OperationOutcome], ordering: OrderingMode) -> Self {
        Self { outcomes, ordering }
    }

    /// Objects in output order.
    ///
    /// Namespace order concatenates the payloads. Object order takes the
    /// first object of every namespace, then the second of every namespace,
    /// and so on; exhausted namespaces simply stop contributing.
    #[must_use]
    pub fn ordered(&self) -> Vec<&'a CimObject> {
        match self.ordering {
            OrderingMode::NamespaceOrder => self
                .outcomes
                .iter()
                .flat_map(OperationOutcome::objects)
                .collect(),
            OrderingMode::ObjectOrder => {
                let rounds = self
                    .outcomes
                    .iter()
                    .map(|outcome| outcome.objects().len())
                    .max()
                    .unwrap_or(0);
                (0..rounds)
                    .flat_map(|position| {
                        self.outcomes
                            .iter()
                            .filter_map(move |outcome| outcome.objects().get(position))
                    })
                    .collect()
            }
        }
    }

    /// Counts per namespace and in total.
    #[must_use]
    pub fn summarize(&self) -> Summary {
        let namespaces: Vec<NamespaceSummary> = self
            .outcomes
            .iter()
            .map(|outcome| NamespaceSummary {
                namespace: outcome.namespace().to_owned(),
                count: outcome.objects().len(),
                failed: outcome.error().is_some(),
            })
            .collect();
        let total = namespaces.iter().map(|entry| entry.count).sum();
        Summary { namespaces, total }
    }
}
