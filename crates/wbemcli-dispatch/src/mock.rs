//! In-process mock WBEM server driven by YAML model files.

mod model;

use serde_json::{Map, Value};
use tracing::debug;
use wbemcli_connections::UsePull;

pub use model::{
    MockClass, MockFault, MockInstance, MockModel, MockNamespace, instance_path,
    normalise_namespace,
};

use crate::connection::WbemConnection;
use crate::error::{CimError, ConnectionError, OperationError};
use crate::object::{CimObject, ObjectKind};
use crate::operation::Operation;
use crate::status::CimStatus;

const DISPATCH_TARGET: &str = "wbemcli::dispatch";

impl MockModel {
    /// Wraps the model in a connection honouring the pull settings.
    #[must_use]
    pub fn into_connection(self, use_pull: UsePull, pull_max_cnt: u32) -> MockConnection {
        MockConnection {
            model: self,
            use_pull,
            pull_max_cnt: pull_max_cnt.max(1),
        }
    }
}

/// A [`WbemConnection`] answering from a [`MockModel`].
#[derive(Debug, Clone)]
pub struct MockConnection {
    model: MockModel,
    use_pull: UsePull,
    pull_max_cnt: u32,
}

impl MockConnection {
    /// The model behind this connection.
    #[must_use]
    pub const fn model(&self) -> &MockModel {
        &self.model
    }

    fn namespace(&self, name: &str) -> Result<&MockNamespace, OperationError> {
        let namespace = self.model.namespace(name).ok_or_else(|| {
            CimError::new(
                CimStatus::InvalidNamespace,
                format!("namespace {name} does not exist"),
            )
        })?;
        if let Some(fault) = namespace.fault {
            return Err(ConnectionError::new(
                fault.kind(),
                format!("simulated {} for namespace {name}", fault.kind()),
            )
            .into());
        }
        Ok(namespace)
    }

    /// Decides whether an enumeration uses pull operations.
    fn uses_pull(&self) -> Result<bool, CimError> {
        match (self.use_pull, self.model.pull_operations) {
            (UsePull::Yes, false) => Err(CimError::new(
                CimStatus::NotSupported,
                "pull operations are not supported by this server",
            )),
            (UsePull::Yes, true) => Ok(true),
            (UsePull::No, _) => Ok(false),
            (UsePull::Either, supported) => Ok(supported),
        }
    }

    fn enumerate_classes(
        namespace: &MockNamespace,
        requested: &str,
        class_name: Option<&str>,
        names_only: bool,
    ) -> Result<Vec<CimObject>, OperationError> {
        if let Some(name) = class_name
            && namespace.class(name).is_none()
        {
            return Err(
                CimError::new(CimStatus::InvalidClass, format!("class {name} does not exist")).into(),
            );
        }
        Ok(namespace
            .classes
            .iter()
            .filter(|class| match class_name {
                None => true,
                Some(parent) => {
                    !class.name.eq_ignore_ascii_case(parent)
                        && namespace.derives_from(&class.name, parent)
                }
            })
            .map(|class| class_object(requested, class, names_only))
            .collect())
    }

    fn enumerate_instances(
        &self,
        namespace: &MockNamespace,
        requested: &str,
        class_name: &str,
        names_only: bool,
    ) -> Result<Vec<CimObject>, OperationError> {
        if namespace.class(class_name).is_none() {
            return Err(CimError::new(
                CimStatus::InvalidClass,
                format!("class {class_name} does not exist"),
            )
            .into());
        }
        let pull = self.uses_pull()?;
        let objects: Vec<CimObject> = namespace
            .instances
            .iter()
            .filter(|instance| namespace.derives_from(&instance.class_name, class_name))
            .map(|instance| instance_object(requested, instance, names_only))
            .collect();
        if pull {
            let chunk_size = usize::try_from(self.pull_max_cnt).unwrap_or(usize::MAX);
            for (index, chunk) in objects.chunks(chunk_size).enumerate() {
                debug!(
                    target: DISPATCH_TARGET,
                    namespace = requested,
                    chunk = index,
                    objects = chunk.len(),
                    max = self.pull_max_cnt,
                    "pull response"
                );
            }
        }
        Ok(objects)
    }

    fn get_instance(
        namespace: &MockNamespace,
        requested: &str,
        path: &str,
    ) -> Result<Vec<CimObject>, OperationError> {
        let class_name = path.split_once('.').map_or(path, |(class, _)| class);
        if namespace.class(class_name).is_none() {
            return Err(CimError::new(
                CimStatus::InvalidClass,
                format!("class {class_name} does not exist"),
            )
            .into());
        }
        let instance = namespace
            .instances
            .iter()
            .find(|instance| instance.path == path)
            .ok_or_else(|| CimError::new(CimStatus::NotFound, format!("instance {path} not found")))?;
        Ok(vec![instance_object(requested, instance, false)])
    }

    fn count_instances(
        namespace: &MockNamespace,
        requested: &str,
        pattern: Option<&str>,
    ) -> Vec<CimObject> {
        namespace
            .classes
            .iter()
            .filter(|class| pattern.is_none_or(|pattern| glob_matches(pattern, &class.name)))
            .filter_map(|class| {
                let count = namespace
                    .instances
                    .iter()
                    .filter(|instance| instance.class_name.eq_ignore_ascii_case(&class.name))
                    .count();
                (count > 0).then(|| {
                    let mut object = CimObject::new(requested, ObjectKind::Count, class.name.clone());
                    object.properties.insert("count".to_owned(), Value::from(count));
                    object
                })
            })
            .collect()
    }

    fn enumerate_namespaces(&self, requested: &str) -> Vec<CimObject> {
        self.model
            .namespaces
            .iter()
            .map(|namespace| {
                CimObject::new(requested, ObjectKind::Namespace, "CIM_Namespace")
                    .with_path(namespace.name.clone())
            })
            .collect()
    }
}

impl WbemConnection for MockConnection {
    fn perform(
        &mut self,
        namespace: &str,
        operation: &Operation,
    ) -> Result<Vec<CimObject>, OperationError> {
        debug!(target: DISPATCH_TARGET, namespace, operation = operation.name(), "mock request");
        if matches!(operation, Operation::EnumerateNamespaces) {
            if let Some(fault) = self.model.namespace(namespace).and_then(|found| found.fault) {
                return Err(ConnectionError::new(
                    fault.kind(),
                    format!("simulated {} for namespace {namespace}", fault.kind()),
                )
                .into());
            }
            return Ok(self.enumerate_namespaces(namespace));
        }

        let model_namespace = self.namespace(namespace)?;
        match operation {
            Operation::EnumerateClasses {
                class_name,
                names_only,
            } => Self::enumerate_classes(
                model_namespace,
                namespace,
                class_name.as_deref(),
                *names_only,
            ),
            Operation::GetClass { class_name } => model_namespace
                .class(class_name)
                .map(|class| vec![class_object(namespace, class, false)])
                .ok_or_else(|| {
                    OperationError::from(CimError::new(
                        CimStatus::NotFound,
                        format!("class {class_name} not found"),
                    ))
                }),
            Operation::EnumerateInstances {
                class_name,
                names_only,
            } => self.enumerate_instances(model_namespace, namespace, class_name, *names_only),
            Operation::GetInstance { path } => Self::get_instance(model_namespace, namespace, path),
            Operation::CountInstances { class_pattern } => Ok(Self::count_instances(
                model_namespace,
                namespace,
                class_pattern.as_deref(),
            )),
            Operation::EnumerateNamespaces => Ok(self.enumerate_namespaces(namespace)),
        }
    }
}

fn class_object(namespace: &str, class: &MockClass, names_only: bool) -> CimObject {
    if names_only {
        return CimObject::new(namespace, ObjectKind::ClassName, class.name.clone());
    }
    let mut object = CimObject::new(namespace, ObjectKind::Class, class.name.clone());
    object.superclass.clone_from(&class.superclass);
    object.properties = class
        .properties
        .iter()
        .map(|(name, kind)| (name.clone(), Value::String(kind.clone())))
        .collect::<Map<String, Value>>();
    object
}

fn instance_object(namespace: &str, instance: &MockInstance, names_only: bool) -> CimObject {
    let kind = if names_only {
        ObjectKind::InstanceName
    } else {
        ObjectKind::Instance
    };
    let mut object =
        CimObject::new(namespace, kind, instance.class_name.clone()).with_path(instance.path.clone());
    if !names_only {
        object.properties.clone_from(&instance.properties);
    }
    object
}

/// Case-insensitive glob match supporting `*` and `?`.
fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_ascii_lowercase().chars().collect();
    let text: Vec<char> = text.to_ascii_lowercase().chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || Some(&c) == text.get(t) => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern.get(p..).is_some_and(|rest| rest.iter().all(|&c| c == '*'))
}
