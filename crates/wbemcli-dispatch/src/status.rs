//! CIM status codes as defined by DSP0200.

use strum::{Display, EnumString, FromRepr};

/// Server-reported CIM status code.
///
/// The display form is the protocol name (`CIM_ERR_INVALID_NAMESPACE`); the
/// discriminant is the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[repr(u16)]
pub enum CimStatus {
    #[strum(serialize = "CIM_ERR_FAILED")]
    Failed = 1,
    #[strum(serialize = "CIM_ERR_ACCESS_DENIED")]
    AccessDenied = 2,
    #[strum(serialize = "CIM_ERR_INVALID_NAMESPACE")]
    InvalidNamespace = 3,
    #[strum(serialize = "CIM_ERR_INVALID_PARAMETER")]
    InvalidParameter = 4,
    #[strum(serialize = "CIM_ERR_INVALID_CLASS")]
    InvalidClass = 5,
    #[strum(serialize = "CIM_ERR_NOT_FOUND")]
    NotFound = 6,
    #[strum(serialize = "CIM_ERR_NOT_SUPPORTED")]
    NotSupported = 7,
    #[strum(serialize = "CIM_ERR_CLASS_HAS_CHILDREN")]
    ClassHasChildren = 8,
    #[strum(serialize = "CIM_ERR_CLASS_HAS_INSTANCES")]
    ClassHasInstances = 9,
    #[strum(serialize = "CIM_ERR_INVALID_SUPERCLASS")]
    InvalidSuperclass = 10,
    #[strum(serialize = "CIM_ERR_ALREADY_EXISTS")]
    AlreadyExists = 11,
    #[strum(serialize = "CIM_ERR_NO_SUCH_PROPERTY")]
    NoSuchProperty = 12,
    #[strum(serialize = "CIM_ERR_TYPE_MISMATCH")]
    TypeMismatch = 13,
    #[strum(serialize = "CIM_ERR_QUERY_LANGUAGE_NOT_SUPPORTED")]
    QueryLanguageNotSupported = 14,
    #[strum(serialize = "CIM_ERR_INVALID_QUERY")]
    InvalidQuery = 15,
    #[strum(serialize = "CIM_ERR_METHOD_NOT_AVAILABLE")]
    MethodNotAvailable = 16,
    #[strum(serialize = "CIM_ERR_METHOD_NOT_FOUND")]
    MethodNotFound = 17,
    #[strum(serialize = "CIM_ERR_NAMESPACE_NOT_EMPTY")]
    NamespaceNotEmpty = 20,
    #[strum(serialize = "CIM_ERR_INVALID_ENUMERATION_CONTEXT")]
    InvalidEnumerationContext = 21,
    #[strum(serialize = "CIM_ERR_INVALID_OPERATION_TIMEOUT")]
    InvalidOperationTimeout = 22,
    #[strum(serialize = "CIM_ERR_PULL_HAS_BEEN_ABANDONED")]
    PullHasBeenAbandoned = 23,
    #[strum(serialize = "CIM_ERR_PULL_CANNOT_BE_ABANDONED")]
    PullCannotBeAbandoned = 24,
    #[strum(serialize = "CIM_ERR_FILTERED_ENUMERATION_NOT_SUPPORTED")]
    FilteredEnumerationNotSupported = 25,
    #[strum(serialize = "CIM_ERR_CONTINUATION_ON_ERROR_NOT_SUPPORTED")]
    ContinuationOnErrorNotSupported = 26,
    #[strum(serialize = "CIM_ERR_SERVER_LIMITS_EXCEEDED")]
    ServerLimitsExceeded = 27,
    #[strum(serialize = "CIM_ERR_SERVER_IS_SHUTTING_DOWN")]
    ServerIsShuttingDown = 28,
}

impl CimStatus {
    /// Numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Looks up a status by numeric code.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::from_repr(code)
    }
}
