//! Error types for the rightsizing jobs
//!
//! Every error is fatal to a run: nothing here is retried and there is no
//! partial-results mode. The variants mirror where a run can fail: reading
//! from the cluster, writing VPAs back to it, writing the report, and
//! parsing local configuration.

use thiserror::Error;

use crate::quantity::QuantityError;

#[derive(Error, Debug)]
pub enum Error {
    /// A list or get call against the cluster (or the VPA API) failed
    #[error("Cluster query failed ({context}): {source}")]
    ClusterQueryError {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// Creating a VPA object failed
    #[error("Cluster write failed ({context}): {source}")]
    ClusterWriteError {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// The report could not be serialized or written
    #[error("Failed to write report: {0}")]
    OutputWriteError(String),

    /// Malformed environment or flag input
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A resource quantity returned by the cluster could not be parsed
    #[error("Invalid resource quantity: {0}")]
    QuantityError(#[from] QuantityError),

    /// A VPA object did not match the expected shape
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub fn query(context: impl Into<String>, source: kube::Error) -> Self {
        Error::ClusterQueryError {
            context: context.into(),
            source,
        }
    }

    pub fn write(context: impl Into<String>, source: kube::Error) -> Self {
        Error::ClusterWriteError {
            context: context.into(),
            source,
        }
    }

    /// True when the underlying API call answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::ClusterQueryError { source, .. } | Error::ClusterWriteError { source, .. } => {
                is_not_found(source)
            }
            _ => false,
        }
    }
}

pub(crate) fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::OutputWriteError(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::OutputWriteError(e.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
