use thiserror::Error;

use crate::{ProcessId, ResourceId};

/// Errors raised by the kernel while scheduling or dispatching.
///
/// None of these can occur for a well-formed model; they exist so a broken
/// process surfaces as an error from `run_until` instead of corrupting the
/// event ordering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid delay {0}: delays must be finite and non-negative")]
    InvalidDelay(f64),

    #[error("cannot schedule at {0}: time is in the past or not finite")]
    InvalidTime(f64),

    #[error("resource {0} does not exist")]
    UnknownResource(ResourceId),

    #[error("process {0} does not exist or has already exited")]
    UnknownProcess(ProcessId),

    #[error("resource {0} released while no unit was in use")]
    ReleaseIdle(ResourceId),
}

pub type SimResult<T> = Result<T, SimError>;
