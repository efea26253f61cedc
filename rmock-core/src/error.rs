use thiserror::Error;

/// Fatal errors raised by lifecycle transitions. A failed transition
/// unwinds everything acquired so far; nothing stays half-held.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not map the register file: {0}")]
    Setup(#[source] std::io::Error),

    #[error("device resource is unavailable")]
    ResourceUnavailable,

    #[error("could not install the interrupt handler: {0}")]
    HandlerInstall(#[source] std::io::Error),

    #[error("transition not allowed from the {0:?} state")]
    State(crate::lifecycle::LifecycleState),
}

/// The trigger send failed on the device side. Register mutations made
/// before the send are left in place, as real hardware could not roll a
/// link transition back either.
#[derive(Debug, Error)]
#[error("trigger delivery failed: {0}")]
pub struct DeliveryError(#[source] pub std::io::Error);
