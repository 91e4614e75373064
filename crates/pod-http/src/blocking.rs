use tokio::runtime::{Handle, RuntimeFlavor};

use pod_order::TransportError;

/// Runs blocking network code from any calling context.
///
/// Outside a runtime `f` runs directly. On a multi-thread runtime worker it
/// runs under `block_in_place`. A current-thread runtime cannot host blocking
/// reqwest calls at all, so that case is refused.
pub(crate) fn run_blocking<T>(f: impl FnOnce() -> T) -> Result<T, TransportError> {
    let Ok(handle) = Handle::try_current() else {
        return Ok(f());
    };
    match handle.runtime_flavor() {
        RuntimeFlavor::MultiThread => Ok(tokio::task::block_in_place(f)),
        RuntimeFlavor::CurrentThread => Err(TransportError::Unavailable(
            "blocking transport called from a current-thread tokio runtime".to_string(),
        )),
        _ => Err(TransportError::Unavailable(
            "blocking transport called from an unsupported tokio runtime flavor".to_string(),
        )),
    }
}
