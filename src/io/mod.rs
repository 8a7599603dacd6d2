/*!
 * Standard Stream Control
 *
 * OS-level suppression of stdout/stderr that is safe across nested scopes
 * and concurrent threads. Unix only.
 */

mod descriptor;
mod state;
mod suppress;

pub use descriptor::{RedirectedFd, StdStream};
pub use suppress::{StreamSuppressor, SuppressFlags, SuppressGuard, SUPPRESSOR_KEY};
