use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::journal::Journal;

/// Waits for an interrupt signal sent to the process, leaves one trace in
/// the journal and one on the console, then cancels the token so the tick
/// loop stops. Tolerates the journal being closed or disabled.
///
/// On Windows detached processes can't detect signals sent to them, so this
/// works with limited success there.
pub async fn watch_shutdown(journal: Arc<Journal>, cancellation: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            journal.warning("Process was killed irregularly!");
            println!();
            println!("Process was killed irregularly!");
        }
        Err(e) => {
            error!("Couldn't listen for the interrupt signal {e:?}");
        }
    }
    cancellation.cancel();
}
