// src/watch/watcher.rs

//! The event-consumption path.

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::RunHandle;
use crate::errors::WarError;
use crate::watch::event::EventTranslator;
use crate::watch::notifier::{Notifier, NotifierEvents, NotifierMessage};
use crate::watch::tree::WatchTree;

/// Spawn the loop that drains notifier events into the watch tree and raises
/// run triggers.
///
/// - With `cancel_last`, every trigger first performs a synchronous
///   cancellation round-trip, so a fresh trigger is never posted while an old
///   run is still being torn down.
/// - The loop stops when `stop` flips to `true` or the event stream ends.
/// - A notifier-internal error is reported through `fatal_tx` and ends the
///   loop.
///
/// The tree (and with it the OS notifier) is dropped when the loop exits.
pub fn spawn_event_loop<N>(
    mut tree: WatchTree<N>,
    mut events: NotifierEvents,
    handle: RunHandle,
    cancel_last: bool,
    mut stop: watch::Receiver<bool>,
    fatal_tx: oneshot::Sender<WarError>,
) -> JoinHandle<()>
where
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        debug!("event loop started");
        let mut translator = EventTranslator::new();

        loop {
            let msg = tokio::select! {
                biased;
                _ = stop.wait_for(|stopped| *stopped) => None,
                msg = events.recv() => msg,
            };

            let Some(msg) = msg else {
                break;
            };

            match msg {
                NotifierMessage::Event(event) => {
                    'event: for watch_event in translator.translate(&event) {
                        for trigger in tree.on_event(&watch_event) {
                            // A removed subtree can raise many triggers; stop
                            // posting them once shutdown has begun.
                            if *stop.borrow() {
                                break 'event;
                            }
                            debug!(path = %trigger.path.display(), cause = ?trigger.cause, "run trigger");
                            if cancel_last {
                                handle.cancel_run().await;
                            }
                            handle.notify_run();
                        }
                    }
                }
                NotifierMessage::Error(err) => {
                    error!(error = %err, "file notifier failed");
                    let _ = fatal_tx.send(WarError::Notifier(err));
                    break;
                }
            }
        }

        info!(entries = tree.len(), "event loop finished; closing notifier");
    })
}
