use crate::{candidate_path, DiscoveryEvent, PatchPipeline};
use log::{debug, trace, warn};
use routefog_manifest::RouteTree;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use url::Url;

/// Tuning for the discovery loop.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Quiescence window: render events arriving within this of each other
    /// collapse into one batched request. A single render pass can mutate
    /// the document many times in quick succession.
    pub debounce: Duration,

    /// The host signalled a reduced-data preference; activation becomes a
    /// no-op and nothing is ever registered.
    pub save_data: bool,

    /// Origin used for same-origin candidate filtering.
    pub origin: Url,
}

impl ObserverConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            debounce: Duration::from_millis(100),
            save_data: false,
            origin,
        }
    }
}

enum ObserverCommand {
    Shutdown,
}

/// Watches the host's render events for discoverable links and forms and
/// batch-fetches the paths they point at.
///
/// Teardown stops the loop and its pending debounce deadline, but an
/// in-flight fetch completes and its merge still applies — monotonic
/// manifest growth is harmless after deactivation.
pub struct DiscoveryObserver {
    event_tx: Option<mpsc::Sender<DiscoveryEvent>>,
    command_tx: Option<mpsc::Sender<ObserverCommand>>,
}

impl DiscoveryObserver {
    /// Install the observer. With `save_data` set no loop is spawned and
    /// every event is dropped.
    pub fn start<T: RouteTree + 'static>(
        pipeline: PatchPipeline<T>,
        config: ObserverConfig,
    ) -> Self {
        if config.save_data {
            debug!("reduced-data preference set; route discovery disabled");
            return Self {
                event_tx: None,
                command_tx: None,
            };
        }

        let (event_tx, event_rx) = mpsc::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(16);
        spawn_discovery_loop(pipeline, config, event_rx, command_rx);
        Self {
            event_tx: Some(event_tx),
            command_tx: Some(command_tx),
        }
    }

    /// Queue a render event. Silently dropped when discovery is disabled
    /// or already shut down.
    pub async fn observe(&self, event: DiscoveryEvent) {
        if let Some(tx) = &self.event_tx {
            if tx.send(event).await.is_err() {
                trace!("discovery loop gone; dropping event");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.event_tx.is_some()
    }

    /// Disconnect the observer.
    pub async fn shutdown(&self) {
        if let Some(tx) = &self.command_tx {
            let _ = tx.send(ObserverCommand::Shutdown).await;
        }
    }
}

impl Drop for DiscoveryObserver {
    fn drop(&mut self) {
        if let Some(tx) = &self.command_tx {
            let _ = tx.try_send(ObserverCommand::Shutdown);
        }
    }
}

fn spawn_discovery_loop<T: RouteTree + 'static>(
    pipeline: PatchPipeline<T>,
    config: ObserverConfig,
    mut event_rx: mpsc::Receiver<DiscoveryEvent>,
    mut command_rx: mpsc::Receiver<ObserverCommand>,
) {
    tokio::spawn(async move {
        let mut state = DebounceState::new(config.debounce);

        loop {
            let next_deadline = state.next_deadline();

            tokio::select! {
                Some(event) = event_rx.recv() => {
                    if handle_event(&config.origin, event, &pipeline) {
                        state.record_event();
                    }
                }
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        ObserverCommand::Shutdown => break,
                    }
                }
                () = async {
                    if let Some(deadline) = next_deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if next_deadline.is_some() => {
                    state.reset();
                    let batch = pipeline.knowledge().drain_pending();
                    if batch.is_empty() {
                        continue;
                    }
                    // A failed background prefetch must never break
                    // navigation: log it and let the paths retry on the
                    // next debounce cycle (they settled in neither set).
                    if let Err(err) = pipeline.fetch_and_merge(batch).await {
                        warn!("background patch fetch failed: {err}");
                    }
                }
            }
        }

        debug!("discovery loop stopped");
    });
}

/// Returns true when the event registered a new candidate.
fn handle_event<T: RouteTree>(
    origin: &Url,
    event: DiscoveryEvent,
    pipeline: &PatchPipeline<T>,
) -> bool {
    match event {
        DiscoveryEvent::ElementRendered {
            kind,
            target,
            opt_out,
        } => {
            if opt_out {
                return false;
            }
            match candidate_path(origin, &target) {
                Some(path) => {
                    trace!("registering {kind:?} candidate {path}");
                    pipeline.knowledge().register_candidate(&path);
                    true
                }
                None => false,
            }
        }
        DiscoveryEvent::ElementRemoved { target } => {
            if let Some(path) = candidate_path(origin, &target) {
                pipeline.knowledge().deregister_candidate(&path);
            }
            false
        }
    }
}

struct DebounceState {
    debounce: Duration,
    dirty: bool,
    last_event: Option<time::Instant>,
}

impl DebounceState {
    fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            dirty: false,
            last_event: None,
        }
    }

    fn record_event(&mut self) {
        self.last_event = Some(time::Instant::now());
        self.dirty = true;
    }

    fn next_deadline(&self) -> Option<time::Instant> {
        if !self.dirty {
            return None;
        }
        self.last_event.map(|last| last + self.debounce)
    }

    fn reset(&mut self) {
        self.dirty = false;
        self.last_event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::DebounceState;
    use std::time::Duration;

    #[tokio::test]
    async fn debounce_generates_deadline_after_event() {
        let mut state = DebounceState::new(Duration::from_millis(100));
        assert!(state.next_deadline().is_none());

        state.record_event();
        assert!(state.next_deadline().is_some());

        state.reset();
        assert!(state.next_deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn each_event_pushes_the_deadline_out() {
        let mut state = DebounceState::new(Duration::from_millis(100));
        state.record_event();
        let first = state.next_deadline().unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;
        state.record_event();
        let second = state.next_deadline().unwrap();

        assert!(second > first);
        assert_eq!(second - first, Duration::from_millis(50));
    }
}
