// ─── Pipeline Events ───
// Progress and error reports flow from the I/O workers to the caller's thread
// through a channel. The presentation layer only ever sees them on the thread
// that called `run_blocking`.

use std::future::Future;

use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::error::{SetupError, SetupResult};

/// Download completion in percent, or `-1` when the server sent no length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub percent: i32,
}

impl DownloadProgress {
    pub const UNKNOWN: DownloadProgress = DownloadProgress { percent: -1 };

    pub fn from_bytes(received: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                let percent = (received as f64 / total as f64 * 100.0).round();
                Self {
                    percent: percent.clamp(0.0, 100.0) as i32,
                }
            }
            _ => Self::UNKNOWN,
        }
    }

    pub fn is_known(&self) -> bool {
        self.percent >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupEvent {
    Progress(DownloadProgress),
    Error(String),
}

/// Sending half handed to the pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<SetupEvent>,
}

impl EventSink {
    pub fn channel() -> (EventSink, UnboundedReceiver<SetupEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, rx)
    }

    pub fn progress(&self, progress: DownloadProgress) {
        // A closed receiver means nobody is watching anymore.
        let _ = self.tx.send(SetupEvent::Progress(progress));
    }

    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(SetupEvent::Error(message.into()));
    }
}

/// Presentation-side consumer of pipeline events.
pub trait SetupObserver {
    fn on_progress(&mut self, progress: DownloadProgress);
    fn on_error(&mut self, message: &str);
}

fn dispatch(observer: &mut dyn SetupObserver, event: SetupEvent) {
    match event {
        SetupEvent::Progress(progress) => observer.on_progress(progress),
        SetupEvent::Error(message) => observer.on_error(&message),
    }
}

/// Run `job` on the runtime's worker pool and deliver its events to
/// `observer` on the calling thread. Blocks until the job has finished.
///
/// Must not be called from inside the runtime.
pub fn run_blocking<F, Fut, T>(
    runtime: &Runtime,
    observer: &mut dyn SetupObserver,
    job: F,
) -> SetupResult<T>
where
    F: FnOnce(EventSink) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let (sink, mut rx) = EventSink::channel();
    let handle = runtime.spawn(job(sink));

    // The channel closes once the job (and every sink clone) is dropped.
    while let Some(event) = rx.blocking_recv() {
        dispatch(observer, event);
    }

    runtime
        .block_on(handle)
        .map_err(|e| SetupError::Other(format!("Task join error: {e}")))
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut UnboundedReceiver<SetupEvent>) -> Vec<SetupEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
