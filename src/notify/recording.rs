//! Test double for `Notifier`.

use anyhow::bail;
use tokio::sync::mpsc;

use super::{Notifier, NotifyFuture};

/// Records every URL it is asked to notify.
///
/// URLs containing `fail` resolve to an error and URLs containing `panic`
/// panic inside the delivery; both are still recorded first.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    calls: mpsc::UnboundedSender<String>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(&'a self, url: &'a str) -> NotifyFuture<'a> {
        Box::pin(async move {
            let _ = self.calls.send(url.to_owned());
            if url.contains("panic") {
                panic!("notifier panicked for {url}");
            }
            if url.contains("fail") {
                bail!("simulated delivery failure for {url}");
            }
            Ok(())
        })
    }
}
