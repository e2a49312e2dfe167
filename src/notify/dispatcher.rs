use std::{future::Future, sync::Arc};

use tracing::{debug, warn};

use super::Notifier;
use crate::db::models::Trigger;

/// Sends one notification per fired trigger.
///
/// Deliveries are fire-and-forget: failures are logged and reported back as
/// `false`, never retried and never propagated.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Build the delivery for `trigger`. The returned future owns everything
    /// it needs so it can be spawned on its own task.
    pub fn deliver(&self, trigger: Trigger) -> impl Future<Output = bool> + Send + 'static {
        let notifier = Arc::clone(&self.notifier);
        async move {
            match notifier.notify(&trigger.post_url).await {
                Ok(()) => {
                    debug!(
                        trigger_id = %trigger.id,
                        url = %trigger.post_url,
                        "Trigger notification sent"
                    );
                    true
                }
                Err(e) => {
                    warn!(
                        trigger_id = %trigger.id,
                        url = %trigger.post_url,
                        error = ?e,
                        "Trigger notification failed"
                    );
                    false
                }
            }
        }
    }
}
