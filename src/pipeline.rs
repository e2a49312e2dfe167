//! Detached trigger evaluation.
//!
//! Ingestion hands each committed reading to an `EvaluationQueue`, which never
//! blocks and never fails the caller. A single `EvaluationWorker` receives the
//! readings and runs every job on its own task: fetch the owner's triggers,
//! evaluate them, and deliver one notification per fired trigger. Nothing that
//! happens here is reported back to the ingestion request. Once the queue is
//! closed the worker finishes every job it has received before stopping.

use std::sync::Arc;

use anyhow::Result;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinSet},
};
use tracing::{error, info, warn};

use crate::{
    db::{models::Reading, Store},
    notify::Dispatcher,
    triggers,
};

/// Create a connected queue/worker pair. Spawn `EvaluationWorker::run` once.
pub fn evaluation_queue(
    store: Arc<dyn Store>,
    dispatcher: Dispatcher,
) -> (EvaluationQueue, EvaluationWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EvaluationQueue { tx },
        EvaluationWorker { rx, store, dispatcher },
    )
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EvaluationQueue {
    tx: mpsc::UnboundedSender<Reading>,
}

impl EvaluationQueue {
    /// Enqueue a committed reading for evaluation.
    pub fn submit(&self, reading: Reading) {
        if let Err(mpsc::error::SendError(reading)) = self.tx.send(reading) {
            warn!(
                reading_id = %reading.id,
                device_id = %reading.device_id,
                "Evaluation worker is not running; reading will not be evaluated"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

pub struct EvaluationWorker {
    rx: mpsc::UnboundedReceiver<Reading>,
    store: Arc<dyn Store>,
    dispatcher: Dispatcher,
}

impl EvaluationWorker {
    /// Runs until every `EvaluationQueue` handle is dropped, then waits for
    /// the evaluations already started before returning.
    pub async fn run(mut self) {
        info!("Evaluation worker started");
        let mut jobs = JoinSet::new();

        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(reading) => {
                        jobs.spawn(evaluate_job(
                            Arc::clone(&self.store),
                            self.dispatcher.clone(),
                            reading,
                        ));
                    }
                    None => break,
                },
                Some(finished) = jobs.join_next(), if !jobs.is_empty() => reap(finished),
            }
        }

        info!(pending = jobs.len(), "Evaluation queue closed; draining jobs");
        while let Some(finished) = jobs.join_next().await {
            reap(finished);
        }

        info!("Evaluation worker stopped");
    }
}

async fn evaluate_job(store: Arc<dyn Store>, dispatcher: Dispatcher, reading: Reading) {
    match process(store.as_ref(), &dispatcher, &reading).await {
        Ok(report) => info!(
            reading_id = %reading.id,
            device_id = %reading.device_id,
            triggers = report.triggers,
            fired = report.fired,
            absent = report.absent,
            invalid = report.invalid,
            delivered = report.delivered,
            failed = report.failed,
            "Triggers evaluated"
        ),
        Err(e) => error!(
            reading_id = %reading.id,
            device_id = %reading.device_id,
            error = ?e,
            "Failed to evaluate triggers"
        ),
    }
}

fn reap(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        error!(error = %e, "Evaluation job aborted");
    }
}

// ---------------------------------------------------------------------------
// Single evaluation pass
// ---------------------------------------------------------------------------

/// Counters for one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub triggers: usize,
    pub fired: usize,
    pub absent: usize,
    pub invalid: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Evaluate `reading` against its owner's triggers and deliver notifications.
///
/// Returns an error only when the trigger lookup fails. Deliveries run
/// concurrently; a failing or panicking delivery counts as `failed` and does
/// not affect the others.
pub async fn process(
    store: &dyn Store,
    dispatcher: &Dispatcher,
    reading: &Reading,
) -> Result<EvaluationReport> {
    let all = store
        .find_triggers(&reading.user_id, &reading.device_id)
        .await?;

    let evaluation = triggers::evaluate(reading, &all);
    let mut report = EvaluationReport {
        triggers: all.len(),
        fired: evaluation.fired.len(),
        absent: evaluation.absent,
        invalid: evaluation.invalid,
        ..EvaluationReport::default()
    };

    let mut deliveries = JoinSet::new();
    for trigger in evaluation.fired {
        deliveries.spawn(dispatcher.deliver(trigger.clone()));
    }

    while let Some(outcome) = deliveries.join_next().await {
        match outcome {
            Ok(true) => report.delivered += 1,
            Ok(false) => report.failed += 1,
            Err(e) => {
                error!(reading_id = %reading.id, error = %e, "Trigger delivery task aborted");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
