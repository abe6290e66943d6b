//! Background task that drives the [`Evaluator`] from the event bus.

use std::sync::Arc;

use stride_events::{BehaviorEvent, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::engine::Evaluator;

/// Subscribe to the bus and evaluate badges for every event.
///
/// Spawned once at startup, before the server accepts traffic. A lagged
/// receiver (burst larger than the channel buffer) drops events; that is
/// tolerable because evaluation recomputes from aggregates, so the next
/// event for the same subject converges to the same state.
pub fn spawn_engine_listener(bus: Arc<EventBus>, evaluator: Evaluator) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        tracing::info!("Achievement engine listener started");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let user_id = event.user_id();
                    let result = match event {
                        BehaviorEvent::Recorded { .. } => {
                            evaluator.on_behavior_recorded(user_id).await
                        }
                        BehaviorEvent::Reevaluate { .. } => {
                            evaluator.on_scheduled_reevaluation(user_id).await
                        }
                    };
                    if let Err(e) = result {
                        tracing::error!(user_id, error = %e, "Achievement evaluation failed");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Engine listener lagged, events dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Event bus closed, engine listener stopping");
                    break;
                }
            }
        }
    })
}
