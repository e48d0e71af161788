#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time;

use crate::domain::models::Action;
use crate::domain::models::ChatMessage;
use crate::domain::models::Event;
use crate::domain::models::GatewayBox;

fn start_phase_timer(
    seq: u64,
    delay: Duration,
    tx: &mpsc::UnboundedSender<Event>,
) -> AbortHandle {
    let timer_tx = tx.clone();
    let timer = tokio::spawn(async move {
        time::sleep(delay).await;
        // The UI may already be gone, nothing left to update then.
        let _ = timer_tx.send(Event::LoadingPhaseElapsed(seq));
    });

    return timer.abort_handle();
}

fn describe_constellation(
    gateway: GatewayBox,
    seq: u64,
    name: String,
    tx: &mpsc::UnboundedSender<Event>,
) {
    let worker_tx = tx.clone();
    tokio::spawn(async move {
        let request = tokio::spawn(async move {
            return gateway.describe_constellation(&name).await;
        });

        let event = match request.await {
            Ok(details) => Event::ConstellationResolved(seq, details),
            Err(err) => {
                tracing::error!(seq = seq, error = ?err, "describe constellation task failed");
                Event::ConstellationFailed(seq)
            }
        };

        let _ = worker_tx.send(event);
    });
}

fn continue_chat(
    gateway: GatewayBox,
    seq: u64,
    history: Vec<ChatMessage>,
    message: String,
    tx: &mpsc::UnboundedSender<Event>,
) {
    let worker_tx = tx.clone();
    tokio::spawn(async move {
        let request = tokio::spawn(async move {
            return gateway.continue_chat(&history, &message).await;
        });

        let event = match request.await {
            Ok(reply) => Event::ChatReplyResolved(seq, reply),
            Err(err) => {
                tracing::error!(seq = seq, error = ?err, "continue chat task failed");
                Event::ChatReplyFailed(seq)
            }
        };

        let _ = worker_tx.send(event);
    });
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs gateway requests on their own tasks and reports each outcome back
    /// as an `Event`. Returns once the action channel closes.
    pub async fn start(
        gateway: GatewayBox,
        phase_delay: Duration,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut phase_timer: Option<AbortHandle> = None;

        while let Some(action) = rx.recv().await {
            match action {
                Action::DescribeConstellation(seq, name) => {
                    if let Some(timer) = phase_timer.take() {
                        timer.abort();
                    }
                    phase_timer = Some(start_phase_timer(seq, phase_delay, &tx));

                    describe_constellation(gateway.clone(), seq, name, &tx);
                }
                Action::ContinueChat(seq, history, message) => {
                    continue_chat(gateway.clone(), seq, history, message, &tx);
                }
            }
        }

        if let Some(timer) = phase_timer {
            timer.abort();
        }

        return Ok(());
    }
}
