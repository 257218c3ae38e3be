use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Sender half of the in-process event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Events emitted after a state change has committed. Consumers must treat
/// them as notifications, not as the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Job lifecycle events
    JobAssigned {
        job_id: i64,
        mechanic_id: i64,
    },
    JobStarted(i64),
    JobRequeued(i64),
    JobCompleted {
        job_id: i64,
        final_cost: Option<Decimal>,
        parts_consumed: usize,
    },
    JobCancelled(i64),

    // Inventory events
    StockAdjusted {
        part_id: i64,
        old_quantity: i32,
        new_quantity: i32,
        below_minimum: bool,
    },

    // Payroll events
    PaymentSettled {
        payment_id: i64,
        mechanic_id: i64,
        jobs_settled: usize,
        total_amount: Decimal,
    },
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the receiver; spawned once at startup.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::StockAdjusted {
                part_id,
                new_quantity,
                below_minimum: true,
                ..
            } => {
                warn!(
                    part_id = %part_id,
                    quantity = %new_quantity,
                    "Part stock fell below its minimum threshold"
                );
            }
            _ => info!(?event, "Processing event"),
        }
    }
    info!("Event channel closed; event processor shutting down");
}
