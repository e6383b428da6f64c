//! Periodic push stream: one synthetic frame per tick until the
//! subscription is cancelled.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::frame::{Field, FieldValues, Frame};
use crate::query::RESPONSE_FRAME;

/// The only path a client may subscribe to.
pub const STREAM_PATH: &str = "stream";

/// Delay between two pushed frames.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Builds the frame pushed on one tick: a single row holding the tick's
/// timestamp and a value alternating between 10 and 20.
pub fn tick_frame(now: DateTime<Utc>, tick: u64) -> Frame {
    Frame {
        name: RESPONSE_FRAME.to_string(),
        fields: vec![
            Field {
                name: "time".to_string(),
                values: FieldValues::Time(vec![now]),
            },
            Field {
                name: "values".to_string(),
                values: FieldValues::Int(vec![10 * (tick as i64 % 2 + 1)]),
            },
        ],
    }
}

/// Pushes one frame per tick into `tx` until the receiving side goes away.
///
/// Cancellation wins over the timer: the loop re-checks the subscriber on
/// every iteration and stops without building another frame once it is
/// gone. A failed push is logged and the loop moves on to the next tick.
pub async fn push_frames(tx: mpsc::Sender<Frame>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            biased;

            () = tx.closed() => {
                info!("subscription cancelled, finish streaming");
                return;
            }
            _ = ticker.tick() => {
                let frame = tick_frame(Utc::now(), tick);
                tick += 1;

                if let Err(error) = tx.send(frame).await {
                    warn!(%error, "failed to push stream frame");
                }
            }
        }
    }
}
