//! Watch multiplex: fan-in of per-partition watch streams into one channel.

use crate::error::Result;
use crate::partition::{Partition, PartitionStore, WatchEvent, WatchRequest};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const CHANNEL_BUFFER: usize = 64;

/// Open one watch per partition and forward every event onto a single
/// output channel, arbitrarily interleaved.
///
/// If any partition fails to open its watch, every already-opened upstream
/// is cancelled and the error is returned; none of this function's callers
/// see a partial multiplex. Once open, an error from any single partition's
/// stream cancels every sibling and the output closes once all of them have
/// drained; the caller observes the channel closing and must redrive.
pub async fn multiplex(
    partitions: Vec<(Partition, Arc<dyn PartitionStore>)>,
    request: WatchRequest,
    cancel: CancellationToken,
) -> Result<mpsc::Receiver<Result<WatchEvent>>> {
    let mut streams = Vec::with_capacity(partitions.len());
    for (partition, store) in &partitions {
        match store.watch(request.clone(), cancel.clone()).await {
            Ok(stream) => streams.push(stream),
            Err(e) => {
                warn!(partition = %partition.name, error = %e, "failed to open partition watch, aborting multiplex");
                cancel.cancel();
                return Err(e);
            }
        }
    }

    let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
    for mut stream in streams {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                let failed = event.is_err();
                if tx.send(event).await.is_err() {
                    return;
                }
                if failed {
                    cancel.cancel();
                    return;
                }
            }
        });
    }
    drop(tx);

    Ok(rx)
}
