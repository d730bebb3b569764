//! Wiring endpoints together over crossbeam channels.

use std::time::Duration;

use crossbeam_channel::bounded;
use log::debug;
use rowsweep_space::{PartitionScheme, Role};

use crate::endpoint::{Coordinator, Endpoint, Participant};

/// Default bound on every protocol receive.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Participants wait this many times the receive timeout.
///
/// The coordinator is the one that names unreachable workers; the longer
/// participant bound lets its abort arrive before a participant's own
/// timeout fires.
pub const PARTICIPANT_GRACE: u32 = 2;

/// Capacity of each participant ↔ coordinator channel.
///
/// In a carried sweep at most one row is in flight per direction; a
/// gather-only sweep lets participants run this many rows ahead of the
/// coordinator before `send` blocks.
pub const ROW_CHANNEL_CAPACITY: usize = 64;

/// Build one endpoint per worker, in worker order.
///
/// The coordinator is whichever worker `scheme.roles()` hands the
/// [`CanMerge`](rowsweep_space::CanMerge) capability to. Each
/// participant gets a private pair of channels to the coordinator, so
/// every message's sender is known from the channel it arrives on.
///
/// ```
/// use std::time::Duration;
/// use rowsweep_space::PartitionScheme;
/// use rowsweep_sync::{mesh, RowExchange};
///
/// let scheme = PartitionScheme::new(8, 3).unwrap();
/// let endpoints = mesh(&scheme, Duration::from_secs(1));
/// assert_eq!(endpoints.len(), 3);
/// assert!(endpoints[0].is_coordinator());
/// assert_eq!(endpoints[2].worker().0, 2);
/// ```
pub fn mesh(scheme: &PartitionScheme, timeout: Duration) -> Vec<Endpoint> {
    let mut endpoints = Vec::with_capacity(scheme.len());
    let mut inbound = Vec::new();
    let mut outbound = Vec::new();
    let mut merge = None;
    let participant_timeout = timeout.saturating_mul(PARTICIPANT_GRACE);

    for (worker, role) in scheme.roles() {
        match role {
            Role::Coordinator(can_merge) => merge = Some((endpoints.len(), can_merge)),
            Role::Participant => {
                let (up_tx, up_rx) = bounded(ROW_CHANNEL_CAPACITY);
                let (down_tx, down_rx) = bounded(ROW_CHANNEL_CAPACITY);
                inbound.push((worker, up_rx));
                outbound.push((worker, down_tx));
                endpoints.push(Endpoint::Participant(Participant::new(
                    worker,
                    scheme,
                    up_tx,
                    down_rx,
                    participant_timeout,
                )));
            }
        }
    }

    // roles() always mints exactly one coordinator.
    if let Some((slot, can_merge)) = merge {
        let coordinator = Coordinator::new(can_merge, scheme, inbound, outbound, timeout);
        endpoints.insert(slot, Endpoint::Coordinator(coordinator));
    }

    debug!(
        "mesh built: {} workers, coordinator {}, timeout {:?}",
        scheme.len(),
        scheme.coordinator(),
        timeout
    );
    endpoints
}
