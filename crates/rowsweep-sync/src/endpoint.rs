//! Per-worker protocol endpoints.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{
    Receiver, RecvTimeoutError, Select, SendTimeoutError, Sender, TryRecvError,
};
use log::{trace, warn};
use rowsweep_core::{CommunicationError, RowIndex, WorkerId};
use rowsweep_space::{CanMerge, PartitionScheme};

use crate::assembler::RowAssembler;
use crate::message::{Downstream, Segment, Upstream};

/// One worker's side of the row synchronization protocol.
///
/// Calls must follow the row order of the sweep: one
/// [`exchange`](Self::exchange) or [`gather`](Self::gather) per row,
/// then a single [`complete`](Self::complete). After any error the
/// endpoint must not be used again.
pub trait RowExchange {
    /// The worker this endpoint belongs to.
    fn worker(&self) -> WorkerId;

    /// Submit this worker's segment and block until the merged row is
    /// available (carried stencils).
    fn exchange(&mut self, segment: Segment) -> Result<Arc<[f64]>, CommunicationError>;

    /// Submit this worker's segment without waiting for a merged row
    /// (stencils with no carried dependency). The coordinator returns
    /// the assembled row; participants return `None`.
    fn gather(&mut self, segment: Segment) -> Result<Option<Vec<f64>>, CommunicationError>;

    /// Finish the run: the coordinator releases every participant,
    /// participants wait to be released.
    fn complete(&mut self) -> Result<(), CommunicationError>;

    /// Abort the run from this worker after a local failure at `row`.
    fn abort(&mut self, row: RowIndex);

    /// Total time spent blocked waiting for peers.
    fn waited(&self) -> Duration;
}

// ── Coordinator ─────────────────────────────────────────────────

/// The merging endpoint. Exactly one exists per mesh.
pub struct Coordinator {
    id: WorkerId,
    inbound: Vec<(WorkerId, Receiver<Upstream>)>,
    outbound: Vec<(WorkerId, Sender<Downstream>)>,
    assembler: RowAssembler,
    timeout: Duration,
    waited: Duration,
}

impl Coordinator {
    pub(crate) fn new(
        _merge: CanMerge,
        scheme: &PartitionScheme,
        inbound: Vec<(WorkerId, Receiver<Upstream>)>,
        outbound: Vec<(WorkerId, Sender<Downstream>)>,
        timeout: Duration,
    ) -> Self {
        Self {
            id: scheme.coordinator(),
            inbound,
            outbound,
            assembler: RowAssembler::new(scheme.clone()),
            timeout,
            waited: Duration::ZERO,
        }
    }

    /// Number of participants this coordinator merges for.
    pub fn participants(&self) -> usize {
        self.inbound.len()
    }

    /// Place the local segment, then receive one segment from every
    /// participant for the same row.
    fn collect(&mut self, own: Segment) -> Result<(), CommunicationError> {
        let row = own.row;
        let Self {
            inbound,
            assembler,
            timeout,
            waited,
            ..
        } = self;

        assembler.reset(row);
        assembler.accept(&own)?;

        let started = Instant::now();
        let deadline = started + *timeout;
        let mut pending: Vec<usize> = (0..inbound.len()).collect();
        let result = loop {
            if pending.is_empty() {
                break Ok(());
            }
            let mut sel = Select::new();
            for &k in &pending {
                sel.recv(&inbound[k].1);
            }
            let wait = deadline.saturating_duration_since(Instant::now());
            let op = match sel.select_timeout(wait) {
                Ok(op) => op,
                Err(_) => {
                    break Err(CommunicationError::Timeout {
                        row,
                        unreachable: pending.iter().map(|&k| inbound[k].0).collect(),
                        waited_ms: started.elapsed().as_millis() as u64,
                    })
                }
            };
            let slot = op.index();
            let (peer, rx) = &inbound[pending[slot]];
            match op.recv(rx) {
                Ok(Upstream::Segment(seg)) => {
                    if seg.sender != *peer {
                        break Err(CommunicationError::Malformed {
                            row,
                            sender: seg.sender,
                            reason: format!("segment sent on the channel of worker {peer}"),
                        });
                    }
                    if let Err(e) = assembler.accept(&seg) {
                        break Err(e);
                    }
                    pending.swap_remove(slot);
                }
                Ok(Upstream::Abort { origin, .. }) => {
                    break Err(CommunicationError::Aborted { row, origin });
                }
                Err(_) => {
                    break Err(CommunicationError::Disconnected {
                        row: Some(row),
                        peer: *peer,
                    });
                }
            }
        };
        *waited += started.elapsed();
        result
    }

    fn broadcast_abort(&self, origin: WorkerId, row: RowIndex) {
        for (peer, tx) in &self.outbound {
            if *peer != origin {
                // A full or closed channel means that peer is already
                // stuck or gone; it will time out or has exited.
                let _ = tx.try_send(Downstream::Abort { origin, row });
            }
        }
    }

    fn fail(&self, row: RowIndex, err: CommunicationError) -> CommunicationError {
        let origin = match &err {
            CommunicationError::Aborted { origin, .. } => *origin,
            _ => self.id,
        };
        warn!("coordinator {} aborting sweep at row {row}: {err}", self.id);
        self.broadcast_abort(origin, row);
        err
    }
}

impl RowExchange for Coordinator {
    fn worker(&self) -> WorkerId {
        self.id
    }

    fn exchange(&mut self, segment: Segment) -> Result<Arc<[f64]>, CommunicationError> {
        let row = segment.row;
        if let Err(e) = self.collect(segment) {
            return Err(self.fail(row, e));
        }
        let values: Arc<[f64]> = match self.assembler.assembled() {
            Some(buf) => Arc::from(buf),
            None => {
                let missing = self.assembler.missing();
                let e = CommunicationError::Malformed {
                    row,
                    sender: missing.first().copied().unwrap_or(self.id),
                    reason: "row incomplete after collection".to_string(),
                };
                return Err(self.fail(row, e));
            }
        };
        for (peer, tx) in &self.outbound {
            let msg = Downstream::Row {
                row,
                values: Arc::clone(&values),
            };
            if tx.send(msg).is_err() {
                let e = CommunicationError::Disconnected {
                    row: Some(row),
                    peer: *peer,
                };
                return Err(self.fail(row, e));
            }
        }
        trace!("row {row} merged and broadcast to {} workers", self.outbound.len());
        Ok(values)
    }

    fn gather(&mut self, segment: Segment) -> Result<Option<Vec<f64>>, CommunicationError> {
        let row = segment.row;
        if let Err(e) = self.collect(segment) {
            return Err(self.fail(row, e));
        }
        trace!("row {row} gathered from {} workers", self.inbound.len() + 1);
        Ok(self.assembler.assembled().map(<[f64]>::to_vec))
    }

    fn complete(&mut self) -> Result<(), CommunicationError> {
        for (peer, tx) in &self.outbound {
            if tx.send(Downstream::Complete).is_err() {
                return Err(CommunicationError::Disconnected {
                    row: None,
                    peer: *peer,
                });
            }
        }
        Ok(())
    }

    fn abort(&mut self, row: RowIndex) {
        warn!("coordinator {} aborting sweep at row {row}", self.id);
        self.broadcast_abort(self.id, row);
    }

    fn waited(&self) -> Duration {
        self.waited
    }
}

// ── Participant ─────────────────────────────────────────────────

/// A non-merging endpoint.
pub struct Participant {
    id: WorkerId,
    coordinator: WorkerId,
    cols: usize,
    outbound: Sender<Upstream>,
    inbound: Receiver<Downstream>,
    timeout: Duration,
    waited: Duration,
    last_row: RowIndex,
    released: bool,
}

impl Participant {
    pub(crate) fn new(
        id: WorkerId,
        scheme: &PartitionScheme,
        outbound: Sender<Upstream>,
        inbound: Receiver<Downstream>,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            coordinator: scheme.coordinator(),
            cols: scheme.cols(),
            outbound,
            inbound,
            timeout,
            waited: Duration::ZERO,
            last_row: RowIndex(0),
            released: false,
        }
    }

    /// The worker this participant reports to.
    pub fn coordinator(&self) -> WorkerId {
        self.coordinator
    }

    /// Blocks only while the coordinator's queue is full, and no longer
    /// than the receive timeout.
    fn send(&mut self, row: RowIndex, segment: Segment) -> Result<(), CommunicationError> {
        let started = Instant::now();
        let sent = self
            .outbound
            .send_timeout(Upstream::Segment(segment), self.timeout);
        self.waited += started.elapsed();
        sent.map_err(|e| match e {
            SendTimeoutError::Timeout(_) => CommunicationError::Timeout {
                row,
                unreachable: vec![self.coordinator],
                waited_ms: started.elapsed().as_millis() as u64,
            },
            SendTimeoutError::Disconnected(_) => CommunicationError::Disconnected {
                row: Some(row),
                peer: self.coordinator,
            },
        })
    }

    fn recv(&mut self, row: RowIndex) -> Result<Downstream, CommunicationError> {
        let started = Instant::now();
        let msg = self.inbound.recv_timeout(self.timeout);
        self.waited += started.elapsed();
        msg.map_err(|e| match e {
            RecvTimeoutError::Timeout => CommunicationError::Timeout {
                row,
                unreachable: vec![self.coordinator],
                waited_ms: started.elapsed().as_millis() as u64,
            },
            RecvTimeoutError::Disconnected => CommunicationError::Disconnected {
                row: Some(row),
                peer: self.coordinator,
            },
        })
    }

    fn malformed(&self, row: RowIndex, reason: String) -> CommunicationError {
        CommunicationError::Malformed {
            row,
            sender: self.coordinator,
            reason,
        }
    }

    fn fail(&mut self, row: RowIndex, err: CommunicationError) -> CommunicationError {
        if !matches!(
            err,
            CommunicationError::Aborted { .. } | CommunicationError::Disconnected { .. }
        ) {
            warn!("worker {} aborting sweep at row {row}: {err}", self.id);
            self.abort(row);
        }
        err
    }
}

impl RowExchange for Participant {
    fn worker(&self) -> WorkerId {
        self.id
    }

    fn exchange(&mut self, segment: Segment) -> Result<Arc<[f64]>, CommunicationError> {
        let row = segment.row;
        self.last_row = row;
        self.send(row, segment).map_err(|e| self.fail(row, e))?;
        let result = match self.recv(row) {
            Ok(Downstream::Row { row: r, values }) if r == row && values.len() == self.cols => {
                Ok(values)
            }
            Ok(Downstream::Row { row: r, values }) => Err(self.malformed(
                row,
                format!("received row {r} with {} values", values.len()),
            )),
            Ok(Downstream::Abort { origin, .. }) => {
                Err(CommunicationError::Aborted { row, origin })
            }
            Ok(Downstream::Complete) => {
                Err(self.malformed(row, "completion before the row was merged".to_string()))
            }
            Err(e) => Err(e),
        };
        result.map_err(|e| self.fail(row, e))
    }

    fn gather(&mut self, segment: Segment) -> Result<Option<Vec<f64>>, CommunicationError> {
        let row = segment.row;
        self.last_row = row;
        self.send(row, segment).map_err(|e| self.fail(row, e))?;
        let result = match self.inbound.try_recv() {
            Err(TryRecvError::Empty) => Ok(None),
            // The coordinator may finish before this participant looks.
            Ok(Downstream::Complete) => {
                self.released = true;
                Ok(None)
            }
            Ok(Downstream::Abort { origin, .. }) => {
                Err(CommunicationError::Aborted { row, origin })
            }
            Ok(Downstream::Row { row: r, .. }) => Err(self.malformed(
                row,
                format!("unexpected row {r} broadcast during a gather"),
            )),
            Err(TryRecvError::Disconnected) => Err(CommunicationError::Disconnected {
                row: Some(row),
                peer: self.coordinator,
            }),
        };
        result.map_err(|e| self.fail(row, e))
    }

    fn complete(&mut self) -> Result<(), CommunicationError> {
        if self.released {
            return Ok(());
        }
        let started = Instant::now();
        let msg = self.inbound.recv_timeout(self.timeout);
        self.waited += started.elapsed();
        match msg {
            Ok(Downstream::Complete) => {
                self.released = true;
                Ok(())
            }
            Ok(Downstream::Abort { origin, row }) => {
                Err(CommunicationError::Aborted { row, origin })
            }
            Ok(Downstream::Row { row, .. }) => Err(CommunicationError::Malformed {
                row,
                sender: self.coordinator,
                reason: "row broadcast after the final row".to_string(),
            }),
            Err(RecvTimeoutError::Timeout) => Err(CommunicationError::Timeout {
                row: self.last_row,
                unreachable: vec![self.coordinator],
                waited_ms: started.elapsed().as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(CommunicationError::Disconnected {
                row: None,
                peer: self.coordinator,
            }),
        }
    }

    fn abort(&mut self, row: RowIndex) {
        let _ = self.outbound.try_send(Upstream::Abort {
            origin: self.id,
            row,
        });
    }

    fn waited(&self) -> Duration {
        self.waited
    }
}

// ── Endpoint ────────────────────────────────────────────────────

/// Either side of the protocol, as handed out by [`mesh`](crate::mesh).
pub enum Endpoint {
    /// The merging worker.
    Coordinator(Coordinator),
    /// Any other worker.
    Participant(Participant),
}

impl Endpoint {
    /// Whether this endpoint merges rows.
    pub fn is_coordinator(&self) -> bool {
        matches!(self, Self::Coordinator(_))
    }

    fn inner(&self) -> &dyn RowExchange {
        match self {
            Self::Coordinator(c) => c,
            Self::Participant(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RowExchange {
        match self {
            Self::Coordinator(c) => c,
            Self::Participant(p) => p,
        }
    }
}

impl RowExchange for Endpoint {
    fn worker(&self) -> WorkerId {
        self.inner().worker()
    }

    fn exchange(&mut self, segment: Segment) -> Result<Arc<[f64]>, CommunicationError> {
        self.inner_mut().exchange(segment)
    }

    fn gather(&mut self, segment: Segment) -> Result<Option<Vec<f64>>, CommunicationError> {
        self.inner_mut().gather(segment)
    }

    fn complete(&mut self) -> Result<(), CommunicationError> {
        self.inner_mut().complete()
    }

    fn abort(&mut self, row: RowIndex) {
        self.inner_mut().abort(row)
    }

    fn waited(&self) -> Duration {
        self.inner().waited()
    }
}
