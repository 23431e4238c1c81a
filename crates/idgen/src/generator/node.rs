use core::{fmt, time::Duration};

use crate::{
    DEFAULT_NODE_ID, EPOCH, Error, Generator, Id, IdGenStatus, LockSnowflakeGenerator,
    MonotonicClock, NodeId, Result, SnowflakeGenerator, SnowflakeId,
};

/// A blocking front end over a [`SnowflakeGenerator`].
///
/// `Node` turns the poll-level [`IdGenStatus`] protocol into plain calls that
/// return a [`SnowflakeId`]. It is `Sync` whenever the wrapped generator is,
/// so one `Node` can be shared across threads behind an `Arc`.
///
/// The default generator is a [`LockSnowflakeGenerator`] over a
/// [`MonotonicClock`] anchored at [`EPOCH`].
///
/// # Clock rollback
///
/// A timestamp earlier than one already handed out is never used.
/// [`Node::produce`] waits for the clock to catch up, while
/// [`Node::try_produce`] returns [`Error::ClockMovedBackwards`] right away.
///
/// # Example
/// ```
/// use idgen::Node;
///
/// let node = Node::new(42).unwrap();
/// let a = node.produce();
/// let b = node.produce();
/// assert!(b > a);
/// assert_eq!(a.node_id(), 42);
/// ```
pub struct Node<G = LockSnowflakeGenerator<MonotonicClock>> {
    generator: G,
}

impl Node {
    /// Creates a node with the default generator.
    ///
    /// # Errors
    /// - [`Error::InvalidNodeId`] if `node_id` is outside `[0, 1023]`
    /// - [`Error::ClockBeforeEpoch`] if the system clock reads earlier than
    ///   [`EPOCH`]
    pub fn new(node_id: i64) -> Result<Self> {
        let node_id = NodeId::new(node_id)?;
        let clock = MonotonicClock::try_with_epoch(EPOCH)?;
        Ok(Self::from_generator(LockSnowflakeGenerator::new(
            node_id, clock,
        )))
    }

    /// Creates a node with [`DEFAULT_NODE_ID`], for single-node deployments.
    ///
    /// # Errors
    /// - [`Error::ClockBeforeEpoch`] if the system clock reads earlier than
    ///   [`EPOCH`]
    pub fn standalone() -> Result<Self> {
        Self::new(i64::from(DEFAULT_NODE_ID.get()))
    }
}

impl<G> Node<G>
where
    G: SnowflakeGenerator,
{
    /// Wraps an already constructed generator.
    pub fn from_generator(generator: G) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(node_id = generator.node_id().get(), "node created");
        Self { generator }
    }

    pub fn node_id(&self) -> NodeId {
        self.generator.node_id()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Produces the next ID, blocking while the sequence is exhausted or the
    /// clock is behind.
    ///
    /// # Panics
    /// Panics once the clock runs past the 41-bit timestamp field (in the
    /// year 2080 with the default epoch). No further unique IDs exist at
    /// that point.
    pub fn produce(&self) -> SnowflakeId {
        match self.poll_until_ready(true) {
            Ok(id) => id,
            Err(e) => panic!("snowflake generator exhausted: {e}"),
        }
    }

    /// Produces the next ID, blocking only while the sequence is exhausted.
    ///
    /// # Errors
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last timestamp used. The generator state is untouched and the call
    ///   may be retried.
    /// - [`Error::TimestampOverflow`] once the clock runs past the 41-bit
    ///   timestamp field.
    pub fn try_produce(&self) -> Result<SnowflakeId> {
        self.poll_until_ready(false)
    }

    fn poll_until_ready(&self, wait_on_rollback: bool) -> Result<SnowflakeId> {
        let mut warned = false;
        loop {
            match self.generator.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => backoff(yield_for),
                IdGenStatus::ClockBehind { behind } => {
                    if !warned {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            node_id = self.node_id().get(),
                            behind_ms = behind,
                            waiting = wait_on_rollback,
                            "clock moved backwards"
                        );
                        warned = true;
                    }
                    if !wait_on_rollback {
                        return Err(Error::ClockMovedBackwards { behind_ms: behind });
                    }
                    std::thread::sleep(Duration::from_millis(behind));
                }
            }
        }
    }
}

fn backoff(yield_for: u64) {
    match yield_for {
        // lost a race, the state has already moved on
        0 => core::hint::spin_loop(),
        _ => std::thread::yield_now(),
    }
}

impl<G> Generator for Node<G>
where
    G: SnowflakeGenerator + Send + Sync,
{
    fn generate(&self) -> Id {
        Id::from(self.produce())
    }
}

impl<G> fmt::Debug for Node<G>
where
    G: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("generator", &self.generator)
            .finish()
    }
}
