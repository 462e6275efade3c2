//! Reading the party straight out of emulator RAM.
//!
//! The core never talks to an emulator itself; callers plug one in through
//! [`MemorySource`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{GameLayout, MemoryAddresses};
use crate::party::PartyRecord;

/// Invoked by a source whenever emulator memory may have changed.
pub type ChangeCallback = Box<dyn FnMut() + Send>;

pub trait MemorySource {
    /// Opens the connection to the emulator. Called once before any read.
    fn connect(&mut self) -> Result<(), CoreError> {
        Ok(())
    }

    fn read_byte(&mut self, addr: u32) -> Result<u8, CoreError>;
    fn read_bytes(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, CoreError>;

    /// Registers `on_change` for memory-change notifications. Returns
    /// `false` when the source cannot notify, in which case callers must
    /// re-read on every poll.
    fn subscribe(&mut self, on_change: ChangeCallback) -> Result<bool, CoreError> {
        let _ = on_change;
        Ok(false)
    }

    fn unsubscribe(&mut self) {}
}

/// A RAM image mapped at `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceMemory {
    base: u32,
    bytes: Vec<u8>,
}

impl SliceMemory {
    pub fn new(base: u32, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn offset(&self, addr: u32, len: usize) -> Result<usize, CoreError> {
        let start = addr.checked_sub(self.base).map(|o| o as usize);
        match start {
            Some(start) if start + len <= self.bytes.len() => Ok(start),
            _ => Err(CoreError::new(
                CoreErrorCode::Io,
                format!(
                    "read of {len} bytes at 0x{addr:08X} outside mapped range 0x{:08X}..0x{:08X}",
                    self.base,
                    self.base as usize + self.bytes.len()
                ),
            )),
        }
    }
}

impl MemorySource for SliceMemory {
    fn read_byte(&mut self, addr: u32) -> Result<u8, CoreError> {
        let at = self.offset(addr, 1)?;
        Ok(self.bytes[at])
    }

    fn read_bytes(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, CoreError> {
        let at = self.offset(addr, len)?;
        Ok(self.bytes[at..at + len].to_vec())
    }
}

fn addresses(layout: &GameLayout) -> Result<MemoryAddresses, CoreError> {
    layout.memory.ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::InvalidInput,
            format!("{} has no known party memory addresses", layout.name),
        )
    })
}

/// Raw party region: the clamped count followed by that many records.
fn read_party_bytes<S: MemorySource + ?Sized>(
    source: &mut S,
    layout: &GameLayout,
) -> Result<Vec<u8>, CoreError> {
    let addrs = addresses(layout)?;
    let count = (source.read_byte(addrs.party_count)? as usize).min(layout.max_party_size);
    let mut raw = Vec::with_capacity(1 + count * layout.record_size);
    raw.push(count as u8);
    raw.extend(source.read_bytes(addrs.party_data, count * layout.record_size)?);
    trace!(count, "read party region from memory");
    Ok(raw)
}

fn decode_party_bytes(raw: &[u8], layout: &GameLayout) -> Result<Vec<PartyRecord>, CoreError> {
    let Some((&count, data)) = raw.split_first() else {
        return Ok(Vec::new());
    };
    let mut party = Vec::with_capacity(count as usize);
    for slot in 0..count as usize {
        let start = slot * layout.record_size;
        let record = PartyRecord::from_bytes(data.get(start..).unwrap_or_default(), layout)?;
        if record.is_empty() {
            break;
        }
        party.push(record);
    }
    Ok(party)
}

/// Reads the live party using the layout's RAM addresses.
pub fn read_party_from_memory<S: MemorySource + ?Sized>(
    source: &mut S,
    layout: &GameLayout,
) -> Result<Vec<PartyRecord>, CoreError> {
    let raw = read_party_bytes(source, layout)?;
    decode_party_bytes(&raw, layout)
}

/// Caller-driven poller that reports the party only when it changes.
///
/// When the source supports change notifications the watcher subscribes on
/// creation and skips the memory read until a notification arrives. The
/// subscription is released by [`PartyWatcher::stop`] or on drop.
pub struct PartyWatcher<S: MemorySource> {
    source: S,
    layout: &'static GameLayout,
    last: Option<Vec<u8>>,
    dirty: Arc<AtomicBool>,
    subscribed: bool,
    stopped: bool,
}

impl<S: MemorySource> PartyWatcher<S> {
    pub fn new(mut source: S, layout: &'static GameLayout) -> Result<Self, CoreError> {
        addresses(layout)?;
        source.connect()?;

        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let subscribed = source.subscribe(Box::new(move || flag.store(true, Ordering::Release)))?;
        debug!(subscribed, "party watcher started");

        Ok(Self {
            source,
            layout,
            last: None,
            dirty,
            subscribed,
            stopped: false,
        })
    }

    /// Re-reads the party. Returns `Some` on the first poll and whenever the
    /// bytes differ from the previous read; `None` once stopped. A subscribed
    /// watcher only re-reads after the source has signalled a change.
    pub fn poll(&mut self) -> Result<Option<Vec<PartyRecord>>, CoreError> {
        if self.stopped {
            return Ok(None);
        }
        let notified = self.dirty.swap(false, Ordering::AcqRel);
        if self.subscribed && self.last.is_some() && !notified {
            return Ok(None);
        }
        let raw = read_party_bytes(&mut self.source, self.layout)?;
        if self.last.as_deref() == Some(raw.as_slice()) {
            return Ok(None);
        }
        let party = decode_party_bytes(&raw, self.layout)?;
        debug!(count = party.len(), "party changed in memory");
        self.last = Some(raw);
        Ok(Some(party))
    }

    /// Stops polling and releases the change subscription. Repeated calls
    /// are no-ops.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        if self.subscribed {
            self.source.unsubscribe();
            self.subscribed = false;
        }
        self.stopped = true;
        debug!("party watcher stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: MemorySource> Drop for PartyWatcher<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
