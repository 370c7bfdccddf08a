//! Chunked pixel streaming
//!
//! The [`TransferEngine`] walks the dirty chunks of a [`FrameBuffer`] and
//! streams each one to the controller as a full-width strip. At most one chunk
//! is in flight. A chunk's dirty flag is cleared only once its stream has
//! completed successfully.
//!
//! For every chunk the engine programs the address window with blocking
//! register writes, then hands the chunk's bytes to
//! [`DisplayInterface::start_pixel_stream`]. A transport that finishes before
//! returning lets the engine move straight on to the next dirty chunk; one
//! that reports [`StreamStatus::Pending`] parks the engine until
//! [`TransferEngine::complete`] is called with the outcome.
//!
//! Dirty chunks are found by scanning forward from the chunk after the last
//! one sent, wrapping around, so a flush interrupted by an error resumes where
//! it stopped.
//!
//! A stream given up with [`TransferEngine::abandon`] that the transport could
//! not stop leaves the engine draining: it stays busy, so nothing new is
//! streamed while the old transfer may still be reading the frame, and the
//! late completion only returns it to idle.

use crate::command;
use crate::framebuffer::{FrameBuffer, Region};
use crate::interface::{DisplayInterface, StreamStatus};

/// What the engine is doing
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransferState {
    /// No stream outstanding
    Idle,
    /// Waiting for the stream of this chunk to complete
    Sending(usize),
    /// Waiting for the completion of an abandoned stream of this chunk
    Draining(usize),
}

/// State machine flushing dirty chunks one stream at a time
#[derive(Debug)]
pub struct TransferEngine {
    state: TransferState,
    scan_index: usize,
    streams_started: u32,
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferEngine {
    /// Create an idle engine that scans from chunk 0
    pub fn new() -> Self {
        Self {
            state: TransferState::Idle,
            scan_index: 0,
            streams_started: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Whether a stream is outstanding
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, TransferState::Idle)
    }

    /// Number of streams started so far (wrapping)
    ///
    /// Changes whenever a flush makes progress.
    pub fn streams_started(&self) -> u32 {
        self.streams_started
    }

    /// Chunk the next scan starts from
    pub fn scan_index(&self) -> usize {
        self.scan_index
    }

    /// Begin flushing dirty chunks
    ///
    /// Does nothing while a stream is outstanding or when no chunk is dirty.
    ///
    /// # Errors
    ///
    /// Returns the interface error if programming the window or starting a
    /// stream fails. The engine is idle afterwards and the chunk stays dirty.
    pub fn start<I, B>(
        &mut self,
        frame: &mut FrameBuffer<B>,
        interface: &mut I,
    ) -> Result<(), I::Error>
    where
        I: DisplayInterface,
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        if self.is_busy() {
            return Ok(());
        }

        match frame.dirty().next_dirty_from(self.scan_index) {
            Some(chunk) => self.run(chunk, frame, interface),
            None => {
                log::trace!("Nothing to flush");
                Ok(())
            }
        }
    }

    /// Report the outcome of the outstanding stream
    ///
    /// On success the chunk is marked clean and the next dirty chunk is
    /// started. On failure the flush halts: the engine goes idle, the failed
    /// chunk and every unsent chunk stay dirty, and the next flush resumes at
    /// the failed chunk. A completion arriving while idle is ignored; one
    /// arriving while draining ends the drain and leaves the chunk dirty.
    ///
    /// # Errors
    ///
    /// Returns the interface error if starting the next chunk fails.
    pub fn complete<I, B>(
        &mut self,
        result: Result<(), I::Error>,
        frame: &mut FrameBuffer<B>,
        interface: &mut I,
    ) -> Result<(), I::Error>
    where
        I: DisplayInterface,
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let chunk = match self.state {
            TransferState::Sending(chunk) => chunk,
            TransferState::Draining(chunk) => {
                log::debug!("Abandoned transfer of chunk {chunk} finished");
                self.halt(chunk);
                return Ok(());
            }
            TransferState::Idle => {
                log::warn!("Ignoring transfer completion while idle");
                return Ok(());
            }
        };

        if let Err(err) = result {
            log::warn!("Transfer of chunk {chunk} failed: {err:?}");
            self.halt(chunk);
            return Ok(());
        }

        match self.advance(chunk, frame) {
            Some(next) => self.run(next, frame, interface),
            None => Ok(()),
        }
    }

    /// Give up on the outstanding stream
    ///
    /// The chunk stays dirty and is retried by the next flush. Pass
    /// `stopped = true` only if the transport has stopped the stream and will
    /// never report its completion; otherwise the engine drains until that
    /// completion arrives.
    pub fn abandon(&mut self, stopped: bool) {
        if let TransferState::Sending(chunk) = self.state {
            if stopped {
                self.halt(chunk);
            } else {
                self.state = TransferState::Draining(chunk);
                self.scan_index = chunk;
            }
        }
    }

    fn run<I, B>(
        &mut self,
        mut chunk: usize,
        frame: &mut FrameBuffer<B>,
        interface: &mut I,
    ) -> Result<(), I::Error>
    where
        I: DisplayInterface,
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        loop {
            self.state = TransferState::Sending(chunk);
            self.streams_started = self.streams_started.wrapping_add(1);

            match send_chunk(chunk, frame, interface) {
                Ok(StreamStatus::Pending) => return Ok(()),
                Ok(StreamStatus::Complete) => match self.advance(chunk, frame) {
                    Some(next) => chunk = next,
                    None => return Ok(()),
                },
                Err(err) => {
                    log::warn!("Could not start transfer of chunk {chunk}: {err:?}");
                    self.halt(chunk);
                    return Err(err);
                }
            }
        }
    }

    /// Mark `chunk` sent and pick the next dirty chunk, going idle if none
    fn advance<B>(&mut self, chunk: usize, frame: &mut FrameBuffer<B>) -> Option<usize>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let dirty = frame.dirty_mut();
        dirty.clear(chunk);
        self.scan_index = (chunk + 1) % dirty.len();

        let next = dirty.next_dirty_from(self.scan_index);
        if next.is_none() {
            log::trace!("Flush complete");
            self.state = TransferState::Idle;
            self.scan_index = 0;
        }
        next
    }

    fn halt(&mut self, chunk: usize) {
        self.state = TransferState::Idle;
        self.scan_index = chunk;
    }
}

/// Program the address window for `chunk` and start streaming its bytes
fn send_chunk<I, B>(
    chunk: usize,
    frame: &FrameBuffer<B>,
    interface: &mut I,
) -> Result<StreamStatus, I::Error>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let region = frame.chunk_region(chunk);
    log::trace!(
        "Sending chunk {chunk}: rows {}..={}",
        region.y,
        region.y_end()
    );

    set_window(interface, region)?;
    interface.start_pixel_stream(frame.chunk_bytes(chunk))
}

/// Set the controller's address window and open GRAM for writing
fn set_window<I: DisplayInterface>(interface: &mut I, region: Region) -> Result<(), I::Error> {
    interface.send_command(command::COLUMN_ADDRESS_SET)?;
    interface.send_data(&span(region.x, region.x_end()))?;
    interface.send_command(command::PAGE_ADDRESS_SET)?;
    interface.send_data(&span(region.y, region.y_end()))?;
    interface.send_command(command::MEMORY_WRITE)
}

fn span(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}
