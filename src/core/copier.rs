use crate::domain::ports::{CharReader, CharWriter, Sink, Source};
use crate::utils::error::Result;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub const DEFAULT_BUFFER_SIZE: usize = 8192;

pub type ByteCopier = Copier<u8>;
pub type CharCopier = Copier<char>;

/// Cloneable flag telling a running copier to finish after the current chunk.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Moves units from a [`Source`] to a [`Sink`] through a fixed size buffer.
#[derive(Debug, Clone)]
pub struct Copier<U> {
    buffer_size: usize,
    stop: StopHandle,
    _unit: PhantomData<fn() -> U>,
}

impl<U> Default for Copier<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Copier<U> {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            stop: StopHandle::default(),
            _unit: PhantomData,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

impl<U: Copy + Default> Copier<U> {
    /// Copies until the source is exhausted. Returns the number of units.
    pub fn copy<S, W>(&self, source: &mut S, sink: &mut W) -> Result<u64>
    where
        S: Source<U> + ?Sized,
        W: Sink<U> + ?Sized,
    {
        self.copy_with_hook(source, sink, |_| {})
    }

    /// Like [`Copier::copy`] but `hook` sees every chunk after it was written.
    pub fn copy_with_hook<S, W, F>(&self, source: &mut S, sink: &mut W, mut hook: F) -> Result<u64>
    where
        S: Source<U> + ?Sized,
        W: Sink<U> + ?Sized,
        F: FnMut(&[U]),
    {
        let mut buffer = vec![U::default(); self.buffer_size];
        let mut total = 0u64;
        while !self.stop.is_stopped() {
            let count = source.read_units(&mut buffer[..])?;
            if count == 0 {
                break;
            }
            sink.write_units(&buffer[..count])?;
            hook(&buffer[..count]);
            total += count as u64;
        }
        sink.flush_units()?;
        if self.stop.is_stopped() {
            tracing::debug!("Copier stopped after {} units", total);
        }
        Ok(total)
    }
}

impl<U: Copy + Default + Send + 'static> Copier<U> {
    /// Runs the copy on its own thread. Source and sink are handed back
    /// through the join handle together with the result.
    pub fn spawn<S, W>(self, mut source: S, mut sink: W) -> JoinHandle<(Result<u64>, S, W)>
    where
        S: Source<U> + Send + 'static,
        W: Sink<U> + Send + 'static,
    {
        std::thread::spawn(move || {
            let result = self.copy(&mut source, &mut sink);
            (result, source, sink)
        })
    }
}

pub fn copy_bytes<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<u64> {
    ByteCopier::new().copy(reader, writer)
}

/// Copies UTF-8 text between byte streams, decoding on the way.
pub fn copy_chars<R: Read, W: Write>(reader: R, writer: W) -> Result<u64> {
    let mut source = CharReader::new(reader);
    let mut sink = CharWriter::new(writer);
    CharCopier::new().copy(&mut source, &mut sink)
}
