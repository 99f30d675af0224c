//! Bounded I/O utilities for safe artifact reading.
//!
//! Artifacts are downloaded installers of arbitrary size, so every reader
//! here works on scoped file handles and bounded windows or chunks instead
//! of loading the whole file.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Maximum size to read for initial sniffing (4KB)
pub const MAX_SNIFF_SIZE: u64 = 4096;

/// Default chunk size for streaming scans (1MB)
pub const DEFAULT_SCAN_CHUNK: usize = 1024 * 1024;

/// Default overlap carried between scan chunks (64KB)
pub const DEFAULT_SCAN_OVERLAP: usize = 64 * 1024;

/// Resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    pub max_read_bytes: u64,
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_read_bytes: 4 * 1024 * 1024 * 1024, // 4GB
            max_file_size: 4 * 1024 * 1024 * 1024,  // 4GB
        }
    }
}

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            debug!("BoundedReader reached limit of {} bytes", self.limit);
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let read_buf = &mut buf[..max_to_read];

        let n = self.inner.read(read_buf)?;
        self.bytes_read += n as u64;

        if self.bytes_read >= self.limit {
            warn!(
                "BoundedReader limit reached after reading {} bytes",
                self.bytes_read
            );
        }

        Ok(n)
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes filled.
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Safe file reader with resource limits.
///
/// The handle is closed when the reader is dropped, on every exit path.
pub struct SafeFileReader {
    file: File,
    size: u64,
    limits: IOLimits,
}

impl SafeFileReader {
    /// Open a file with safety limits.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size,
            max_file_size = limits.max_file_size,
            "Opening artifact for safe reading"
        );

        if size > limits.max_file_size {
            warn!(
                "File too large: {} bytes (limit: {})",
                size, limits.max_file_size
            );
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "File too large: {} bytes (limit: {})",
                    size, limits.max_file_size
                ),
            ));
        }

        Ok(Self { file, size, limits })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn limits(&self) -> &IOLimits {
        &self.limits
    }

    /// Read a prefix of the file; shorter than `size` at EOF.
    pub fn read_prefix(&mut self, size: u64) -> io::Result<Vec<u8>> {
        self.read_at(0, size)
    }

    /// Read up to `len` bytes at `offset`; shorter at EOF, empty past it.
    pub fn read_at(&mut self, offset: u64, len: u64) -> io::Result<Vec<u8>> {
        let len = std::cmp::min(len, self.limits.max_read_bytes);
        if offset >= self.size {
            return Ok(Vec::new());
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; std::cmp::min(len, self.size - offset) as usize];
        let n = read_full(&mut self.file, &mut data)?;
        data.truncate(n);
        trace!(offset, len = n, "Performed read");
        Ok(data)
    }

    /// Read exactly `N` bytes at `offset`, failing on a short read.
    pub fn read_array_at<const N: usize>(&mut self, offset: u64) -> io::Result<[u8; N]> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; N];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// A buffered, bounded reader positioned at the start of the file.
    pub fn stream(&mut self) -> io::Result<BoundedReader<BufReader<&mut File>>> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(BoundedReader::new(
            BufReader::new(&mut self.file),
            self.limits.max_read_bytes,
        ))
    }

    /// Scan the file in chunks of `chunk_size`, each chunk prefixed by the
    /// last `overlap` bytes of the previous one so that matches spanning a
    /// chunk boundary are still seen.
    ///
    /// The visitor receives the window and the absolute file offset of its
    /// first byte; returning `Some` stops the scan.
    pub fn scan_chunks<T, F>(&mut self, chunk_size: usize, overlap: usize, mut visit: F) -> io::Result<Option<T>>
    where
        F: FnMut(&[u8], u64) -> Option<T>,
    {
        let chunk_size = chunk_size.max(1);
        let overlap = overlap.min(chunk_size);
        let mut reader = self.stream()?;
        let mut window: Vec<u8> = Vec::with_capacity(chunk_size + overlap);
        let mut chunk = vec![0u8; chunk_size];
        let mut window_start: u64 = 0;

        loop {
            let n = read_full(&mut reader, &mut chunk)?;
            if n == 0 {
                break;
            }
            window.extend_from_slice(&chunk[..n]);
            if let Some(found) = visit(&window, window_start) {
                return Ok(Some(found));
            }
            if n < chunk_size {
                break;
            }
            let keep = overlap.min(window.len());
            let drop = window.len() - keep;
            window.drain(..drop);
            window_start += drop as u64;
        }
        Ok(None)
    }
}
