//! Lazily readable resource content.
//!
//! Nothing is read until a charset sniffer asks for a prefix, and sniffers
//! only ever look at the first few bytes.

use crate::uri::{percent_decode, strip_base64_marker};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use url::Url;

/// Content that can be opened for reading, possibly more than once.
pub trait ByteSource: Send + Sync {
    /// Opens the content from its start.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;

    /// Reads at most `limit` bytes from the start.
    fn read_prefix(&self, limit: usize) -> io::Result<Bytes> {
        let mut buf = Vec::with_capacity(limit);
        self.open()?.take(limit as u64).read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// No content at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl ByteSource for EmptySource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(io::empty()))
    }

    fn read_prefix(&self, _limit: usize) -> io::Result<Bytes> {
        Ok(Bytes::new())
    }
}

impl ByteSource for Bytes {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.as_ref())))
    }

    fn read_prefix(&self, limit: usize) -> io::Result<Bytes> {
        Ok(self.slice(..limit.min(self.len())))
    }
}

impl ByteSource for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.as_slice())))
    }
}

impl ByteSource for &[u8] {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(*self)))
    }
}

/// A file, opened anew on every read.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// The payload of a `data:` URI, percent- or base64-decoded on read.
#[derive(Debug, Clone)]
pub struct DataUriSource {
    uri: Url,
}

impl DataUriSource {
    /// Returns `None` unless `uri` is a `data:` URI.
    pub fn new(uri: &Url) -> Option<Self> {
        (uri.scheme() == "data").then(|| Self { uri: uri.clone() })
    }

    /// Decodes the whole payload.
    pub fn decode(&self) -> io::Result<Vec<u8>> {
        let (header, payload) = self
            .uri
            .path()
            .split_once(',')
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "data: URI without ','"))?;
        let payload = percent_decode(payload);

        if strip_base64_marker(header).len() == header.len() {
            return Ok(payload);
        }
        let compact: Vec<u8> = payload
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

impl ByteSource for DataUriSource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.decode()?)))
    }
}
