//! Binary primitives for persisted graph data
//!
//! Framing: `[u32_le length][bytes]` for strings and byte blobs, `u32_le`
//! element counts for collections, little-endian fixed-width integers.
//! Collections whose order is insignificant are written grouped by element
//! kind: `[u32 group count]` then per group `[u8 kind][u32 count][items]`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use crate::errors::{DepGraphError, Result};

/// Upper bound for speculative allocation while decoding untrusted counts
const MAX_PREALLOC: usize = 1024;

fn read_err(err: io::Error) -> DepGraphError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DepGraphError::decode("truncated input")
    } else {
        DepGraphError::Io(err)
    }
}

pub struct GraphDataOutput<W: Write> {
    inner: W,
}

impl<W: Write> GraphDataOutput<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner.write_u64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.inner.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            DepGraphError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("collection too large: {len}"),
            ))
        })?;
        self.write_u32(len)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_opt_string(&mut self, value: Option<&str>) -> Result<()> {
        self.write_bool(value.is_some())?;
        match value {
            Some(s) => self.write_string(s),
            None => Ok(()),
        }
    }

    pub fn write_opt_u64(&mut self, value: Option<u64>) -> Result<()> {
        self.write_bool(value.is_some())?;
        match value {
            Some(v) => self.write_u64(v),
            None => Ok(()),
        }
    }

    /// Length-prefixed ordered collection
    pub fn write_collection<'i, T: 'i>(
        &mut self,
        items: impl ExactSizeIterator<Item = &'i T>,
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_len(items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    /// Unordered collection grouped by `kind` tag. Groups come out in
    /// ascending tag order, items within a group in input order.
    pub fn write_grouped<'i, T: 'i>(
        &mut self,
        items: impl IntoIterator<Item = &'i T>,
        kind: impl Fn(&T) -> u8,
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        let mut groups: BTreeMap<u8, Vec<&T>> = BTreeMap::new();
        for item in items {
            groups.entry(kind(item)).or_default().push(item);
        }
        self.write_len(groups.len())?;
        for (tag, group) in groups {
            self.write_u8(tag)?;
            self.write_len(group.len())?;
            for item in group {
                write(self, item)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub struct GraphDataInput<R: Read> {
    inner: R,
}

impl<R: Read> GraphDataInput<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(read_err)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DepGraphError::decode(format!("invalid bool byte {other}"))),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(read_err)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.inner.read_u64::<LittleEndian>().map_err(read_err)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.inner.read_i64::<LittleEndian>().map_err(read_err)
    }

    pub fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(read_err)?;
        if read != len {
            return Err(DepGraphError::decode("truncated input"));
        }
        Ok(buf)
    }

    pub fn read_string(&mut self) -> Result<String> {
        String::from_utf8(self.read_bytes()?)
            .map_err(|e| DepGraphError::decode(format!("invalid UTF-8 string: {e}")))
    }

    pub fn read_opt_string(&mut self) -> Result<Option<String>> {
        if self.read_bool()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_opt_u64(&mut self) -> Result<Option<u64>> {
        if self.read_bool()? {
            self.read_u64().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_collection<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let len = self.read_len()?;
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Counterpart of [`GraphDataOutput::write_grouped`]; `read` receives
    /// the group tag
    pub fn read_grouped<T>(
        &mut self,
        mut read: impl FnMut(&mut Self, u8) -> Result<T>,
    ) -> Result<Vec<T>> {
        let groups = self.read_len()?;
        let mut items = Vec::new();
        for _ in 0..groups {
            let tag = self.read_u8()?;
            let len = self.read_len()?;
            items.reserve(len.min(MAX_PREALLOC));
            for _ in 0..len {
                items.push(read(self, tag)?);
            }
        }
        Ok(items)
    }
}
