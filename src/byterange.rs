//! EXT-X-BYTERANGE values
//!
//! A sub-range is written `<length>[@<offset>]`. Without an offset the
//! sub-range starts right after the previous sub-range of the same file.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Tag prefix of a byte-range line
pub const BYTERANGE_TAG: &str = "#EXT-X-BYTERANGE:";

/// A byte range as written in the playlist, offset optional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

/// A byte range with its offset filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedByteRange {
    pub length: u64,
    pub offset: u64,
}

impl ByteRange {
    pub fn new(length: u64, offset: u64) -> Self {
        Self {
            length,
            offset: Some(offset),
        }
    }

    /// Parse the value of a full `#EXT-X-BYTERANGE:` tag line
    pub fn from_tag(line: &str) -> Option<Self> {
        line.strip_prefix(BYTERANGE_TAG)?.parse().ok()
    }

    /// Fill in the offset, continuing after `previous` when absent
    pub fn resolve(&self, previous: Option<ResolvedByteRange>) -> Option<ResolvedByteRange> {
        let offset = match (self.offset, previous) {
            (Some(offset), _) => offset,
            (None, Some(prev)) => prev.end(),
            (None, None) => return None,
        };
        Some(ResolvedByteRange {
            length: self.length,
            offset,
        })
    }
}

impl ResolvedByteRange {
    /// One past the last byte
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid byte range {0:?}")]
pub struct ParseByteRangeError(String);

impl FromStr for ByteRange {
    type Err = ParseByteRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseByteRangeError(s.to_string());
        let (length, offset) = match s.split_once('@') {
            Some((length, offset)) => (length, Some(offset)),
            None => (s, None),
        };
        let length = length.trim().parse::<u64>().map_err(|_| err())?;
        let offset = offset
            .map(|o| o.trim().parse::<u64>().map_err(|_| err()))
            .transpose()?;
        Ok(Self { length, offset })
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}@{}", self.length, offset),
            None => write!(f, "{}", self.length),
        }
    }
}

impl fmt::Display for ResolvedByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.length, self.offset)
    }
}
