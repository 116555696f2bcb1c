//! Column family iterator
//!
//! Forward cursor over a snapshot of one column family.

use std::collections::btree_map::Range;
use std::ops::Bound;

use crate::error::{KvError, Result};
use crate::memtable::CfMap;

use super::DbIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    /// Not yet seeked
    Created,
    /// On an entry
    Positioned,
    /// Ran past the last entry
    Exhausted,
    Closed,
}

/// Iterator over one column family of a snapshot, in key order
pub struct CfIterator<'a> {
    cf: &'a str,
    map: &'a CfMap,
    /// Remaining entries after `current`
    range: Option<Range<'a, Vec<u8>, Vec<u8>>>,
    current: Option<(&'a Vec<u8>, &'a Vec<u8>)>,
    state: IterState,
}

impl<'a> CfIterator<'a> {
    pub(crate) fn new(cf: &'a str, map: &'a CfMap) -> Self {
        Self {
            cf,
            map,
            range: None,
            current: None,
            state: IterState::Created,
        }
    }

    fn advance(&mut self) {
        self.current = self.range.as_mut().and_then(|r| r.next());
        self.state = if self.current.is_some() {
            IterState::Positioned
        } else {
            IterState::Exhausted
        };
    }

    fn not_positioned(&self) -> KvError {
        KvError::InvalidState(format!(
            "iterator over cf {} is not positioned ({:?})",
            self.cf, self.state
        ))
    }
}

impl<'a> DbIterator for CfIterator<'a> {
    fn seek(&mut self, key: &[u8]) -> Result<()> {
        if self.state == IterState::Closed {
            return Err(KvError::InvalidState(format!(
                "seek on closed iterator over cf {}",
                self.cf
            )));
        }

        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (Bound::Included(key), Bound::Unbounded);
        self.range = Some(self.map.range::<[u8], _>(bounds));
        self.advance();
        Ok(())
    }

    fn valid(&self) -> bool {
        self.state == IterState::Positioned
    }

    fn key(&self) -> Result<&[u8]> {
        match self.current {
            Some((k, _)) if self.valid() => Ok(k.as_slice()),
            _ => Err(self.not_positioned()),
        }
    }

    fn value(&self) -> Result<Vec<u8>> {
        match self.current {
            Some((_, v)) if self.valid() => Ok(v.clone()),
            _ => Err(self.not_positioned()),
        }
    }

    fn next(&mut self) -> Result<()> {
        if !self.valid() {
            return Err(self.not_positioned());
        }
        self.advance();
        Ok(())
    }

    fn close(&mut self) {
        if self.state != IterState::Closed {
            self.state = IterState::Closed;
            self.range = None;
            self.current = None;
            tracing::trace!("iterator over cf {} released", self.cf);
        }
    }
}

impl Drop for CfIterator<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
