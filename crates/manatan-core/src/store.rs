//! Per-source region data and OCR status.
//!
//! Data and status are tracked separately: a key can be `Error` while still
//! holding regions from an earlier successful fetch. Every mutation on an
//! unknown key or out-of-range index is a no-op that returns `false`.

use std::collections::HashMap;

use manatan_types::{ForcedOrientation, OverlayStatus, TextRegion};

use crate::generation::{KeyedGenerations, Ticket};
use crate::preprocess::LINE_BREAK_MARKER;

/// How merged region texts are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeSeparator {
    Space,
    #[default]
    ZeroWidth,
}

impl MergeSeparator {
    pub fn from_add_space(add_space_on_merge: bool) -> Self {
        if add_space_on_merge {
            MergeSeparator::Space
        } else {
            MergeSeparator::ZeroWidth
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            MergeSeparator::Space => ' ',
            MergeSeparator::ZeroWidth => LINE_BREAK_MARKER,
        }
    }
}

#[derive(Debug, Default)]
pub struct BlockStore {
    data: HashMap<String, Vec<TextRegion>>,
    status: HashMap<String, OverlayStatus>,
    fetches: KeyedGenerations,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self, key: &str) -> Option<&[TextRegion]> {
        self.data.get(key).map(Vec::as_slice)
    }

    pub fn status(&self, key: &str) -> OverlayStatus {
        self.status.get(key).copied().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Replace the key's regions atomically.
    pub fn ingest(&mut self, key: &str, regions: Vec<TextRegion>) {
        tracing::debug!(key, count = regions.len(), "ingesting regions");
        self.data.insert(key.to_string(), regions);
        self.status.insert(key.to_string(), OverlayStatus::Success);
    }

    pub fn set_status(&mut self, key: &str, status: OverlayStatus) {
        let previous = self.status.insert(key.to_string(), status);
        if previous != Some(status) {
            tracing::debug!(key, status = status.as_str(), "status changed");
        }
    }

    /// Whether an automatic fetch should start for `key`. Cached data
    /// reconciles the status to success; loading and error wait for an
    /// explicit retry.
    pub fn needs_fetch(&mut self, key: &str) -> bool {
        if self.data.contains_key(key) {
            if self.status(key) != OverlayStatus::Success {
                self.set_status(key, OverlayStatus::Success);
            }
            return false;
        }
        !matches!(
            self.status(key),
            OverlayStatus::Loading | OverlayStatus::Error
        )
    }

    /// Mark `key` as loading and hand out a ticket for the new fetch.
    pub fn begin_fetch(&mut self, key: &str) -> Ticket {
        self.set_status(key, OverlayStatus::Loading);
        self.fetches.begin(key)
    }

    /// Apply a fetch result unless a newer fetch for the key has started.
    pub fn ingest_if_current(&mut self, ticket: &Ticket, regions: Vec<TextRegion>) -> bool {
        if !self.fetches.is_current(ticket) {
            tracing::debug!(key = %ticket.key, generation = ticket.generation, "dropping stale OCR result");
            return false;
        }
        self.ingest(&ticket.key, regions);
        true
    }

    pub fn fail_if_current(&mut self, ticket: &Ticket) -> bool {
        if !self.fetches.is_current(ticket) {
            return false;
        }
        self.set_status(&ticket.key, OverlayStatus::Error);
        true
    }

    pub fn edit(&mut self, key: &str, index: usize, text: impl Into<String>) -> bool {
        let Some(region) = self.data.get_mut(key).and_then(|d| d.get_mut(index)) else {
            return false;
        };
        region.text = text.into();
        true
    }

    pub fn merge(
        &mut self,
        key: &str,
        first: usize,
        second: usize,
        separator: MergeSeparator,
    ) -> bool {
        let Some(data) = self.data.get_mut(key) else {
            return false;
        };
        if first == second || first >= data.len() || second >= data.len() {
            return false;
        }

        let a = &data[first];
        let b = &data[second];
        let mut text = String::with_capacity(a.text.len() + b.text.len() + 3);
        text.push_str(&a.text);
        text.push(separator.as_char());
        text.push_str(&b.text);
        let merged = TextRegion {
            text,
            bbox: a.bbox.union(&b.bbox),
            is_merged: true,
            forced_orientation: ForcedOrientation::Auto,
        };

        let mut next: Vec<TextRegion> = data
            .drain(..)
            .enumerate()
            .filter(|(i, _)| *i != first && *i != second)
            .map(|(_, r)| r)
            .collect();
        next.push(merged);
        *data = next;
        tracing::debug!(key, first, second, "merged regions");
        true
    }

    pub fn delete(&mut self, key: &str, index: usize) -> bool {
        let Some(data) = self.data.get_mut(key) else {
            return false;
        };
        if index >= data.len() {
            return false;
        }
        data.remove(index);
        true
    }

    /// Drop everything held for `key`.
    pub fn clear(&mut self, key: &str) {
        self.data.remove(key);
        self.status.remove(key);
        self.fetches.forget(key);
    }

    pub fn clear_all(&mut self) {
        self.data.clear();
        self.status.clear();
        self.fetches.forget_all();
    }
}
