//! Ordered collection of per-area evidence attachments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::ImageSlotSpec;

/// One image slot and, once collected, the stored reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSlot {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub url: Option<String>,
}

impl From<ImageSlotSpec> for MediaSlot {
    fn from(spec: ImageSlotSpec) -> Self {
        Self {
            key: spec.key,
            label: spec.label,
            required: spec.required,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("all media slots have been handled")]
    Finished,
    #[error("slot is required and cannot be skipped")]
    Required,
}

/// Slots plus a cursor that only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaProgress {
    slots: Vec<MediaSlot>,
    index: usize,
}

impl MediaProgress {
    pub fn new(specs: Vec<ImageSlotSpec>) -> Self {
        Self {
            slots: specs.into_iter().map(MediaSlot::from).collect(),
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slots(&self) -> &[MediaSlot] {
        &self.slots
    }

    /// The slot currently being asked for.
    pub fn current(&self) -> Option<&MediaSlot> {
        self.slots.get(self.index)
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.slots.len()
    }

    /// Stores `url` in the current slot and moves on.
    pub fn collect(&mut self, url: impl Into<String>) -> Result<(), MediaError> {
        let slot = self.slots.get_mut(self.index).ok_or(MediaError::Finished)?;
        slot.url = Some(url.into());
        self.index += 1;
        Ok(())
    }

    /// Leaves the current optional slot empty and moves on.
    pub fn skip(&mut self) -> Result<(), MediaError> {
        let slot = self.slots.get(self.index).ok_or(MediaError::Finished)?;
        if slot.required {
            return Err(MediaError::Required);
        }
        self.index += 1;
        Ok(())
    }

    pub fn into_slots(self) -> Vec<MediaSlot> {
        self.slots
    }
}

/// Slots that received an image.
pub fn collected(slots: &[MediaSlot]) -> impl Iterator<Item = &MediaSlot> {
    slots.iter().filter(|s| s.url.is_some())
}
