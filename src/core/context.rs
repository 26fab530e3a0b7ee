//! Coordinate spaces for regions.
//!
//! A [`Context`] describes the sequence a region is measured against: its
//! length, whether it is circular, and the index of its first position.
//! Alignment tools conventionally report 1-based coordinates, so most callers
//! use a `start_index` of 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Position {position} is outside of linear bounds [{bounds_start}, {bounds_end}]")]
    OutOfBounds {
        position: i64,
        bounds_start: i64,
        bounds_end: i64,
    },

    #[error("Context mismatch: {left} vs {right}")]
    Mismatch { left: String, right: String },

    #[error("Context length must be positive, got {0}")]
    InvalidLength(i64),
}

/// The coordinate space of a sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    /// Number of positions in the sequence
    length: i64,

    /// Whether positions wrap through the origin
    circular: bool,

    /// Index of the first position (1 for BLAST-style coordinates)
    start_index: i64,

    /// Sequence name, used to tell apart sequences of identical geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Context {
    /// Create a new context
    ///
    /// # Errors
    ///
    /// Returns `ContextError::InvalidLength` if `length` is not positive.
    pub fn new(length: i64, circular: bool, start_index: i64) -> Result<Self, ContextError> {
        if length < 1 {
            return Err(ContextError::InvalidLength(length));
        }
        Ok(Self {
            length,
            circular,
            start_index,
            name: None,
        })
    }

    /// Create a linear context
    ///
    /// # Errors
    ///
    /// Returns `ContextError::InvalidLength` if `length` is not positive.
    pub fn linear(length: i64, start_index: i64) -> Result<Self, ContextError> {
        Self::new(length, false, start_index)
    }

    /// Create a circular context
    ///
    /// # Errors
    ///
    /// Returns `ContextError::InvalidLength` if `length` is not positive.
    pub fn circular(length: i64, start_index: i64) -> Result<Self, ContextError> {
        Self::new(length, true, start_index)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// First valid position
    pub fn bounds_start(&self) -> i64 {
        self.start_index
    }

    /// Last valid position
    pub fn bounds_end(&self) -> i64 {
        self.start_index + self.length - 1
    }

    /// Map a position into this context.
    ///
    /// Circular contexts wrap any integer into `[bounds_start, bounds_end]`.
    /// Linear contexts return the position unchanged when it is in bounds.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::OutOfBounds` for a linear context when `position`
    /// lies outside its bounds.
    pub fn translate_pos(&self, position: i64) -> Result<i64, ContextError> {
        if self.circular {
            return Ok((position - self.start_index).rem_euclid(self.length) + self.start_index);
        }
        if self.within_bounds(position, true) {
            Ok(position)
        } else {
            Err(ContextError::OutOfBounds {
                position,
                bounds_start: self.bounds_start(),
                bounds_end: self.bounds_end(),
            })
        }
    }

    /// Check whether a raw position lies within the bounds of this context.
    /// With `inclusive == false` both endpoints are excluded.
    pub fn within_bounds(&self, position: i64, inclusive: bool) -> bool {
        if inclusive {
            self.bounds_start() <= position && position <= self.bounds_end()
        } else {
            self.bounds_start() < position && position < self.bounds_end()
        }
    }

    /// Number of positions walked going forward from `a` to `b`, both included.
    ///
    /// Returns `None` for a linear context when `b` precedes `a` or either
    /// position is out of bounds.
    pub fn span(&self, a: i64, b: i64) -> Option<i64> {
        let a = self.translate_pos(a).ok()?;
        let b = self.translate_pos(b).ok()?;
        if self.circular {
            Some((b - a).rem_euclid(self.length) + 1)
        } else if b >= a {
            Some(b - a + 1)
        } else {
            None
        }
    }

    /// Shortest signed displacement from `from` to `to`.
    ///
    /// Linear contexts use plain subtraction. Circular contexts pick the
    /// representative in `(-length/2, length/2]` so that small moves across
    /// the origin stay small.
    pub(crate) fn displacement(&self, from: i64, to: i64) -> i64 {
        if !self.circular {
            return to - from;
        }
        let forward = (to - from).rem_euclid(self.length);
        if forward * 2 > self.length {
            forward - self.length
        } else {
            forward
        }
    }

    /// Two contexts are compatible when they share length, topology and origin
    pub fn is_compatible(&self, other: &Context) -> bool {
        self.length == other.length
            && self.circular == other.circular
            && self.start_index == other.start_index
    }

    /// Check compatibility, failing with a mismatch error otherwise
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Mismatch` when the geometries differ.
    pub fn check_compatible(&self, other: &Context) -> Result<(), ContextError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(ContextError::Mismatch {
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topology = if self.circular { "circular" } else { "linear" };
        match &self.name {
            Some(name) => write!(
                f,
                "{name} ({topology}, {} bp, origin {})",
                self.length, self.start_index
            ),
            None => write!(
                f,
                "({topology}, {} bp, origin {})",
                self.length, self.start_index
            ),
        }
    }
}
