//! Directed spans of positions within a [`Context`].
//!
//! A region is stored as a `start`/`end` pair plus a [`Direction`]. For a
//! forward region `start` is the left end; for a reverse region `start` is
//! the right end. All gap, overlap and fuse operations work in position space
//! on the left and right ends, so they do not depend on direction.
//!
//! ```text
//!   forward     start |>>>>>>>>>>| end
//!   reverse       end |<<<<<<<<<<| start
//!                  left          right
//! ```
//!
//! On a circular context a region whose left end is numerically after its
//! right end wraps through the origin.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::context::{Context, ContextError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Invalid span {start}..{end} ({direction}) in linear context {context}")]
    InvalidSpan {
        start: i64,
        end: i64,
        direction: Direction,
        context: String,
    },

    #[error("Region length {length} is outside of [1, {max}]")]
    InvalidLength { length: i64, max: i64 },

    #[error("Regions {left} and {right} are not consecutive")]
    NotConsecutive { left: String, right: String },

    #[error("Position {position} is outside of region {region}")]
    OutsideRegion { position: i64, region: String },
}

/// Strand of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// A directed span of positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    start: i64,
    end: i64,
    direction: Direction,
    context: Arc<Context>,
    name: Option<String>,
}

impl Region {
    /// Create a region from a start and end.
    ///
    /// Positions are translated into the context first, so circular regions
    /// accept any integer.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Context` if a position escapes a linear context,
    /// or `RegionError::InvalidSpan` if the ends are out of order for a linear
    /// context.
    pub fn new(
        start: i64,
        end: i64,
        direction: Direction,
        context: Arc<Context>,
    ) -> Result<Self, RegionError> {
        let start = context.translate_pos(start)?;
        let end = context.translate_pos(end)?;
        let region = Self {
            start,
            end,
            direction,
            context,
            name: None,
        };
        region.check_linear_order()?;
        Ok(region)
    }

    /// Create a forward region
    ///
    /// # Errors
    ///
    /// See [`Region::new`].
    pub fn forward(start: i64, end: i64, context: Arc<Context>) -> Result<Self, RegionError> {
        Self::new(start, end, Direction::Forward, context)
    }

    /// Create a reverse region, where `start` is the right end
    ///
    /// # Errors
    ///
    /// See [`Region::new`].
    pub fn reverse(start: i64, end: i64, context: Arc<Context>) -> Result<Self, RegionError> {
        Self::new(start, end, Direction::Reverse, context)
    }

    /// Create a region from its left and right ends
    ///
    /// # Errors
    ///
    /// See [`Region::new`].
    pub fn from_ends(
        left: i64,
        right: i64,
        context: Arc<Context>,
        direction: Direction,
    ) -> Result<Self, RegionError> {
        match direction {
            Direction::Forward => Self::new(left, right, direction, context),
            Direction::Reverse => Self::new(right, left, direction, context),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn check_linear_order(&self) -> Result<(), RegionError> {
        if !self.context.is_circular() && self.left_end() > self.right_end() {
            return Err(RegionError::InvalidSpan {
                start: self.start,
                end: self.end,
                direction: self.direction,
                context: self.context.to_string(),
            });
        }
        Ok(())
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_forward(&self) -> bool {
        self.direction == Direction::Forward
    }

    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }

    pub fn is_circular(&self) -> bool {
        self.context.is_circular()
    }

    pub fn context_length(&self) -> i64 {
        self.context.length()
    }

    pub fn start_index(&self) -> i64 {
        self.context.start_index()
    }

    pub fn bounds_start(&self) -> i64 {
        self.context.bounds_start()
    }

    pub fn bounds_end(&self) -> i64 {
        self.context.bounds_end()
    }

    /// Leftmost position in position space
    pub fn left_end(&self) -> i64 {
        match self.direction {
            Direction::Forward => self.start,
            Direction::Reverse => self.end,
        }
    }

    /// Rightmost position in position space
    pub fn right_end(&self) -> i64 {
        match self.direction {
            Direction::Forward => self.end,
            Direction::Reverse => self.start,
        }
    }

    /// Alias for [`Region::left_end`]
    pub fn lp(&self) -> i64 {
        self.left_end()
    }

    /// Alias for [`Region::right_end`]
    pub fn rp(&self) -> i64 {
        self.right_end()
    }

    /// True if the region wraps through the origin
    pub fn spans_origin(&self) -> bool {
        self.left_end() > self.right_end()
    }

    /// Number of positions covered, never less than 1.
    ///
    /// A circular region whose left end sits one past its right end covers
    /// the whole context.
    pub fn length(&self) -> i64 {
        let (left, right) = (self.left_end(), self.right_end());
        if left <= right {
            right - left + 1
        } else {
            self.context.length() - (left - right) + 1
        }
    }

    /// Compare coordinate spaces, including the sequence name
    pub fn same_context(&self, other: &Region) -> bool {
        self.context == other.context
    }

    fn check_compatible(&self, other: &Region) -> Result<(), RegionError> {
        Ok(self.context.check_compatible(&other.context)?)
    }

    /// Steps walked rightwards from the left end to reach `position`, if the
    /// position lies within the region. `position` must already be translated.
    fn offset_of(&self, position: i64) -> Option<i64> {
        let offset = if self.is_circular() {
            (position - self.left_end()).rem_euclid(self.context.length())
        } else {
            position - self.left_end()
        };
        (0..self.length()).contains(&offset).then_some(offset)
    }

    /// Steps walked from `start` towards `end` to reach `position`
    pub fn distance_from_start(&self, position: i64) -> Option<i64> {
        if !self.context.within_bounds(position, true) {
            return None;
        }
        let offset = self.offset_of(position)?;
        match self.direction {
            Direction::Forward => Some(offset),
            Direction::Reverse => Some(self.length() - 1 - offset),
        }
    }

    /// Check whether `position` lies within the region.
    ///
    /// Positions outside the context bounds are never within the region.
    /// With `inclusive == false` both ends are excluded.
    pub fn within_region(&self, position: i64, inclusive: bool) -> bool {
        if !self.context.within_bounds(position, true) {
            return false;
        }
        match self.offset_of(position) {
            Some(offset) if inclusive => offset < self.length(),
            Some(offset) => 0 < offset && offset < self.length() - 1,
            None => false,
        }
    }

    /// Signed size of the junction going from this region's right end to the
    /// left end of `other`.
    ///
    /// Positive values are the number of positions strictly between the two
    /// regions, 0 means adjacent, and a negative value is the number of
    /// overlapping positions. Returns `None` when the contexts differ, when
    /// `other` is nested inside `self`, or when a linear context offers no
    /// forward path to `other`.
    pub fn get_gap_span(&self, other: &Region) -> Option<i64> {
        if !self.context.is_compatible(&other.context) {
            return None;
        }
        let length = self.context.length();

        if self.is_circular() && self.equivalent_ends(other) {
            return Some(length - self.length());
        }

        if let Some(offset) = self.offset_of(other.left_end()) {
            // other begins inside self; it must also end beyond self
            other.offset_of(self.right_end())?;
            return Some(-(self.length() - offset));
        }

        if self.is_circular() {
            Some((other.left_end() - self.right_end() - 1).rem_euclid(length))
        } else if other.left_end() > self.right_end() {
            Some(other.left_end() - self.right_end() - 1)
        } else {
            None
        }
    }

    /// The region strictly between this region's right end and `other`'s left
    /// end, oriented like `self`. `None` if the regions overlap or touch.
    pub fn get_gap(&self, other: &Region) -> Option<Region> {
        match self.get_gap_span(other) {
            Some(span) if span > 0 => Region::from_ends(
                self.right_end() + 1,
                other.left_end() - 1,
                Arc::clone(&self.context),
                self.direction,
            )
            .ok(),
            _ => None,
        }
    }

    /// The positions shared by the end of `self` and the start of `other`,
    /// oriented like `self`. `None` if `other` does not begin inside `self`.
    pub fn get_overlap(&self, other: &Region) -> Option<Region> {
        if !self.context.is_compatible(&other.context) {
            return None;
        }
        self.offset_of(other.left_end())?;
        let right = if other.offset_of(self.right_end()).is_some() {
            self.right_end()
        } else {
            other.right_end()
        };
        Region::from_ends(
            other.left_end(),
            right,
            Arc::clone(&self.context),
            self.direction,
        )
        .ok()
    }

    /// True if `other` begins inside this region
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Context` if the contexts are incompatible.
    pub fn end_overlaps_with(&self, other: &Region) -> Result<bool, RegionError> {
        self.check_compatible(other)?;
        Ok(self.offset_of(other.left_end()).is_some())
    }

    /// True if `other` begins exactly one position after this region ends
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Context` if the contexts differ in length,
    /// topology or origin.
    pub fn consecutive_with(&self, other: &Region) -> Result<bool, RegionError> {
        self.check_compatible(other)?;
        let next = self.right_end() + 1;
        match self.context.translate_pos(next) {
            Ok(next) => Ok(next == other.left_end()),
            Err(_) => Ok(false),
        }
    }

    /// Extend this region's right end to `other`'s right end
    ///
    /// # Errors
    ///
    /// Returns `RegionError::NotConsecutive` unless `consecutive_with` holds,
    /// or `RegionError::InvalidLength` if the fused region would cover more
    /// than the whole context.
    pub fn fuse(&mut self, other: &Region) -> Result<(), RegionError> {
        if !self.consecutive_with(other)? {
            return Err(RegionError::NotConsecutive {
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        let length = self.length() + other.length();
        if length > self.context.length() {
            return Err(RegionError::InvalidLength {
                length,
                max: self.context.length(),
            });
        }
        self.set_right_raw(other.right_end());
        Ok(())
    }

    /// Like [`Region::fuse`] but returns a new region
    ///
    /// # Errors
    ///
    /// See [`Region::fuse`].
    pub fn fused(&self, other: &Region) -> Result<Region, RegionError> {
        let mut fused = self.clone();
        fused.fuse(other)?;
        Ok(fused)
    }

    /// A new region from `start` to `end`, both within this region, keeping
    /// this region's direction
    ///
    /// # Errors
    ///
    /// Returns `RegionError::OutsideRegion` if either position is outside the
    /// region, or `RegionError::InvalidSpan` if `end` comes before `start`.
    pub fn sub_region(&self, start: i64, end: i64) -> Result<Region, RegionError> {
        let from = self.require_distance(start)?;
        let to = self.require_distance(end)?;
        if to < from {
            return Err(RegionError::InvalidSpan {
                start,
                end,
                direction: self.direction,
                context: self.context.to_string(),
            });
        }
        let mut sub = Region::new(start, end, self.direction, Arc::clone(&self.context))?;
        sub.name.clone_from(&self.name);
        Ok(sub)
    }

    fn require_distance(&self, position: i64) -> Result<i64, RegionError> {
        self.distance_from_start(position)
            .ok_or_else(|| RegionError::OutsideRegion {
                position,
                region: self.to_string(),
            })
    }

    /// Same left and right ends, ignoring direction
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Context` if the context lengths differ.
    pub fn equivalent_location(&self, other: &Region) -> Result<bool, RegionError> {
        if self.context.length() != other.context.length() {
            return Err(ContextError::Mismatch {
                left: self.context.to_string(),
                right: other.context.to_string(),
            }
            .into());
        }
        Ok(self.equivalent_ends(other))
    }

    fn equivalent_ends(&self, other: &Region) -> bool {
        self.left_end() == other.left_end() && self.right_end() == other.right_end()
    }

    fn set_left_raw(&mut self, position: i64) {
        match self.direction {
            Direction::Forward => self.start = position,
            Direction::Reverse => self.end = position,
        }
    }

    fn set_right_raw(&mut self, position: i64) {
        match self.direction {
            Direction::Forward => self.end = position,
            Direction::Reverse => self.start = position,
        }
    }

    /// Move the left end to `position`
    ///
    /// # Errors
    ///
    /// Returns an error if the position escapes a linear context or the
    /// resulting ends are out of order.
    pub fn set_left_end(&mut self, position: i64) -> Result<(), RegionError> {
        let updated = Region::from_ends(
            position,
            self.right_end(),
            Arc::clone(&self.context),
            self.direction,
        )?;
        self.start = updated.start;
        self.end = updated.end;
        Ok(())
    }

    /// Move the right end to `position`
    ///
    /// # Errors
    ///
    /// Returns an error if the position escapes a linear context or the
    /// resulting ends are out of order.
    pub fn set_right_end(&mut self, position: i64) -> Result<(), RegionError> {
        let updated = Region::from_ends(
            self.left_end(),
            position,
            Arc::clone(&self.context),
            self.direction,
        )?;
        self.start = updated.start;
        self.end = updated.end;
        Ok(())
    }

    fn checked_length(&self, delta: i64) -> Result<(), RegionError> {
        let length = self.length() + delta;
        let max = self.context.length();
        if length < 1 || length > max {
            return Err(RegionError::InvalidLength { length, max });
        }
        Ok(())
    }

    /// Grow the left end leftwards by `delta` (negative shrinks)
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidLength` if the length leaves `[1, context
    /// length]`, or `RegionError::Context` if a linear bound is exceeded.
    pub fn extend_left_end(&mut self, delta: i64) -> Result<(), RegionError> {
        self.checked_length(delta)?;
        let left = self.context.translate_pos(self.left_end() - delta)?;
        self.set_left_raw(left);
        Ok(())
    }

    /// Grow the right end rightwards by `delta` (negative shrinks)
    ///
    /// # Errors
    ///
    /// See [`Region::extend_left_end`].
    pub fn extend_right_end(&mut self, delta: i64) -> Result<(), RegionError> {
        self.checked_length(delta)?;
        let right = self.context.translate_pos(self.right_end() + delta)?;
        self.set_right_raw(right);
        Ok(())
    }

    /// Grow the region at its start by `delta` (negative shrinks)
    ///
    /// # Errors
    ///
    /// See [`Region::extend_left_end`].
    pub fn extend_start(&mut self, delta: i64) -> Result<(), RegionError> {
        match self.direction {
            Direction::Forward => self.extend_left_end(delta),
            Direction::Reverse => self.extend_right_end(delta),
        }
    }

    /// Grow the region at its end by `delta` (negative shrinks)
    ///
    /// # Errors
    ///
    /// See [`Region::extend_left_end`].
    pub fn extend_end(&mut self, delta: i64) -> Result<(), RegionError> {
        match self.direction {
            Direction::Forward => self.extend_right_end(delta),
            Direction::Reverse => self.extend_left_end(delta),
        }
    }

    /// Flip direction; the covered positions are unchanged
    pub fn reverse_direction(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        self.direction = self.direction.flipped();
    }

    pub fn set_forward(&mut self) {
        if self.is_reverse() {
            self.reverse_direction();
        }
    }

    pub fn set_reverse(&mut self) {
        if self.is_forward() {
            self.reverse_direction();
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arrow = match self.direction {
            Direction::Forward => "->",
            Direction::Reverse => "<-",
        };
        if let Some(name) = &self.name {
            write!(f, "{name}:")?;
        }
        write!(
            f,
            "{}{arrow}{} [{} bp of {}]",
            self.start,
            self.end,
            self.length(),
            self.context
        )
    }
}
