//! Row/column coordinates and half-open ranges.
//!
//! The same [`Position`] type is used for buffer coordinates (raw document rows and character
//! columns) and screen coordinates (rendered rows and cell columns). The two are never mixed
//! implicitly: conversion is the job of the [`Session`](crate::Session).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A zero-based `(row, column)` coordinate.
///
/// Ordering is lexicographic on `(row, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub column: usize,
}

impl Position {
    /// Column value that callers use to mean "end of the row"; sessions clip it.
    pub const END_OF_ROW: usize = usize::MAX;

    /// Create a new position.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The origin `(0, 0)`.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Returns the smaller of two positions.
    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }

    /// Returns the larger of two positions.
    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }

    /// Same row, different column.
    pub fn with_column(self, column: usize) -> Self {
        Self::new(self.row, column)
    }

    /// Render as a `[row, column]` pair.
    pub fn to_array(self) -> [usize; 2] {
        [self.row, self.column]
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, column): (usize, usize)) -> Self {
        Self::new(row, column)
    }
}

impl From<[usize; 2]> for Position {
    fn from([row, column]: [usize; 2]) -> Self {
        Self::new(row, column)
    }
}

impl From<Position> for [usize; 2] {
    fn from(position: Position) -> Self {
        position.to_array()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A half-open range `[start, end)` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Create a range from two endpoints in any order.
    pub fn new(a: impl Into<Position>, b: impl Into<Position>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// An empty range located at `position`.
    pub fn empty_at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns `true` if `start == end`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Render as `[[start_row, start_column], [end_row, end_column]]`.
    pub fn to_array(self) -> [[usize; 2]; 2] {
        [self.start.to_array(), self.end.to_array()]
    }
}

impl From<[[usize; 2]; 2]> for Range {
    fn from([a, b]: [[usize; 2]; 2]) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}
