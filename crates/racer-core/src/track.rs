//! Track segment stack.
//!
//! A track is a straight chain of tiles. Each new tile is placed one stride
//! further along the depth axis (+Z) from the previous one, keeping its
//! lateral and vertical coordinates. Tiles can only be appended or removed
//! from the end.

use glam::Vec3;

/// A placed track tile: its visual, its static body and its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSegment<V, B> {
    pub visual: V,
    pub body: B,
    pub position: Vec3,
}

/// Position for the next segment given the last placed one.
///
/// The first segment sits at the origin.
pub fn next_segment_position(previous: Option<Vec3>, stride: f32) -> Vec3 {
    match previous {
        Some(last) => Vec3::new(last.x, last.y, last.z + stride),
        None => Vec3::ZERO,
    }
}

/// Ordered, append/pop-only sequence of track segments.
#[derive(Clone, Debug)]
pub struct TrackLayout<V, B> {
    segments: Vec<TrackSegment<V, B>>,
    stride: f32,
}

impl<V, B> TrackLayout<V, B> {
    pub fn new(stride: f32) -> Self {
        Self {
            segments: Vec::new(),
            stride,
        }
    }

    /// Where the next appended segment will go.
    pub fn next_position(&self) -> Vec3 {
        next_segment_position(self.last().map(|s| s.position), self.stride)
    }

    /// Append a segment. Its position must come from [`Self::next_position`].
    pub fn push(&mut self, segment: TrackSegment<V, B>) {
        debug_assert_eq!(segment.position, self.next_position());
        self.segments.push(segment);
    }

    /// Remove and return the most recently added segment.
    pub fn pop(&mut self) -> Option<TrackSegment<V, B>> {
        self.segments.pop()
    }

    pub fn last(&self) -> Option<&TrackSegment<V, B>> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[TrackSegment<V, B>] {
        &self.segments
    }

    /// Segment positions in placement order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.segments.iter().map(|s| s.position)
    }
}
