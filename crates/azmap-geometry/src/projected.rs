//! Flat vertex buffer plus segment table, the output of every geometry build.

use std::ops::Range;

use glam::DVec2;
use serde::Serialize;

use crate::error::GeometryError;

/// One independently drawable run of vertices in a [`ProjectedGeometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Index of the first vertex.
    pub start: usize,
    /// Number of vertices.
    pub count: usize,
}

impl Segment {
    /// Vertex index range covered by this segment.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

/// Planar geometry in km: vertices plus `(start, count)` segments.
///
/// Segments never overlap and always lie inside the vertex buffer. An
/// optional segment limit turns overflow into a counted drop instead of
/// unbounded growth.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProjectedGeometry {
    vertices: Vec<[f32; 2]>,
    segments: Vec<Segment>,
    #[serde(skip)]
    segment_limit: Option<usize>,
    #[serde(skip)]
    dropped_segments: usize,
}

impl ProjectedGeometry {
    /// Create an empty geometry with no segment limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty geometry that keeps at most `limit` segments.
    pub fn with_segment_limit(limit: usize) -> Self {
        Self {
            segment_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Configured segment limit.
    #[inline]
    pub fn segment_limit(&self) -> Option<usize> {
        self.segment_limit
    }

    /// Segments discarded because the limit was reached during the last build.
    #[inline]
    pub fn dropped_segments(&self) -> usize {
        self.dropped_segments
    }

    /// Drop all vertices and segments, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.segments.clear();
        self.dropped_segments = 0;
    }

    /// Clear and make room for at least the given number of vertices and
    /// segments.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if the buffers cannot grow;
    /// the geometry is left empty.
    pub fn reset_with_capacity(
        &mut self,
        vertices: usize,
        segments: usize,
    ) -> Result<(), GeometryError> {
        self.clear();
        self.vertices.try_reserve(vertices)?;
        self.segments.try_reserve(segments)?;
        Ok(())
    }

    /// All vertices, as `[x, y]` km pairs.
    #[inline]
    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    /// The segment table.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if there is nothing to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Vertices of segment `index`.
    pub fn segment_vertices(&self, index: usize) -> Option<&[[f32; 2]]> {
        let segment = self.segments.get(index)?;
        self.vertices.get(segment.range())
    }

    /// Iterate over the vertex slice of every segment.
    pub fn iter_segments(&self) -> impl Iterator<Item = &[[f32; 2]]> + '_ {
        self.segments.iter().map(|s| &self.vertices[s.range()])
    }

    /// Raw vertex bytes for upload to a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Append a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if the buffer cannot grow.
    pub fn push_vertex(&mut self, p: DVec2) -> Result<(), GeometryError> {
        self.vertices.try_reserve(1)?;
        self.vertices.push([p.x as f32, p.y as f32]);
        Ok(())
    }

    /// Record `count` vertices starting at `start` as a segment.
    ///
    /// Returns `false` if the segment limit is reached; the drop is counted
    /// and the vertices stay in the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if the table cannot grow.
    pub fn push_segment(&mut self, start: usize, count: usize) -> Result<bool, GeometryError> {
        debug_assert!(start + count <= self.vertices.len());
        debug_assert!(
            self.segments
                .last()
                .is_none_or(|last| last.start + last.count <= start),
            "segments must not overlap"
        );

        if let Some(limit) = self.segment_limit
            && self.segments.len() >= limit
        {
            self.dropped_segments += 1;
            return Ok(false);
        }
        self.segments.try_reserve(1)?;
        self.segments.push(Segment { start, count });
        Ok(true)
    }

    /// Finish a run of vertices that began at `start`: record it as a
    /// segment if it has at least `min_len` vertices, otherwise remove its
    /// vertices from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if the table cannot grow.
    pub fn close_run(&mut self, start: usize, min_len: usize) -> Result<(), GeometryError> {
        let count = self.vertices.len() - start;
        if count >= min_len && count > 0 {
            self.push_segment(start, count)?;
        } else {
            self.vertices.truncate(start);
        }
        Ok(())
    }

    /// Remove every vertex from `start` onward. Used to abandon a ring that
    /// turned out degenerate.
    pub(crate) fn truncate_vertices(&mut self, start: usize) {
        debug_assert!(
            self.segments
                .last()
                .is_none_or(|last| last.start + last.count <= start)
        );
        self.vertices.truncate(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_points(g: &mut ProjectedGeometry, n: usize) {
        for i in 0..n {
            g.push_vertex(DVec2::new(i as f64, 0.0)).unwrap();
        }
    }

    #[test]
    fn test_segments_slice_vertices() {
        let mut g = ProjectedGeometry::new();
        push_points(&mut g, 5);
        g.push_segment(0, 2).unwrap();
        g.push_segment(2, 3).unwrap();
        assert_eq!(g.segment_vertices(0).unwrap(), &[[0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(g.segment_vertices(1).unwrap().len(), 3);
        assert!(g.segment_vertices(2).is_none());
        assert_eq!(g.iter_segments().count(), 2);
    }

    #[test]
    fn test_close_run_discards_short_runs() {
        let mut g = ProjectedGeometry::new();
        push_points(&mut g, 1);
        g.close_run(0, 2).unwrap();
        assert_eq!(g.vertex_count(), 0);
        assert!(g.is_empty());

        push_points(&mut g, 3);
        g.close_run(0, 2).unwrap();
        assert_eq!(g.segments(), &[Segment { start: 0, count: 3 }]);
    }

    #[test]
    fn test_segment_limit_counts_drops() {
        let mut g = ProjectedGeometry::with_segment_limit(1);
        push_points(&mut g, 4);
        assert!(g.push_segment(0, 2).unwrap());
        assert!(!g.push_segment(2, 2).unwrap());
        assert_eq!(g.segment_count(), 1);
        assert_eq!(g.dropped_segments(), 1);
        assert_eq!(g.vertex_count(), 4);
    }

    #[test]
    fn test_clear_keeps_limit_and_capacity() {
        let mut g = ProjectedGeometry::with_segment_limit(8);
        g.reset_with_capacity(100, 10).unwrap();
        push_points(&mut g, 10);
        g.push_segment(0, 10).unwrap();
        g.clear();
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(g.segment_limit(), Some(8));
        assert!(g.vertices.capacity() >= 100);
    }

    #[test]
    fn test_vertex_bytes_length() {
        let mut g = ProjectedGeometry::new();
        push_points(&mut g, 3);
        assert_eq!(g.vertex_bytes().len(), 3 * 2 * std::mem::size_of::<f32>());
    }
}
