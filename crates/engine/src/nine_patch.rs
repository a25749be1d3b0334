//! Nine-patch panels
//!
//! The node's own visuals and children are rendered into a scratch raster the
//! size of the source, then copied to the target rectangle as a 3x3 grid:
//! corners unscaled, edges stretched along one axis, the center along both.

use easel_render::Rect;
use serde::{Deserialize, Serialize};

use crate::node::Drawable;
use crate::state::GameState;
use crate::value::Value;

/// Source size and border insets of a nine-patch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NinePatch {
    /// Source width in pixels
    pub width: f32,
    /// Source height in pixels
    pub height: f32,
    /// Border inset in the source
    pub source_edge: f32,
    /// Border inset in the target
    pub destination_edge: f32,
}

/// One copied cell: `source` in scratch pixels, `destination` relative to
/// the target's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchRegion {
    pub source: Rect,
    pub destination: Rect,
}

impl NinePatch {
    pub fn new(width: f32, height: f32, source_edge: f32, destination_edge: f32) -> Self {
        Self {
            width,
            height,
            source_edge,
            destination_edge,
        }
    }

    /// Scratch raster size, whole pixels
    pub fn source_size(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }

    /// The nine regions for a target of `width` x `height`, row by row
    ///
    /// Edges are clamped to half of their extent, so a target smaller than
    /// twice the destination edge shrinks the corners instead of producing
    /// negative sizes.
    pub fn regions(&self, width: f32, height: f32) -> [PatchRegion; 9] {
        let (source_width, source_height) = self.source_size();
        let (source_width, source_height) = (source_width as f32, source_height as f32);
        let source_edge = non_negative(self.source_edge);
        let destination_edge = non_negative(self.destination_edge);

        let source_columns = grid_lines(source_width, source_edge);
        let source_rows = grid_lines(source_height, source_edge);
        let destination_columns = grid_lines(width, destination_edge);
        let destination_rows = grid_lines(height, destination_edge);

        std::array::from_fn(|i| {
            let (row, column) = (i / 3, i % 3);
            PatchRegion {
                source: span(&source_columns, &source_rows, column, row),
                destination: span(&destination_columns, &destination_rows, column, row),
            }
        })
    }
}

fn non_negative(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.max(0.0)
    }
}

fn to_pixels(v: f32) -> u32 {
    non_negative(v).round() as u32
}

/// `[0, edge, extent - edge, extent]` with the edge clamped to half the extent
fn grid_lines(extent: f32, edge: f32) -> [f32; 4] {
    let extent = non_negative(extent);
    let edge = edge.min(extent / 2.0);
    [0.0, edge, extent - edge, extent]
}

fn span(columns: &[f32; 4], rows: &[f32; 4], column: usize, row: usize) -> Rect {
    Rect::new(
        columns[column],
        rows[row],
        columns[column + 1] - columns[column],
        rows[row + 1] - rows[row],
    )
}

impl<S: GameState, D: 'static> Drawable<S, D> {
    /// Draw this node through a nine-patch
    pub fn nine_patch(mut self, patch: impl Into<Value<NinePatch, S, D>>) -> Self {
        self.element.patch = patch.into();
        self
    }

    pub fn nine_patch_with(self, f: impl Fn(&S, &D) -> NinePatch + 'static) -> Self {
        self.nine_patch(Value::computed(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNERS: [usize; 4] = [0, 2, 6, 8];

    #[test]
    fn test_corners_copied_unscaled() {
        let patch = NinePatch::new(16.0, 16.0, 3.0, 3.0);
        let regions = patch.regions(600.0, 50.0);
        for i in CORNERS {
            let region = regions[i];
            assert_eq!(region.source.width, region.destination.width);
            assert_eq!(region.source.height, region.destination.height);
            assert_eq!(region.source.width, 3.0);
        }
    }

    #[test]
    fn test_corner_size_independent_of_target() {
        let patch = NinePatch::new(16.0, 16.0, 3.0, 7.5);
        for (w, h) in [(15.0, 15.0), (600.0, 50.0), (40.0, 400.0)] {
            let regions = patch.regions(w, h);
            for i in CORNERS {
                assert_eq!(regions[i].destination.width, 7.5);
                assert_eq!(regions[i].destination.height, 7.5);
                assert_eq!(regions[i].source.width, 3.0);
            }
        }
    }

    #[test]
    fn test_edges_and_center_stretch() {
        let patch = NinePatch::new(16.0, 16.0, 3.0, 3.0);
        let regions = patch.regions(100.0, 40.0);
        // top edge
        assert_eq!(regions[1].source, Rect::new(3.0, 0.0, 10.0, 3.0));
        assert_eq!(regions[1].destination, Rect::new(3.0, 0.0, 94.0, 3.0));
        // left edge
        assert_eq!(regions[3].destination, Rect::new(0.0, 3.0, 3.0, 34.0));
        // center
        assert_eq!(regions[4].source, Rect::new(3.0, 3.0, 10.0, 10.0));
        assert_eq!(regions[4].destination, Rect::new(3.0, 3.0, 94.0, 34.0));
        // bottom-right corner
        assert_eq!(regions[8].destination, Rect::new(97.0, 37.0, 3.0, 3.0));
    }

    #[test]
    fn test_regions_cover_target() {
        let patch = NinePatch::new(16.0, 16.0, 3.0, 7.5);
        let regions = patch.regions(600.0, 50.0);
        let area: f32 = regions
            .iter()
            .map(|r| r.destination.width * r.destination.height)
            .sum();
        assert_eq!(area, 600.0 * 50.0);
    }

    #[test]
    fn test_small_target_clamps_edges() {
        let patch = NinePatch::new(16.0, 16.0, 3.0, 10.0);
        let regions = patch.regions(12.0, 30.0);
        assert!(regions.iter().all(|r| r.destination.width >= 0.0 && r.destination.height >= 0.0));
        assert_eq!(regions[0].destination, Rect::new(0.0, 0.0, 6.0, 10.0));
        assert_eq!(regions[1].destination.width, 0.0);
    }

    #[test]
    fn test_source_size_rounds() {
        assert_eq!(NinePatch::new(15.6, -2.0, 0.0, 0.0).source_size(), (16, 0));
    }
}
