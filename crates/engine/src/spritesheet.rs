//! Spritesheet cropping
//!
//! A spritesheet node draws one cell of a packed atlas. The cell descriptor
//! is a `Value`, so the row and column can follow the state (animation
//! frames, board contents).

use easel_render::Rect;
use serde::{Deserialize, Serialize};

use crate::node::Drawable;
use crate::state::GameState;
use crate::value::Value;

/// One cell of an atlas grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteCell {
    pub row: f32,
    pub column: f32,
    pub width: f32,
    pub height: f32,
    /// Inset inside each cell
    #[serde(default)]
    pub padding: f32,
    /// Space between neighbouring cells
    #[serde(default)]
    pub gap: f32,
}

impl SpriteCell {
    pub fn new(row: f32, column: f32, width: f32, height: f32) -> Self {
        Self {
            row,
            column,
            width,
            height,
            padding: 0.0,
            gap: 0.0,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Atlas region for this cell
    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.column * self.width + self.padding + self.gap * self.column,
            self.row * self.height + self.padding + self.gap * self.row,
            self.width - 2.0 * self.padding,
            self.height - 2.0 * self.padding,
        )
    }
}

impl<S: GameState, D: 'static> Drawable<S, D> {
    /// Crop the node's image to an atlas cell
    ///
    /// An unset cell crops to an empty rectangle, which draws nothing.
    pub fn spritesheet(self, cell: impl Into<Value<SpriteCell, S, D>>) -> Self {
        let cell = cell.into();
        self.source_with(move |state, data| {
            cell.resolve(state, data)
                .map(|cell| cell.source_rect())
                .unwrap_or_default()
        })
    }

    /// Crop to a cell computed from state and payload
    pub fn spritesheet_with(self, f: impl Fn(&S, &D) -> SpriteCell + 'static) -> Self {
        self.spritesheet(Value::computed(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::state::Globals;

    #[test]
    fn test_source_rect() {
        let cell = SpriteCell::new(2.0, 3.0, 16.0, 16.0);
        assert_eq!(cell.source_rect(), Rect::new(48.0, 32.0, 16.0, 16.0));
    }

    #[test]
    fn test_source_rect_with_padding_and_gap() {
        let cell = SpriteCell::new(1.0, 2.0, 20.0, 10.0).with_padding(1.0).with_gap(4.0);
        assert_eq!(cell.source_rect(), Rect::new(2.0 * 20.0 + 1.0 + 8.0, 10.0 + 1.0 + 4.0, 18.0, 8.0));
    }

    #[test]
    fn test_cell_follows_state() {
        let node: Node<Globals> = Drawable::<Globals>::empty()
            .spritesheet_with(|state, _| {
                let frame = (state.now / 100.0).floor() as f32 % 4.0;
                SpriteCell::new(0.0, frame, 8.0, 8.0)
            })
            .into();
        let mut state = Globals::default();
        assert_eq!(node.resolve(&state).source, Some(Rect::new(0.0, 0.0, 8.0, 8.0)));
        state.now = 250.0;
        assert_eq!(node.resolve(&state).source, Some(Rect::new(16.0, 0.0, 8.0, 8.0)));
    }

    #[test]
    fn test_unset_cell_is_empty() {
        let node: Node<Globals> = Drawable::<Globals>::empty().spritesheet(Value::Unset).into();
        let source = node.resolve(&Globals::default()).source.unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn test_literal_cell() {
        let node: Node<Globals> = Drawable::<Globals>::empty()
            .spritesheet(SpriteCell::new(2.0, 0.0, 16.0, 16.0))
            .into();
        assert_eq!(
            node.resolve(&Globals::default()).source,
            Some(Rect::new(0.0, 32.0, 16.0, 16.0))
        );
    }
}
