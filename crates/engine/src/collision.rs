//! Axis-aligned collision helpers

use easel_render::Rect;

/// Axis a mover was pushed along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Result of pushing a mover out of an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amendment {
    pub bounds: Rect,
    pub axis: Axis,
}

/// Overlap of two rectangles, `None` when they only touch or are apart
pub fn collides(a: Rect, b: Rect) -> Option<Rect> {
    a.intersection(&b)
}

/// Push `mover` out of `obstacle` along the axis of least penetration
///
/// `overlap` is the rectangle returned by [`collides`]. The mover moves
/// away from the obstacle's center.
pub fn amend(mover: Rect, obstacle: Rect, overlap: Rect) -> Amendment {
    let mover_center = (mover.x + mover.width / 2.0, mover.y + mover.height / 2.0);
    let obstacle_center = (
        obstacle.x + obstacle.width / 2.0,
        obstacle.y + obstacle.height / 2.0,
    );

    if overlap.width < overlap.height {
        let dx = if mover_center.0 < obstacle_center.0 {
            -overlap.width
        } else {
            overlap.width
        };
        Amendment {
            bounds: mover.translate(dx, 0.0),
            axis: Axis::X,
        }
    } else {
        let dy = if mover_center.1 < obstacle_center.1 {
            -overlap.height
        } else {
            overlap.height
        };
        Amendment {
            bounds: mover.translate(0.0, dy),
            axis: Axis::Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collides_overlap() {
        let paddle = Rect::new(100.0, 400.0, 50.0, 10.0);
        let ball = Rect::new(120.0, 395.0, 10.0, 10.0);
        assert_eq!(collides(paddle, ball), Some(Rect::new(120.0, 400.0, 10.0, 5.0)));
        assert_eq!(collides(paddle, Rect::new(120.0, 390.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_amend_pushes_up_out_of_paddle() {
        let paddle = Rect::new(100.0, 400.0, 50.0, 10.0);
        let ball = Rect::new(120.0, 397.0, 10.0, 10.0);
        let overlap = collides(ball, paddle).unwrap();
        let amended = amend(ball, paddle, overlap);
        assert_eq!(amended.axis, Axis::Y);
        assert_eq!(amended.bounds, Rect::new(120.0, 390.0, 10.0, 10.0));
        assert_eq!(collides(amended.bounds, paddle), None);
    }

    #[test]
    fn test_amend_pushes_sideways() {
        let brick = Rect::new(100.0, 50.0, 50.0, 10.0);
        let ball = Rect::new(148.0, 50.0, 10.0, 10.0);
        let overlap = collides(ball, brick).unwrap();
        let amended = amend(ball, brick, overlap);
        assert_eq!(amended.axis, Axis::X);
        assert_eq!(amended.bounds.x, 150.0);
    }
}
