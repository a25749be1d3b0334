//! Breakout
//!
//! Seven rows of bricks, a paddle on the arrow keys and a ball launched with
//! Space. The ball keeps its simulated bounds in the layout registry so that
//! several update slices in one frame collide against where it really is.

use std::f32::consts::PI;

use log::debug;
use serde::Serialize;

use easel_engine::{
    amend, collides, Context, Drawable, FontSpec, GameState, Globals, Key, Node, NodeId, Point, Rect, RenderColor,
    StartConfig, TextAlign,
};

use crate::random::Rng;

pub const COLORS: [RenderColor; 7] = [
    RenderColor::rgb(255, 0, 0),
    RenderColor::rgb(255, 165, 0),
    RenderColor::rgb(255, 255, 0),
    RenderColor::rgb(0, 128, 0),
    RenderColor::rgb(0, 0, 255),
    RenderColor::rgb(75, 0, 130),
    RenderColor::rgb(0, 255, 255),
];
const GRAY: RenderColor = RenderColor::rgb(128, 128, 128);

pub const ROWS: usize = COLORS.len();
pub const COLUMNS: usize = 12;
pub const BRICK_WIDTH: f32 = 50.0;
pub const BRICK_HEIGHT: f32 = 10.0;
pub const GAP: f32 = 5.0;
pub const WIDTH: u32 = COLUMNS as u32 * BRICK_WIDTH as u32 + (COLUMNS as u32 + 1) * GAP as u32;
pub const HEIGHT: u32 = (ROWS as u32 * BRICK_HEIGHT as u32 + (ROWS as u32 + 1) * GAP as u32) * 4;
pub const BALL_DIAMETER: f32 = BRICK_HEIGHT;
/// Pixels per second
pub const BALL_SPEED: f32 = BRICK_HEIGHT * 24.0;

const FIELD_WIDTH: f32 = WIDTH as f32;
const FIELD_HEIGHT: f32 = HEIGHT as f32;
const IMMORTAL_ROWS: [usize; 2] = [1, ROWS - 2];
const IMMORTAL_COLUMNS: [usize; 2] = [1, COLUMNS - 2];

/// Ball velocity for a rebound at `percent` across the paddle
///
/// 0 sends the ball up and left at 45 degrees, 0.5 straight up, 1 up and
/// right.
pub fn ball_bounce(percent: f32) -> Point {
    let theta = -PI / 4.0 + percent * PI / 2.0;
    Point::new(theta.sin() * BALL_SPEED, -theta.cos() * BALL_SPEED)
}

/// Where the ball's center crosses the paddle, widened by the ball radius
pub fn paddle_percent(paddle: Rect, ball: Rect) -> f32 {
    let radius = ball.width / 2.0;
    let min = paddle.x - radius;
    let max = paddle.right() + radius;
    (ball.x + radius - min) / (max - min)
}

pub fn brick_bounds(row: usize, column: usize) -> Rect {
    Rect::new(
        column as f32 * BRICK_WIDTH + (column as f32 + 1.0) * GAP,
        row as f32 * BRICK_HEIGHT + (row as f32 + 1.0) * GAP + FIELD_HEIGHT / 10.0,
        BRICK_WIDTH,
        BRICK_HEIGHT,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Brick {
    pub alive: bool,
    pub immortal: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Paddle {
    pub position: f32,
    /// -1, 0 or 1 while arrow keys are held
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Ball {
    pub position: Point,
    pub velocity: Point,
}

impl Ball {
    pub fn is_moving(&self) -> bool {
        self.velocity.x != 0.0 || self.velocity.y != 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct State {
    globals: Globals,
    pub lives: u32,
    pub score: u64,
    pub level: u32,
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Vec<Brick>>,
    #[serde(skip)]
    rng: Rng,
}

impl GameState for State {
    fn globals(&self) -> &Globals {
        &self.globals
    }

    fn globals_mut(&mut self) -> &mut Globals {
        &mut self.globals
    }
}

impl State {
    pub fn new(rng: Rng) -> Self {
        let mut state = Self {
            globals: Globals::default(),
            lives: 0,
            score: 0,
            level: 0,
            paddle: Paddle {
                position: FIELD_WIDTH / 2.0 - BRICK_WIDTH / 2.0,
                velocity: 0.0,
            },
            ball: Ball::default(),
            bricks: Vec::new(),
            rng,
        };
        state.restart();
        state
    }

    /// New game
    pub fn restart(&mut self) {
        self.lives = 3;
        self.score = 0;
        self.level = 1;
        self.restart_bricks();
    }

    /// Fresh wall for the next level, with a life as reward
    pub fn restart_bricks(&mut self) {
        self.bricks = (0..ROWS)
            .map(|row| {
                (0..COLUMNS)
                    .map(|column| Brick {
                        alive: true,
                        immortal: IMMORTAL_ROWS.contains(&row) && IMMORTAL_COLUMNS.contains(&column),
                    })
                    .collect()
            })
            .collect();
        self.lives += 1;
        self.level += 1;
        debug!("Breakout level {} with {} lives", self.level, self.lives);
    }

    pub fn brick(&self, row: usize, column: usize) -> Option<&Brick> {
        self.bricks.get(row)?.get(column)
    }

    pub fn brick_color(&self, row: usize, column: usize) -> RenderColor {
        match self.brick(row, column) {
            Some(brick) if brick.immortal => GRAY,
            Some(brick) if brick.alive => COLORS[row],
            _ => RenderColor::BLACK,
        }
    }

    /// Bricks left to clear, immortal ones excluded
    pub fn bricks_left(&self) -> usize {
        self.bricks
            .iter()
            .flatten()
            .filter(|brick| brick.alive && !brick.immortal)
            .count()
    }

    /// Where the ball is drawn: its own position in flight, on the paddle
    /// otherwise
    pub fn ball_origin(&self) -> Point {
        if self.ball.is_moving() {
            self.ball.position
        } else {
            Point::new(
                self.paddle.position + BRICK_WIDTH / 2.0 - BALL_DIAMETER / 2.0,
                FIELD_HEIGHT - 2.0 * GAP - 2.0 * BRICK_HEIGHT,
            )
        }
    }

    /// Launch from `from` with a random angle, or stop a ball in flight
    pub fn toggle_launch(&mut self, from: Point) {
        if self.ball.is_moving() {
            self.ball.velocity = Point::default();
        } else {
            self.ball.position = from;
            self.ball.velocity = ball_bounce(self.rng.next_f32());
        }
    }

    pub fn move_paddle(&mut self, dt: f32) {
        let x = self.paddle.position + self.paddle.velocity * dt * FIELD_WIDTH / 3.0;
        self.paddle.position = x.clamp(GAP, FIELD_WIDTH - BRICK_WIDTH - GAP);
    }

    /// Rebound off the paddle; returns the corrected ball bounds
    ///
    /// Only a falling ball rebounds. Clearing the last brick here starts the
    /// next level.
    pub fn hit_paddle(&mut self, paddle: Rect, ball: Rect) -> Option<Rect> {
        if self.ball.velocity.y <= 0.0 {
            return None;
        }
        let overlap = collides(paddle, ball)?;
        self.ball.velocity = ball_bounce(paddle_percent(paddle, ball));
        let bounds = amend(ball, paddle, overlap).bounds;
        self.ball.position = Point::new(bounds.x, bounds.y);
        if self.bricks_left() == 0 {
            self.restart_bricks();
        }
        Some(bounds)
    }

    /// Rebound off a live brick, breaking it unless it is immortal
    pub fn hit_brick(&mut self, row: usize, column: usize, brick: Rect, ball: Rect) -> Option<Rect> {
        let cell = *self.brick(row, column)?;
        if !cell.alive {
            return None;
        }
        let overlap = collides(brick, ball)?;
        if overlap.height > overlap.width {
            self.ball.velocity.x = -self.ball.velocity.x;
        } else {
            self.ball.velocity.y = -self.ball.velocity.y;
        }
        let bounds = amend(ball, brick, overlap).bounds;
        self.ball.position = Point::new(bounds.x, bounds.y);

        if !cell.immortal {
            let power = (ROWS - row - 1) as u32;
            self.score += 10 * self.level as u64 * 2u64.pow(power);
            if let Some(brick) = self.bricks.get_mut(row).and_then(|r| r.get_mut(column)) {
                brick.alive = false;
            }
        }
        Some(bounds)
    }

    /// Side walls and ceiling, then the floor
    pub fn bounce_walls(&mut self) {
        let Ball { position, velocity } = &mut self.ball;
        if (velocity.x < 0.0 && position.x <= GAP)
            || (velocity.x > 0.0 && position.x + BALL_DIAMETER > FIELD_WIDTH - GAP)
        {
            velocity.x = -velocity.x;
        }
        if velocity.y < 0.0 && position.y <= GAP {
            velocity.y = -velocity.y;
        }
        if velocity.y > 0.0 && position.y > FIELD_HEIGHT {
            *velocity = Point::default();
            self.lives = self.lives.saturating_sub(1);
            debug!("Ball lost, {} lives left", self.lives);
            if self.lives == 0 {
                self.restart();
            }
        }
    }
}

/// Layout ids the ball collides against
struct Targets {
    paddle: NodeId,
    bricks: Vec<(NodeId, usize, usize)>,
}

#[derive(Debug, Clone, Copy)]
struct BrickTile {
    row: usize,
    column: usize,
}

fn bricks() -> Vec<Drawable<State, BrickTile>> {
    (0..ROWS)
        .flat_map(|row| (0..COLUMNS).map(move |column| (row, column)))
        .map(|(row, column)| {
            let bounds = brick_bounds(row, column);
            Drawable::<State, BrickTile>::new(BrickTile { row, column })
                .bounds(bounds.x, bounds.y, bounds.width, bounds.height)
                .background_with(|state, tile| state.brick_color(tile.row, tile.column))
        })
        .collect()
}

fn paddle() -> Drawable<State> {
    Drawable::<State>::empty()
        .x_with(|state, _| state.paddle.position)
        .y(FIELD_HEIGHT - BRICK_HEIGHT - GAP)
        .width(BRICK_WIDTH)
        .height(BRICK_HEIGHT)
        .background(RenderColor::WHITE)
        .on_update(|_, cx| cx.state.move_paddle(cx.delta_secs()))
        .on_key_down(|_, cx, signal| match signal.key() {
            Some(Key::ArrowLeft) => cx.state.paddle.velocity -= 1.0,
            Some(Key::ArrowRight) => cx.state.paddle.velocity += 1.0,
            _ => {}
        })
        .on_key_up(|_, cx, signal| match signal.key() {
            Some(Key::ArrowLeft) => cx.state.paddle.velocity += 1.0,
            Some(Key::ArrowRight) => cx.state.paddle.velocity -= 1.0,
            _ => {}
        })
}

/// Move the ball one slice and resolve its collisions
fn advance_ball(targets: &Targets, cx: &mut Context<'_, State>) {
    let dt = cx.delta_secs();
    let velocity = cx.state.ball.velocity;
    cx.state.ball.position.x += velocity.x * dt;
    cx.state.ball.position.y += velocity.y * dt;

    let Some(mut ball) = cx.bounds() else {
        return;
    };
    ball = ball.translate(velocity.x * dt, velocity.y * dt);

    if let Some(paddle) = cx.layout.bounds(targets.paddle) {
        if let Some(amended) = cx.state.hit_paddle(paddle, ball) {
            ball = amended;
        }
    }

    for &(id, row, column) in &targets.bricks {
        let Some(brick) = cx.layout.bounds(id) else {
            continue;
        };
        if let Some(amended) = cx.state.hit_brick(row, column, brick, ball) {
            ball = amended;
        }
    }

    cx.layout.set_bounds(cx.node, ball);
    cx.state.bounce_walls();
}

fn ball(targets: Targets) -> Drawable<State> {
    Drawable::<State>::empty()
        .x_with(|state, _| state.ball_origin().x)
        .y_with(|state, _| state.ball_origin().y)
        .width(BALL_DIAMETER)
        .height(BALL_DIAMETER)
        .radius(BALL_DIAMETER / 2.0)
        .background(RenderColor::WHITE)
        .on_key_down(|_, cx, signal| {
            if signal.key() == Some(&Key::Space) {
                let from = cx
                    .bounds()
                    .map(|bounds| Point::new(bounds.x, bounds.y))
                    .unwrap_or_else(|| cx.state.ball_origin());
                cx.state.toggle_launch(from);
            }
        })
        .on_update(move |_, cx| advance_ball(&targets, cx))
}

fn hud_font() -> FontSpec {
    FontSpec::new(24.0, "Courier New")
}

/// The full scene: bricks, ball, paddle, then the lives and score lines
pub fn scene(rng: Rng) -> StartConfig<State> {
    let bricks = bricks();
    let paddle = paddle();
    let targets = Targets {
        paddle: paddle.id(),
        bricks: bricks
            .iter()
            .map(|brick| {
                let tile = brick.data();
                (brick.id(), tile.row, tile.column)
            })
            .collect(),
    };

    let lives = Drawable::<State>::empty()
        .x(GAP)
        .y(GAP)
        .text_with(|state, _| format!("Lives: {}", state.lives))
        .color(RenderColor::WHITE)
        .font(hud_font());
    let score = Drawable::<State>::empty()
        .x(FIELD_WIDTH - GAP)
        .y(GAP)
        .align(TextAlign::Right)
        .text_with(|state, _| format!("Score: {}", state.score))
        .color(RenderColor::WHITE)
        .font(hud_font());

    let nodes: Vec<Node<State>> = bricks
        .into_iter()
        .map(Node::from)
        .chain([
            Node::from(ball(targets)),
            Node::from(paddle),
            Node::from(lives),
            Node::from(score),
        ])
        .collect();

    StartConfig::new(WIDTH, HEIGHT, State::new(rng))
        .background(RenderColor::BLACK)
        .nodes(nodes)
}
