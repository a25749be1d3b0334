//! Minesweeper
//!
//! A 10x15 board under a menu bar. The menu holds the timer, a face button
//! that restarts the game and the count of unflagged mines. Cells are drawn
//! from a 16px spritesheet; the menu panel is a nine-patch of the empty cell
//! sprite.

use log::debug;
use serde::Serialize;

use easel_engine::{
    Drawable, FontSpec, GameState, Globals, NinePatch, Node, RenderColor, SpriteCell, StartConfig, TextAlign,
    TextBaseline,
};

use crate::random::Rng;

pub const TEXT_WIDTH: f32 = 100.0;
pub const TEXT_OFFSET: f32 = 12.0;
pub const MENU_HEIGHT: f32 = 50.0;
pub const CELL_SIZE: f32 = 40.0;
pub const ROWS: usize = 10;
pub const COLUMNS: usize = 15;
pub const WIDTH: u32 = CELL_SIZE as u32 * COLUMNS as u32;
pub const HEIGHT: u32 = MENU_HEIGHT as u32 + CELL_SIZE as u32 * ROWS as u32;
/// 5% of the cells, rounded up
pub const DANGERS: usize = (ROWS * COLUMNS * 5).div_ceil(100);

const SPRITE_SIZE: f32 = 16.0;
const SOURCE_EDGE: f32 = 3.0;
const DESTINATION_EDGE: f32 = CELL_SIZE / SPRITE_SIZE * SOURCE_EDGE;

pub const SPRITESHEET: &str = "/public/minesweeper.png";
pub const EXPLOSION: &str = "/public/explosion.wav";
const EXPLOSION_VOLUME: f32 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub revealed: bool,
    pub flagged: bool,
    pub dangerous: bool,
    /// Mines among the eight neighbours
    pub surrounding: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Neutral,
    Win,
    Lose,
}

/// Grid of cells, row-major
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        if row < self.rows && column < self.columns {
            self.cells.get(row * self.columns + column)
        } else {
            None
        }
    }

    fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        if row < self.rows && column < self.columns {
            self.cells.get_mut(row * self.columns + column)
        } else {
            None
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// In-bounds neighbours of a cell, not including itself
    fn neighbours(&self, row: usize, column: usize) -> impl Iterator<Item = (usize, usize)> {
        let (rows, columns) = (self.rows, self.columns);
        (-1isize..=1)
            .flat_map(|dy| (-1isize..=1).map(move |dx| (dy, dx)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(move |(dy, dx)| {
                let r = row.checked_add_signed(dy)?;
                let c = column.checked_add_signed(dx)?;
                (r < rows && c < columns).then_some((r, c))
            })
    }

    /// Clear the board and lay `dangers` mines at random
    pub fn restart(&mut self, dangers: usize, rng: &mut Rng) {
        let mut positions: Vec<(usize, usize)> = (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (row, column)))
            .collect();
        rng.shuffle(&mut positions);
        positions.truncate(dangers);
        self.place_dangers(positions);
    }

    /// Clear the board and lay mines at the given cells
    pub fn place_dangers(&mut self, positions: impl IntoIterator<Item = (usize, usize)>) {
        self.cells.fill(Cell::default());
        for (row, column) in positions {
            if let Some(cell) = self.get_mut(row, column) {
                cell.dangerous = true;
            }
        }
        for row in 0..self.rows {
            for column in 0..self.columns {
                let surrounding = self
                    .neighbours(row, column)
                    .filter(|&(r, c)| self.get(r, c).is_some_and(|cell| cell.dangerous))
                    .count() as u8;
                if let Some(cell) = self.get_mut(row, column) {
                    if !cell.dangerous {
                        cell.surrounding = surrounding;
                    }
                }
            }
        }
    }

    /// Reveal a cell, flooding outwards from cells with no surrounding mines
    ///
    /// The flood stops at revealed and flagged cells. Returns the number of
    /// cells revealed.
    pub fn reveal(&mut self, row: usize, column: usize) -> usize {
        let mut revealed = 0;
        let mut pending = vec![(row, column)];
        while let Some((row, column)) = pending.pop() {
            let Some(cell) = self.get_mut(row, column) else {
                continue;
            };
            if cell.revealed || cell.flagged {
                continue;
            }
            cell.revealed = true;
            revealed += 1;
            if !cell.dangerous && cell.surrounding == 0 {
                pending.extend(self.neighbours(row, column));
            }
        }
        revealed
    }

    /// Flag or unflag a hidden cell
    pub fn toggle_flag(&mut self, row: usize, column: usize) {
        if let Some(cell) = self.get_mut(row, column) {
            if !cell.revealed {
                cell.flagged = !cell.flagged;
            }
        }
    }

    pub fn flags(&self) -> usize {
        self.cells.iter().filter(|cell| cell.flagged).count()
    }

    pub fn outcome(&self) -> Outcome {
        if self.cells.iter().any(|cell| cell.dangerous && cell.revealed) {
            Outcome::Lose
        } else if self.cells.iter().any(|cell| !cell.dangerous && !cell.revealed) {
            Outcome::Neutral
        } else {
            Outcome::Win
        }
    }
}

/// Atlas cell showing a board cell
///
/// Numbers 1-8 fill the first two rows; row 2 holds empty, hidden, mine and
/// flag.
pub fn cell_source(cell: &Cell) -> SpriteCell {
    let (row, column) = if cell.revealed {
        if cell.surrounding > 0 {
            let index = (cell.surrounding - 1) as f32;
            ((index / 4.0).floor(), index % 4.0)
        } else if cell.dangerous {
            (2.0, 2.0)
        } else {
            (2.0, 0.0)
        }
    } else if cell.flagged {
        (2.0, 3.0)
    } else {
        (2.0, 1.0)
    };
    SpriteCell::new(row, column, SPRITE_SIZE, SPRITE_SIZE)
}

#[derive(Debug, Clone, Serialize)]
pub struct State {
    globals: Globals,
    pub board: Board,
    /// `now` of the first click of this round
    pub started_at: Option<f64>,
    /// `now` of the latest click
    pub last_revealed_at: f64,
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
            board: Board::new(ROWS, COLUMNS),
            started_at: None,
            last_revealed_at: 0.0,
            rng,
        };
        state.restart();
        state
    }

    pub fn restart(&mut self) {
        self.started_at = None;
        self.last_revealed_at = 0.0;
        self.board.restart(DANGERS, &mut self.rng);
        debug!("New minesweeper board with {} mines", DANGERS);
    }

    /// Apply a click on a cell; returns true when it set off a mine
    ///
    /// Clicks after the round is decided are ignored.
    pub fn click(&mut self, row: usize, column: usize, is_right_click: bool) -> bool {
        if self.board.outcome() != Outcome::Neutral {
            return false;
        }

        let mut exploded = false;
        if is_right_click {
            self.board.toggle_flag(row, column);
        } else if let Some(cell) = self.board.get(row, column).copied() {
            if !cell.revealed && !cell.flagged {
                exploded = cell.dangerous;
                self.board.reveal(row, column);
            }
        }

        let now = self.globals.now;
        self.last_revealed_at = now;
        self.started_at.get_or_insert(now);
        exploded
    }

    /// Whole seconds on the clock; frozen once the round is decided
    pub fn elapsed_secs(&self) -> u64 {
        let now = self.globals.now;
        let millis = match self.board.outcome() {
            Outcome::Neutral => now - self.started_at.unwrap_or(now),
            _ => self.last_revealed_at - self.started_at.unwrap_or(self.last_revealed_at),
        };
        (millis.max(0.0) / 1000.0).floor() as u64
    }

    /// `MM:SS`, the colon blinking off on odd seconds
    pub fn timer_text(&self) -> String {
        let elapsed = self.elapsed_secs();
        let (minutes, seconds) = (elapsed / 60, elapsed % 60);
        let separator = if seconds % 2 == 1 { ' ' } else { ':' };
        format!("{:02}{}{:02}", minutes, separator, seconds)
    }

    pub fn mines_left_text(&self) -> String {
        format!("{:02}", DANGERS.saturating_sub(self.board.flags()))
    }

    pub fn face(&self) -> &'static str {
        match self.board.outcome() {
            Outcome::Win => "😎",
            Outcome::Lose => "😵",
            Outcome::Neutral if self.globals.mouse.left_is_down => "😮",
            Outcome::Neutral => "🙂",
        }
    }
}

/// Board position carried by a cell node
#[derive(Debug, Clone, Copy)]
struct Tile {
    row: usize,
    column: usize,
}

fn counter_font() -> FontSpec {
    FontSpec::new(MENU_HEIGHT - TEXT_OFFSET * 2.0 - 5.0, "Courier New")
}

fn menu() -> Node<State> {
    let panel = Drawable::<State>::empty()
        .bounds(0.0, 0.0, WIDTH as f32, MENU_HEIGHT)
        .nine_patch(NinePatch::new(SPRITE_SIZE, SPRITE_SIZE, SOURCE_EDGE, DESTINATION_EDGE))
        .child(
            Drawable::<State>::empty()
                .bounds(0.0, 0.0, SPRITE_SIZE, SPRITE_SIZE)
                .image(SPRITESHEET)
                .spritesheet(SpriteCell::new(2.0, 0.0, SPRITE_SIZE, SPRITE_SIZE)),
        );

    let timer = Drawable::<State>::empty()
        .bounds(TEXT_OFFSET, TEXT_OFFSET, TEXT_WIDTH, MENU_HEIGHT - 2.0 * TEXT_OFFSET)
        .baseline(TextBaseline::Middle)
        .align(TextAlign::Center)
        .text_with(|state, _| state.timer_text())
        .color(RenderColor::RED)
        .font(counter_font())
        .background(RenderColor::BLACK);

    let face = Drawable::<State>::empty()
        .bounds(WIDTH as f32 / 2.0 - 25.0, MENU_HEIGHT / 2.0 - 25.0, 50.0, 50.0)
        .baseline(TextBaseline::Middle)
        .align(TextAlign::Center)
        .font(FontSpec::new(MENU_HEIGHT / 2.0, "Courier New"))
        .text_with(|state, _| state.face().to_string())
        .on_click(|_, cx, _| cx.state.restart());

    let mines_left = Drawable::<State>::empty()
        .bounds(
            WIDTH as f32 - TEXT_OFFSET - TEXT_WIDTH,
            TEXT_OFFSET,
            TEXT_WIDTH,
            MENU_HEIGHT - 2.0 * TEXT_OFFSET,
        )
        .baseline(TextBaseline::Middle)
        .align(TextAlign::Center)
        .text_with(|state, _| state.mines_left_text())
        .color(RenderColor::RED)
        .background(RenderColor::BLACK)
        .font(counter_font());

    Drawable::<State>::empty()
        .bounds(0.0, 0.0, WIDTH as f32, MENU_HEIGHT)
        .children([panel, timer, face, mines_left])
        .into_node()
}

fn cell(row: usize, column: usize) -> Node<State> {
    Drawable::<State, Tile>::new(Tile { row, column })
        .bounds(
            column as f32 * CELL_SIZE,
            row as f32 * CELL_SIZE + MENU_HEIGHT,
            CELL_SIZE,
            CELL_SIZE,
        )
        .image(SPRITESHEET)
        .spritesheet_with(|state, tile| {
            state
                .board
                .get(tile.row, tile.column)
                .map(cell_source)
                .unwrap_or_default()
        })
        .on_click(|tile, cx, _| {
            if cx.state.click(tile.row, tile.column, false) {
                cx.instance.play(EXPLOSION, EXPLOSION_VOLUME);
            }
        })
        .on_context(|tile, cx, _| {
            cx.state.click(tile.row, tile.column, true);
        })
        .into_node()
}

/// The full scene: menu then the board
pub fn scene(rng: Rng) -> StartConfig<State> {
    let cells = (0..ROWS).flat_map(|row| (0..COLUMNS).map(move |column| cell(row, column)));
    StartConfig::new(WIDTH, HEIGHT, State::new(rng))
        .node(menu())
        .nodes(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_engine::{Engine, InputEvent, MouseButton};
    use easel_engine::DisplayList;
    use std::time::Duration;

    const MINES: [(usize, usize); DANGERS] = [
        (0, 0),
        (0, 1),
        (1, 0),
        (2, 12),
        (5, 7),
        (7, 2),
        (8, 9),
        (9, 14),
    ];

    fn board() -> Board {
        let mut board = Board::new(ROWS, COLUMNS);
        board.place_dangers(MINES);
        board
    }

    fn state() -> State {
        let mut state = State::new(Rng::new(1));
        state.board.place_dangers(MINES);
        state
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(WIDTH, 600);
        assert_eq!(HEIGHT, 450);
        assert_eq!(DANGERS, 8);
        assert_eq!(DESTINATION_EDGE, 7.5);
    }

    #[test]
    fn test_restart_lays_every_mine() {
        let mut board = Board::new(ROWS, COLUMNS);
        let mut rng = Rng::new(12345);
        for _ in 0..5 {
            board.restart(DANGERS, &mut rng);
            assert_eq!(board.cells().filter(|c| c.dangerous).count(), DANGERS);
            assert!(board.cells().all(|c| !c.revealed && !c.flagged));
            assert_eq!(board.outcome(), Outcome::Neutral);
        }
    }

    #[test]
    fn test_surrounding_counts() {
        let board = board();
        assert_eq!(board.get(1, 1).unwrap().surrounding, 3);
        assert_eq!(board.get(0, 2).unwrap().surrounding, 1);
        assert_eq!(board.get(4, 4).unwrap().surrounding, 0);
        // mines keep a zero count
        assert_eq!(board.get(0, 0).unwrap().surrounding, 0);
    }

    #[test]
    fn test_flood_reveal() {
        let mut board = board();
        let revealed = board.reveal(4, 4);
        assert!(revealed > 1);

        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let cell = board.get(row, column).unwrap();
                if !cell.revealed {
                    continue;
                }
                assert!(!cell.dangerous, "mine revealed at {},{}", row, column);
                if cell.surrounding == 0 {
                    for (r, c) in board.neighbours(row, column) {
                        assert!(board.get(r, c).unwrap().revealed, "{},{} left hidden", r, c);
                    }
                }
            }
        }
        // a numbered cell next to the start stops the flood
        assert!(board.get(4, 6).unwrap().revealed);
        assert!(!board.get(5, 7).unwrap().revealed);
    }

    #[test]
    fn test_flood_stops_at_flags() {
        let mut board = board();
        board.toggle_flag(4, 5);
        board.reveal(4, 4);
        assert!(!board.get(4, 5).unwrap().revealed);
        assert!(board.get(4, 5).unwrap().flagged);
    }

    #[test]
    fn test_numbered_cell_reveals_alone() {
        let mut board = board();
        assert_eq!(board.reveal(1, 1), 1);
        assert_eq!(board.reveal(1, 1), 0);
    }

    #[test]
    fn test_win_after_every_safe_cell() {
        let mut state = state();
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                if !MINES.contains(&(row, column)) {
                    assert!(!state.click(row, column, false));
                }
            }
        }
        assert_eq!(state.board.outcome(), Outcome::Win);
        assert_eq!(state.face(), "😎");
    }

    #[test]
    fn test_lose_on_mine() {
        let mut state = state();
        assert!(state.click(0, 0, false));
        assert_eq!(state.board.outcome(), Outcome::Lose);
        assert_eq!(state.face(), "😵");

        // decided rounds ignore clicks
        assert!(!state.click(4, 4, false));
        assert!(!state.board.get(4, 4).unwrap().revealed);
    }

    #[test]
    fn test_flags_block_reveal_and_count_down() {
        let mut state = state();
        assert_eq!(state.mines_left_text(), "08");
        state.click(0, 0, true);
        assert!(state.board.get(0, 0).unwrap().flagged);
        assert_eq!(state.mines_left_text(), "07");

        assert!(!state.click(0, 0, false));
        assert_eq!(state.board.outcome(), Outcome::Neutral);

        state.click(0, 0, true);
        assert_eq!(state.mines_left_text(), "08");
    }

    #[test]
    fn test_mines_left_never_negative() {
        let mut state = state();
        for column in 0..10 {
            state.click(4, column, true);
        }
        assert_eq!(state.mines_left_text(), "00");
    }

    #[test]
    fn test_timer() {
        let mut state = state();
        state.globals_mut().now = 5_000.0;
        assert_eq!(state.timer_text(), "00:00");

        state.click(1, 1, false);
        state.globals_mut().now = 5_000.0 + 61_500.0;
        assert_eq!(state.timer_text(), "01 01");
        state.globals_mut().now = 5_000.0 + 62_000.0;
        assert_eq!(state.timer_text(), "01:02");
    }

    #[test]
    fn test_timer_freezes_when_decided() {
        let mut state = state();
        state.globals_mut().now = 1_000.0;
        state.click(1, 1, false);
        state.globals_mut().now = 4_000.0;
        state.click(0, 0, false);
        state.globals_mut().now = 100_000.0;
        assert_eq!(state.elapsed_secs(), 3);
    }

    #[test]
    fn test_face_while_pressing() {
        let mut state = state();
        assert_eq!(state.face(), "🙂");
        state.globals_mut().mouse.left_is_down = true;
        assert_eq!(state.face(), "😮");
    }

    #[test]
    fn test_state_serializes_for_debugging() {
        let state = state();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["board"]["rows"], 10);
        assert_eq!(json["board"]["cells"][0]["dangerous"], true);
        assert!(json.get("rng").is_none());
    }

    #[test]
    fn test_cell_sources() {
        let source = |cell: Cell| {
            let s = cell_source(&cell);
            (s.row, s.column)
        };
        assert_eq!(source(Cell::default()), (2.0, 1.0));
        assert_eq!(
            source(Cell {
                flagged: true,
                ..Default::default()
            }),
            (2.0, 3.0)
        );
        assert_eq!(
            source(Cell {
                revealed: true,
                ..Default::default()
            }),
            (2.0, 0.0)
        );
        assert_eq!(
            source(Cell {
                revealed: true,
                dangerous: true,
                ..Default::default()
            }),
            (2.0, 2.0)
        );
        assert_eq!(
            source(Cell {
                revealed: true,
                surrounding: 6,
                ..Default::default()
            }),
            (1.0, 1.0)
        );
    }

    #[test]
    fn test_clicks_route_through_engine() {
        let mut start = scene(Rng::new(1));
        start.state.board.place_dangers(MINES);
        let mut engine = Engine::start(start).unwrap();
        let mut surface = DisplayList::new();

        // cell (4, 4) sits at x 160..200, y 210..250
        let (x, y) = (175.0, 225.0);
        engine.handle_input(InputEvent::PointerMove { x, y });
        engine.frame(Duration::ZERO, &mut surface);
        engine.handle_input(InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        });
        engine.handle_input(InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::Left,
        });
        engine.handle_input(InputEvent::Click { x, y });
        engine.frame(Duration::from_millis(20), &mut surface);

        let board = &engine.state().board;
        assert!(board.get(4, 4).unwrap().revealed);
        assert!(!board.get(0, 0).unwrap().revealed);
        // the clock reads the start of the frame that delivered the click
        assert_eq!(engine.state().started_at, Some(20.0));
    }

    #[test]
    fn test_face_button_restarts() {
        let mut start = scene(Rng::new(1));
        start.state.board.place_dangers(MINES);
        start.state.board.reveal(0, 0);
        let mut engine = Engine::start(start).unwrap();
        let mut surface = DisplayList::new();
        assert_eq!(engine.state().board.outcome(), Outcome::Lose);

        let (x, y) = (WIDTH as f32 / 2.0, 10.0);
        engine.handle_input(InputEvent::PointerMove { x, y });
        engine.frame(Duration::ZERO, &mut surface);
        engine.handle_input(InputEvent::ContextMenu { x, y });
        engine.handle_input(InputEvent::Click { x, y });
        engine.frame(Duration::from_millis(20), &mut surface);

        assert_eq!(engine.state().board.outcome(), Outcome::Neutral);
        assert_eq!(engine.state().board.cells().filter(|c| c.dangerous).count(), DANGERS);
    }
}
