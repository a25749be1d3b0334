//! Easel Games
//!
//! Example games built on the engine. Each module exposes its state type and
//! a `scene` function returning a ready `StartConfig`.

pub mod breakout;
pub mod minesweeper;
mod random;

pub use random::Rng;

/// Games the binary can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    Minesweeper,
    Breakout,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::Minesweeper, Game::Breakout];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "minesweeper" => Some(Game::Minesweeper),
            "breakout" => Some(Game::Breakout),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Game::Minesweeper => "minesweeper",
            Game::Breakout => "breakout",
        }
    }

    /// Window title
    pub fn title(self) -> &'static str {
        match self {
            Game::Minesweeper => "Minesweeper",
            Game::Breakout => "Breakout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_names() {
        for game in Game::ALL {
            assert_eq!(Game::from_name(game.name()), Some(game));
        }
        assert_eq!(Game::from_name("Breakout"), Some(Game::Breakout));
        assert_eq!(Game::from_name("solitaire"), None);
    }
}
