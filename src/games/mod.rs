pub mod macros;
pub mod breakout;
pub mod dance;
pub mod dodge;
pub mod hunt;
pub mod maze;
pub mod memory;
pub mod paint;
pub mod pong;
pub mod rps;
pub mod runner;
pub mod shooter;
pub mod simon;
pub mod snake;
pub mod targets;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use ratatui::DefaultTerminal;

use crate::core::engine::EngineOptions;
use crate::register_games;

/// Metadata about a game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Game initializer function - creates the game and runs it until the player quits
pub type GameInitializer = fn(EngineOptions, DefaultTerminal) -> Pin<Box<dyn Future<Output = Result<()>>>>;

/// Registry entry containing metadata and initializer
pub struct GameRegistry {
    pub info: GameInfo,
    pub initializer: GameInitializer,
}

// Register all games here - adding a game only needs a new entry
register_games! {
    pong => {
        game: PongGame,
        id: "pong",
        name: "Pong",
        description: "Classic Pong against an AI that adapts to the score. Your palm moves the paddle."
    },
    pong => {
        game: PongProGame,
        id: "pong-pro",
        name: "Pong Pro",
        description: "Five levels of Pong, from Beginner to Legendary. Your eyes move the paddle."
    },
    snake => {
        game: SnakeGame,
        id: "snake",
        name: "Snake",
        description: "Point your palm to the screen edges to steer the snake."
    },
    breakout => {
        game: BreakoutGame,
        id: "breakout",
        name: "Breakout",
        description: "Move the paddle with your wrist and clear every block."
    },
    targets => {
        game: TargetsGame,
        id: "targets",
        name: "Target Smash",
        description: "Touch the targets with your index fingers before they vanish. 60 seconds."
    },
    runner => {
        game: RunnerGame,
        id: "runner",
        name: "Endless Runner",
        description: "Raise both arms to jump, bend down to duck. Collect coins and power-ups."
    },
    dodge => {
        game: DodgeGame,
        id: "dodge",
        name: "Lane Dodge",
        description: "Lean your head left or right to switch lanes and dodge obstacles."
    },
    maze => {
        game: MazeGame,
        id: "maze",
        name: "Head Maze",
        description: "Guide the ball out of a random maze by moving your head."
    },
    memory => {
        game: MemoryGame,
        id: "memory",
        name: "Gesture Memory",
        description: "Watch a sequence of hand signs and repeat it. It grows every round."
    },
    rps => {
        game: RpsGame,
        id: "rps",
        name: "Rock Paper Scissors",
        description: "Play rock-paper-scissors against the computer with your hand."
    },
    simon => {
        game: SimonGame,
        id: "simon",
        name: "Simon Says",
        description: "Strike and hold the body pose Simon asks for."
    },
    dance => {
        game: DanceGame,
        id: "dance",
        name: "Dance Match",
        description: "Copy the reference dance poses before time runs out."
    },
    hunt => {
        game: HuntGame,
        id: "hunt",
        name: "Object Hunt",
        description: "Find the requested household object and show it to the camera."
    },
    shooter => {
        game: ShooterGame,
        id: "shooter",
        name: "Space Shooter",
        description: "Aim with your index finger, close your fist to fire."
    },
    paint => {
        game: PaintGame,
        id: "paint",
        name: "Air Paint",
        description: "Draw in the air with your index finger and save the picture."
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_resolvable() {
        let games = get_all_games();
        assert_eq!(games.len(), 15);
        let ids: HashSet<_> = games.iter().map(|g| g.info.id).collect();
        assert_eq!(ids.len(), games.len());
        assert!(get_game("maze").is_some());
        assert!(get_game("tetris").is_none());
    }
}
