/// Macro to register games in the registry with automatic initializer generation
///
/// Usage in games/mod.rs:
/// ```ignore
/// register_games! {
///     snake => {
///         game: SnakeGame,
///         id: "snake",
///         name: "Snake",
///         description: "Steer with your palm"
///     },
/// }
/// ```
///
/// Each game type needs `fn new(config: &ArcadeConfig) -> Self` and an `ArcadeGame` impl.
#[macro_export]
macro_rules! register_games {
    (
        $(
            $module:ident => {
                game: $game:ident,
                id: $id:expr,
                name: $name:expr,
                description: $desc:expr
            }
        ),* $(,)?
    ) => {
        /// Get all available games with their metadata and initializers
        pub fn get_all_games() -> Vec<GameRegistry> {
            vec![
                $(
                    GameRegistry {
                        info: GameInfo {
                            id: $id,
                            name: $name,
                            description: $desc,
                        },
                        initializer: |options, terminal| {
                            Box::pin(async move {
                                use $crate::core::engine::Engine;
                                use $crate::games::$module::$game;

                                let game = $game::new(&options.config);
                                Engine::new(game, options).run(terminal).await
                            })
                        },
                    }
                ),*
            ]
        }

        /// Get a game by ID
        pub fn get_game(id: &str) -> Option<GameRegistry> {
            get_all_games().into_iter().find(|g| g.info.id == id)
        }
    };
}
