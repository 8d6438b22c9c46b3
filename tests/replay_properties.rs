//! Random playouts through the game aggregate. Whatever was accepted must
//! replay to the same position and state, and only the side to move may ever
//! append to the log.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use proptest::sample::Index;

use chess_games_tests::{BLACK, WHITE};
use shared::chess::Board;
use shared::models::game::{Game, Player, SpecialMove};
use shared::services::chess_service::ChessService;
use shared::services::errors::chess_service_errors::ChessServiceError;

fn new_game() -> Game {
    Game::new(
        "Random playout",
        Player::new(WHITE, "Alice Example"),
        Player::new(BLACK, "Bob Example"),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_moves_replay_to_the_same_game(picks in prop::collection::vec(any::<Index>(), 1..80)) {
        let chess = ChessService::default();
        let mut game = new_game();
        let mut board = Board::initial();
        let mut now = Utc::now();

        for pick in picks {
            if game.is_finished() {
                break;
            }
            let legal = board.legal_moves();
            prop_assert!(!legal.is_empty());
            let mv = legal[pick.index(legal.len())];
            let mover = board.side_to_move();
            let mover_id = game.player(mover).id.clone();

            now += Duration::seconds(30);
            game = chess
                .submit_move(
                    &game,
                    &mover_id,
                    &mv.to_string(),
                    SpecialMove::from_promotion(mv.promotion),
                    "",
                    now,
                )
                .map_err(|e| TestCaseError::fail(format!("{} rejected: {}", mv, e)))?;
            board = board.apply(mv).map_err(|e| TestCaseError::fail(e.to_string()))?;

            let replayed = chess
                .current_board(&game.moves)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(replayed.to_fen(), board.to_fen());
            prop_assert_eq!(ChessService::evaluate(&replayed), game.state);
            prop_assert!(!replayed.is_in_check(mover));
            prop_assert_eq!(game.side_to_move(), replayed.side_to_move());

            let last = game.moves.last().ok_or_else(|| TestCaseError::fail("empty log"))?;
            prop_assert_eq!(&last.notation, &mv.coordinates());
            prop_assert!(last.end >= last.start);
        }
    }

    #[test]
    fn only_the_side_to_move_may_play(
        picks in prop::collection::vec(any::<Index>(), 0..30),
        attempt in any::<Index>(),
    ) {
        let chess = ChessService::default();
        let mut game = new_game();

        for pick in picks {
            let board = chess
                .current_board(&game.moves)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let legal = board.legal_moves();
            if game.is_finished() || legal.is_empty() {
                break;
            }
            let mv = legal[pick.index(legal.len())];
            let mover_id = game.player(board.side_to_move()).id.clone();
            game = chess
                .submit_move(
                    &game,
                    &mover_id,
                    &mv.to_string(),
                    SpecialMove::from_promotion(mv.promotion),
                    "",
                    Utc::now(),
                )
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        prop_assume!(!game.is_finished());

        let board = chess
            .current_board(&game.moves)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let legal = board.legal_moves();
        let mv = legal[attempt.index(legal.len())];
        let waiting_id = game.player(board.side_to_move().opposite()).id.clone();

        let result = chess.submit_move(
            &game,
            &waiting_id,
            &mv.to_string(),
            SpecialMove::None,
            "",
            Utc::now(),
        );
        prop_assert_eq!(result, Err(ChessServiceError::NotYourTurn));
    }
}
