use chrono::{DateTime, Utc};

use crate::chess::{Board, BoardStatus, ChessError, ChessMove, Color, MoveNotation, PieceKind};
use crate::config::PromotionPolicy;
use crate::models::game::{Game, GameState, Move, SpecialMove};
use crate::services::errors::chess_service_errors::ChessServiceError;

/// Bridges a game's stored move log and the rules engine. The board is never
/// stored; it is rebuilt from the log for every validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessService {
    promotion_policy: PromotionPolicy,
}

impl ChessService {
    pub fn new(promotion_policy: PromotionPolicy) -> Self {
        ChessService { promotion_policy }
    }

    /// Replays `moves` from the initial position.
    pub fn current_board(&self, moves: &[Move]) -> Result<Board, ChessServiceError> {
        let mut board = Board::initial();
        for (ply, stored) in moves.iter().enumerate() {
            let corrupt = |reason: String| {
                ChessServiceError::CorruptHistory(format!(
                    "move {} '{}': {}",
                    ply + 1,
                    stored.notation,
                    reason
                ))
            };
            let notation: MoveNotation = stored
                .notation
                .parse()
                .map_err(|e: ChessError| corrupt(e.to_string()))?;
            let mv = notation
                .resolve(&board, stored.special_move.promotion_piece())
                .map_err(|e| corrupt(e.to_string()))?;
            board = board.apply(mv).map_err(|e| corrupt(e.to_string()))?;
        }
        Ok(board)
    }

    /// Validates and appends one move. Index filing and notification are left
    /// to the caller.
    pub fn submit_move(
        &self,
        game: &Game,
        mover_id: &str,
        notation: &str,
        special_move: SpecialMove,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<Game, ChessServiceError> {
        let color = game
            .color_of(mover_id)
            .ok_or(ChessServiceError::NotAParticipant)?;
        if game.is_finished() {
            return Err(ChessServiceError::GameFinished);
        }

        let board = self.current_board(&game.moves)?;
        if board.side_to_move() != color {
            return Err(ChessServiceError::NotYourTurn);
        }

        let mv = self.resolve(&board, notation, special_move)?;
        let next = board
            .apply(mv)
            .map_err(|e| ChessServiceError::IllegalMove(e.to_string()))?;

        let start = game.turn_started();
        let mut updated = game.clone();
        updated.moves.push(Move {
            notation: mv.coordinates(),
            special_move: SpecialMove::from_promotion(mv.promotion),
            comment: comment.to_string(),
            start,
            end: now.max(start),
        });
        updated.state = Self::evaluate(&next);
        updated.winner = match updated.state {
            GameState::CheckMate => Some(mover_id.to_string()),
            _ => None,
        };
        updated.state_text = Self::state_text(&updated, color);
        updated.updated = now;
        Ok(updated)
    }

    /// Ends the game in favour of `player_id`'s opponent.
    pub fn resign(
        &self,
        game: &Game,
        player_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Game, ChessServiceError> {
        let color = game
            .color_of(player_id)
            .ok_or(ChessServiceError::NotAParticipant)?;
        if game.is_finished() {
            return Err(ChessServiceError::GameFinished);
        }

        let mut updated = game.clone();
        updated.state = GameState::Resigned;
        updated.winner = Some(game.player(color.opposite()).id.clone());
        updated.state_text = Self::state_text(&updated, color);
        updated.updated = now;
        Ok(updated)
    }

    /// Every legal move in the current position, in coordinate form with the
    /// promotion letter where one applies.
    pub fn legal_moves(&self, game: &Game) -> Result<Vec<String>, ChessServiceError> {
        if game.is_finished() {
            return Ok(Vec::new());
        }
        let board = self.current_board(&game.moves)?;
        Ok(board.legal_moves().iter().map(ChessMove::to_string).collect())
    }

    /// Game state for the position reached after a move.
    pub fn evaluate(board: &Board) -> GameState {
        match board.status() {
            BoardStatus::CheckMate => GameState::CheckMate,
            BoardStatus::Stalemate => GameState::Stalemate,
            _ if board.is_insufficient_material() => GameState::Draw,
            BoardStatus::Check => GameState::Check,
            BoardStatus::Normal => GameState::Normal,
        }
    }

    fn resolve(
        &self,
        board: &Board,
        notation: &str,
        special_move: SpecialMove,
    ) -> Result<ChessMove, ChessServiceError> {
        let illegal = |e: ChessError| ChessServiceError::IllegalMove(e.to_string());

        let parsed: MoveNotation = notation.parse().map_err(illegal)?;
        let mv = parsed
            .resolve(board, special_move.promotion_piece())
            .map_err(illegal)?;

        if mv.promotion.is_some() || !board.is_promotion(mv.from, mv.to) {
            return Ok(mv);
        }
        match self.promotion_policy {
            PromotionPolicy::DefaultToQueen => {
                Ok(ChessMove::new(mv.from, mv.to, Some(PieceKind::Queen)))
            }
            PromotionPolicy::Strict => Err(ChessServiceError::IllegalMove(format!(
                "{} promotes and needs a promotion piece",
                mv
            ))),
        }
    }

    /// `actor` is the side that made the last move or resigned.
    fn state_text(game: &Game, actor: Color) -> String {
        match game.state {
            GameState::Normal => String::new(),
            GameState::Check => "Check".to_string(),
            GameState::CheckMate => format!("Checkmate, {} wins", actor),
            GameState::Stalemate => "Stalemate".to_string(),
            GameState::Draw => "Draw by insufficient material".to_string(),
            GameState::Resigned => format!("{} resigned", game.player(actor).name),
        }
    }
}
