use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chess::{Color, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Normal,
    Check,
    CheckMate,
    Stalemate,
    Resigned,
    Draw,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameState::CheckMate | GameState::Stalemate | GameState::Resigned | GameState::Draw
        )
    }
}

/// Promotion tag stored with a move. Castling and en passant are inferred
/// from the position and never tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpecialMove {
    #[default]
    None,
    PromotionToQueen,
    PromotionToRook,
    PromotionToKnight,
    PromotionToBishop,
}

impl SpecialMove {
    pub fn promotion_piece(self) -> Option<PieceKind> {
        match self {
            SpecialMove::None => None,
            SpecialMove::PromotionToQueen => Some(PieceKind::Queen),
            SpecialMove::PromotionToRook => Some(PieceKind::Rook),
            SpecialMove::PromotionToKnight => Some(PieceKind::Knight),
            SpecialMove::PromotionToBishop => Some(PieceKind::Bishop),
        }
    }

    pub fn from_promotion(piece: Option<PieceKind>) -> SpecialMove {
        match piece {
            Some(PieceKind::Queen) => SpecialMove::PromotionToQueen,
            Some(PieceKind::Rook) => SpecialMove::PromotionToRook,
            Some(PieceKind::Knight) => SpecialMove::PromotionToKnight,
            Some(PieceKind::Bishop) => SpecialMove::PromotionToBishop,
            _ => SpecialMove::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

impl Player {
    pub fn new(id: &str, name: &str) -> Self {
        Player {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Canonical coordinate notation, e.g. `e2e4` or `e1g1`.
    pub notation: String,
    #[serde(default)]
    pub special_move: SpecialMove,
    #[serde(default)]
    pub comment: String,
    /// When it became the mover's turn.
    pub start: DateTime<Utc>,
    /// When the move was committed.
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub white: Player,
    pub black: Player,
    pub state: GameState,
    #[serde(default)]
    pub state_text: String,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub moves: Vec<Move>,
    /// Store version the game was read at; checked on every write.
    #[serde(default)]
    pub version: u64,
}

impl Game {
    pub fn new(name: &str, white: Player, black: Player) -> Self {
        let now = Utc::now();
        Game {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created: now,
            updated: now,
            white,
            black,
            state: GameState::Normal,
            state_text: String::new(),
            winner: None,
            moves: Vec::new(),
            version: 0,
        }
    }

    /// Derived from move-count parity; white moves first.
    pub fn side_to_move(&self) -> Color {
        if self.moves.len() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn color_of(&self, player_id: &str) -> Option<Color> {
        if self.white.id == player_id {
            Some(Color::White)
        } else if self.black.id == player_id {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player_id: &str) -> bool {
        self.color_of(player_id).is_some()
    }

    pub fn opponent_of(&self, player_id: &str) -> Option<&Player> {
        self.color_of(player_id)
            .map(|color| self.player(color.opposite()))
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// When the side to move was handed the turn.
    pub fn turn_started(&self) -> DateTime<Utc> {
        self.moves.last().map_or(self.created, |m| m.end)
    }
}
