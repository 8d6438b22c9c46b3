use std::str::FromStr;

use crate::chess::board::Board;
use crate::chess::errors::ChessError;
use crate::chess::types::{ChessMove, PieceKind, Square};

/// A move as submitted by a player, before it is matched against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveNotation {
    Coordinate {
        piece: Option<PieceKind>,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    Castle {
        king_side: bool,
    },
}

impl FromStr for MoveNotation {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_end_matches(['+', '#']);
        let invalid = || ChessError::InvalidNotation(format!("cannot read move '{}'", s.trim()));

        match text.to_ascii_uppercase().replace('0', "O").as_str() {
            "O-O" => return Ok(MoveNotation::Castle { king_side: true }),
            "O-O-O" => return Ok(MoveNotation::Castle { king_side: false }),
            _ => {}
        }

        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0;

        // A leading piece letter is only a piece when a file letter follows it.
        let mut piece = None;
        if chars.len() > 1 && chars[0].is_ascii_uppercase() && chars[1].is_ascii_alphabetic() {
            piece = Some(PieceKind::from_letter(chars[0]).ok_or_else(invalid)?);
            pos = 1;
        }

        let square_at = |at: usize| -> Result<Square, ChessError> {
            chars
                .get(at..at + 2)
                .map(|pair| pair.iter().collect::<String>())
                .ok_or_else(invalid)?
                .parse::<Square>()
                .map_err(|_| invalid())
        };

        let from = square_at(pos)?;
        pos += 2;
        if matches!(chars.get(pos), Some('-') | Some('x') | Some('X')) {
            pos += 1;
        }
        let to = square_at(pos)?;
        pos += 2;

        if chars.get(pos) == Some(&'=') {
            pos += 1;
        }
        let promotion = match chars.get(pos) {
            None => None,
            Some(c) => match PieceKind::from_letter(*c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => {
                    pos += 1;
                    Some(kind)
                }
                _ => return Err(invalid()),
            },
        };
        if pos != chars.len() {
            return Err(invalid());
        }

        Ok(MoveNotation::Coordinate {
            piece,
            from,
            to,
            promotion,
        })
    }
}

impl MoveNotation {
    /// Matches the notation against the legal moves of `board`.
    ///
    /// `promotion` is the separately requested promotion piece; it must agree
    /// with any suffix. The returned move carries no promotion piece when the
    /// move promotes but none was requested.
    pub fn resolve(
        &self,
        board: &Board,
        promotion: Option<PieceKind>,
    ) -> Result<ChessMove, ChessError> {
        let (piece, from, to, suffix) = match *self {
            MoveNotation::Coordinate {
                piece,
                from,
                to,
                promotion: suffix,
            } => (piece, from, to, suffix),
            MoveNotation::Castle { king_side } => {
                let rank = board.side_to_move().back_rank();
                let from = Square::new(4, rank);
                let to = Square::new(if king_side { 6 } else { 2 }, rank);
                match (from, to) {
                    (Some(from), Some(to)) => (Some(PieceKind::King), from, to, None),
                    _ => return Err(ChessError::IllegalMove("castling".to_string())),
                }
            }
        };

        let illegal = || ChessError::IllegalMove(format!("{}{}", from, to));

        let promotion = match (suffix, promotion) {
            (Some(a), Some(b)) if a != b => return Err(illegal()),
            (a, b) => a.or(b),
        };

        let standing = board.piece_at(from).ok_or_else(illegal)?;
        if standing.color != board.side_to_move() {
            return Err(illegal());
        }
        if let Some(kind) = piece {
            if kind != standing.kind {
                return Err(illegal());
            }
        }

        let promotes = board.is_promotion(from, to);
        if promotion.is_some() && !promotes {
            return Err(illegal());
        }

        let legal = board.legal_moves().into_iter().any(|mv| {
            mv.from == from
                && mv.to == to
                && (promotion.is_none() || mv.promotion == promotion)
        });
        if !legal {
            return Err(illegal());
        }

        Ok(ChessMove::new(from, to, promotion))
    }
}
