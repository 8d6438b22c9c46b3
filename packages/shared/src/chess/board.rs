use std::fmt;

use crate::chess::errors::ChessError;
use crate::chess::movegen;
use crate::chess::types::{ChessMove, Color, Piece, PieceKind, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Normal,
    Check,
    CheckMate,
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    pub fn king_side(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_side,
            Color::Black => self.black_king_side,
        }
    }

    pub fn queen_side(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queen_side,
            Color::Black => self.black_queen_side,
        }
    }

    fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_king_side = false;
                self.white_queen_side = false;
            }
            Color::Black => {
                self.black_king_side = false;
                self.black_queen_side = false;
            }
        }
    }

    /// Drops the right tied to a rook's home corner once anything leaves or
    /// lands on it.
    fn touch(&mut self, square: Square) {
        match (square.file(), square.rank()) {
            (0, 0) => self.white_queen_side = false,
            (7, 0) => self.white_king_side = false,
            (0, 7) => self.black_queen_side = false,
            (7, 7) => self.black_king_side = false,
            _ => {}
        }
    }
}

/// Derived position state. Rebuilt from the move log on every request and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Board::initial()
    }
}

impl Board {
    pub fn initial() -> Self {
        let mut squares = [None; 64];
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back_rank.iter().enumerate() {
            squares[file] = Some(Piece::new(*kind, Color::White));
            squares[8 + file] = Some(Piece::new(PieceKind::Pawn, Color::White));
            squares[48 + file] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            squares[56 + file] = Some(Piece::new(*kind, Color::Black));
        }
        Board {
            squares,
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Board, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ChessError::InvalidFen(format!(
                "expected at least 4 fields, got {}",
                fields.len()
            )));
        }

        let mut squares = [None; 64];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen("expected 8 ranks".to_string()));
        }
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file = file
                        .checked_add(skip as u8)
                        .filter(|f| *f <= 8)
                        .ok_or_else(|| ChessError::InvalidFen(format!("rank '{}' too long", text)))?;
                    continue;
                }
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece '{}'", c)))?;
                let square = Square::new(file, rank)
                    .ok_or_else(|| ChessError::InvalidFen(format!("rank '{}' too long", text)))?;
                squares[square.index()] = Some(piece);
                file += 1;
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank '{}' does not cover 8 files",
                    text
                )));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "unknown side to move '{}'",
                    other
                )))
            }
        };

        let mut castling = CastlingRights::default();
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => castling.white_king_side = true,
                    'Q' => castling.white_queen_side = true,
                    'k' => castling.black_king_side = true,
                    'q' => castling.black_queen_side = true,
                    other => {
                        return Err(ChessError::InvalidFen(format!(
                            "unknown castling flag '{}'",
                            other
                        )))
                    }
                }
            }
        }

        let en_passant = match fields[3] {
            "-" => None,
            text => Some(
                text.parse::<Square>()
                    .map_err(|_| ChessError::InvalidFen(format!("bad en passant '{}'", text)))?,
            ),
        };

        let halfmove_clock = fields.get(4).map_or(Ok(0), |v| v.parse::<u32>());
        let fullmove_number = fields.get(5).map_or(Ok(1), |v| v.parse::<u32>());

        let board = Board {
            squares,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock: halfmove_clock
                .map_err(|_| ChessError::InvalidFen("bad halfmove clock".to_string()))?,
            fullmove_number: fullmove_number
                .map_err(|_| ChessError::InvalidFen("bad fullmove number".to_string()))?,
        };

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces(color)
                .filter(|(_, piece)| piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{} must have exactly one king",
                    color
                )));
            }
        }
        if board.is_in_check(side_to_move.opposite()) {
            return Err(ChessError::InvalidFen(
                "side not to move is in check".to_string(),
            ));
        }

        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match Square::new(file, rank).and_then(|sq| self.piece_at(sq)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling.white_king_side {
            castling.push('K');
        }
        if self.castling.white_queen_side {
            castling.push('Q');
        }
        if self.castling.black_king_side {
            castling.push('k');
        }
        if self.castling.black_queen_side {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, self.halfmove_clock, self.fullmove_number
        )
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => movegen::is_attacked(self, king, color.opposite()),
            None => false,
        }
    }

    pub fn legal_moves(&self) -> Vec<ChessMove> {
        movegen::legal_moves(self)
    }

    /// True when a pawn of the side to move standing on `from` would promote by
    /// moving to `to`.
    pub fn is_promotion(&self, from: Square, to: Square) -> bool {
        matches!(
            self.piece_at(from),
            Some(Piece { kind: PieceKind::Pawn, color }) if to.rank() == color.promotion_rank()
        )
    }

    /// Validates `mv` against the legal moves and returns the resulting board.
    /// A promotion without a piece resolves to a queen.
    pub fn apply(&self, mv: ChessMove) -> Result<Board, ChessError> {
        let mv = if mv.promotion.is_none() && self.is_promotion(mv.from, mv.to) {
            ChessMove::new(mv.from, mv.to, Some(PieceKind::Queen))
        } else {
            mv
        };
        if !self.legal_moves().contains(&mv) {
            return Err(ChessError::IllegalMove(mv.to_string()));
        }
        Ok(self.play(mv))
    }

    /// Plays a pseudo-legal move without any legality check.
    pub(crate) fn play(&self, mv: ChessMove) -> Board {
        let mut next = self.clone();
        let mover = self.side_to_move;
        let Some(piece) = next.squares[mv.from.index()].take() else {
            return next;
        };
        let captured = self.piece_at(mv.to);
        let mut placed = piece;

        match piece.kind {
            PieceKind::Pawn => {
                if Some(mv.to) == self.en_passant
                    && mv.from.file() != mv.to.file()
                    && captured.is_none()
                {
                    if let Some(victim) = Square::new(mv.to.file(), mv.from.rank()) {
                        next.squares[victim.index()] = None;
                    }
                }
                if mv.to.rank() == mover.promotion_rank() {
                    placed = Piece::new(mv.promotion.unwrap_or(PieceKind::Queen), mover);
                }
            }
            PieceKind::King => {
                let file_delta = mv.to.file() as i8 - mv.from.file() as i8;
                if file_delta.abs() == 2 {
                    let rank = mover.back_rank();
                    let (rook_from, rook_to) = if file_delta > 0 { (7, 5) } else { (0, 3) };
                    if let (Some(rf), Some(rt)) =
                        (Square::new(rook_from, rank), Square::new(rook_to, rank))
                    {
                        next.squares[rt.index()] = next.squares[rf.index()].take();
                    }
                }
                next.castling.revoke(mover);
            }
            _ => {}
        }

        next.squares[mv.to.index()] = Some(placed);
        next.castling.touch(mv.from);
        next.castling.touch(mv.to);

        next.en_passant = None;
        if piece.kind == PieceKind::Pawn && (mv.to.rank() as i8 - mv.from.rank() as i8).abs() == 2
        {
            next.en_passant = mv.from.offset(0, mover.forward());
        }

        if piece.kind == PieceKind::Pawn || captured.is_some() {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if mover == Color::Black {
            next.fullmove_number += 1;
        }
        next.side_to_move = mover.opposite();
        next
    }

    pub fn status(&self) -> BoardStatus {
        let in_check = self.is_in_check(self.side_to_move);
        let has_moves = !self.legal_moves().is_empty();
        match (in_check, has_moves) {
            (true, false) => BoardStatus::CheckMate,
            (false, false) => BoardStatus::Stalemate,
            (true, true) => BoardStatus::Check,
            (false, true) => BoardStatus::Normal,
        }
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor
    /// piece, or bishops all on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for square in Square::all() {
            let Some(piece) = self.piece_at(square) else {
                continue;
            };
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors.push((square, piece)),
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            many => {
                many.iter().all(|(_, p)| p.kind == PieceKind::Bishop)
                    && many
                        .iter()
                        .all(|(sq, _)| sq.is_light() == many[0].0.is_light())
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
