use crate::chess::board::Board;
use crate::chess::types::{ChessMove, Color, Piece, PieceKind, Square};

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Pseudo-legal moves filtered down to those that do not leave the mover's
/// king attacked.
pub fn legal_moves(board: &Board) -> Vec<ChessMove> {
    let mover = board.side_to_move();
    pseudo_legal_moves(board)
        .into_iter()
        .filter(|mv| !board.play(*mv).is_in_check(mover))
        .collect()
}

pub fn pseudo_legal_moves(board: &Board) -> Vec<ChessMove> {
    let mover = board.side_to_move();
    let mut moves = Vec::with_capacity(48);
    for (from, piece) in board.pieces(mover) {
        match piece.kind {
            PieceKind::Pawn => pawn_moves(board, from, mover, &mut moves),
            PieceKind::Knight => step_moves(board, from, mover, &KNIGHT_STEPS, &mut moves),
            PieceKind::Bishop => slide_moves(board, from, mover, &BISHOP_DIRECTIONS, &mut moves),
            PieceKind::Rook => slide_moves(board, from, mover, &ROOK_DIRECTIONS, &mut moves),
            PieceKind::Queen => {
                slide_moves(board, from, mover, &ROOK_DIRECTIONS, &mut moves);
                slide_moves(board, from, mover, &BISHOP_DIRECTIONS, &mut moves);
            }
            PieceKind::King => {
                step_moves(board, from, mover, &KING_STEPS, &mut moves);
                castling_moves(board, from, mover, &mut moves);
            }
        }
    }
    moves
}

/// Whether any piece of `by` attacks `target`.
pub fn is_attacked(board: &Board, target: Square, by: Color) -> bool {
    let holds = |square: Option<Square>, kinds: &[PieceKind]| match square
        .and_then(|sq| board.piece_at(sq))
    {
        Some(Piece { kind, color }) => color == by && kinds.contains(&kind),
        None => false,
    };

    // A pawn of `by` attacks diagonally forward, so it sits one rank behind.
    let behind = -by.forward();
    if holds(target.offset(-1, behind), &[PieceKind::Pawn])
        || holds(target.offset(1, behind), &[PieceKind::Pawn])
    {
        return true;
    }

    if KNIGHT_STEPS
        .iter()
        .any(|(df, dr)| holds(target.offset(*df, *dr), &[PieceKind::Knight]))
    {
        return true;
    }

    if KING_STEPS
        .iter()
        .any(|(df, dr)| holds(target.offset(*df, *dr), &[PieceKind::King]))
    {
        return true;
    }

    let first_on_ray = |(df, dr): (i8, i8)| {
        let mut current = target.offset(df, dr);
        while let Some(sq) = current {
            if let Some(piece) = board.piece_at(sq) {
                return Some(piece);
            }
            current = sq.offset(df, dr);
        }
        None
    };

    let sliders = |directions: &[(i8, i8)], kinds: &[PieceKind]| {
        directions.iter().any(|dir| {
            matches!(first_on_ray(*dir), Some(p) if p.color == by && kinds.contains(&p.kind))
        })
    };

    sliders(&ROOK_DIRECTIONS, &[PieceKind::Rook, PieceKind::Queen])
        || sliders(&BISHOP_DIRECTIONS, &[PieceKind::Bishop, PieceKind::Queen])
}

fn push_pawn_move(from: Square, to: Square, mover: Color, moves: &mut Vec<ChessMove>) {
    if to.rank() == mover.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(ChessMove::new(from, to, Some(kind)));
        }
    } else {
        moves.push(ChessMove::new(from, to, None));
    }
}

fn pawn_moves(board: &Board, from: Square, mover: Color, moves: &mut Vec<ChessMove>) {
    let forward = mover.forward();

    if let Some(one) = from.offset(0, forward) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, mover, moves);
            if from.rank() == mover.pawn_rank() {
                if let Some(two) = one.offset(0, forward) {
                    if board.piece_at(two).is_none() {
                        moves.push(ChessMove::new(from, two, None));
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(target) = from.offset(file_delta, forward) else {
            continue;
        };
        match board.piece_at(target) {
            Some(piece) if piece.color != mover => push_pawn_move(from, target, mover, moves),
            None if board.en_passant() == Some(target) => {
                moves.push(ChessMove::new(from, target, None))
            }
            _ => {}
        }
    }
}

fn step_moves(
    board: &Board,
    from: Square,
    mover: Color,
    steps: &[(i8, i8)],
    moves: &mut Vec<ChessMove>,
) {
    for (df, dr) in steps {
        if let Some(to) = from.offset(*df, *dr) {
            match board.piece_at(to) {
                Some(piece) if piece.color == mover => {}
                _ => moves.push(ChessMove::new(from, to, None)),
            }
        }
    }
}

fn slide_moves(
    board: &Board,
    from: Square,
    mover: Color,
    directions: &[(i8, i8)],
    moves: &mut Vec<ChessMove>,
) {
    for (df, dr) in directions {
        let mut current = from.offset(*df, *dr);
        while let Some(to) = current {
            match board.piece_at(to) {
                None => moves.push(ChessMove::new(from, to, None)),
                Some(piece) => {
                    if piece.color != mover {
                        moves.push(ChessMove::new(from, to, None));
                    }
                    break;
                }
            }
            current = to.offset(*df, *dr);
        }
    }
}

fn castling_moves(board: &Board, from: Square, mover: Color, moves: &mut Vec<ChessMove>) {
    let rank = mover.back_rank();
    if from.file() != 4 || from.rank() != rank {
        return;
    }
    let rights = board.castling_rights();
    let enemy = mover.opposite();
    if is_attacked(board, from, enemy) {
        return;
    }

    let rook_home = |file: u8| {
        matches!(
            Square::new(file, rank).and_then(|sq| board.piece_at(sq)),
            Some(Piece { kind: PieceKind::Rook, color }) if color == mover
        )
    };
    let empty = |files: &[u8]| {
        files.iter().all(|file| {
            Square::new(*file, rank)
                .map(|sq| board.piece_at(sq).is_none())
                .unwrap_or(false)
        })
    };
    let safe = |files: &[u8]| {
        files.iter().all(|file| {
            Square::new(*file, rank)
                .map(|sq| !is_attacked(board, sq, enemy))
                .unwrap_or(false)
        })
    };

    if rights.king_side(mover) && rook_home(7) && empty(&[5, 6]) && safe(&[5, 6]) {
        if let Some(to) = Square::new(6, rank) {
            moves.push(ChessMove::new(from, to, None));
        }
    }
    if rights.queen_side(mover) && rook_home(0) && empty(&[1, 2, 3]) && safe(&[2, 3]) {
        if let Some(to) = Square::new(2, rank) {
            moves.push(ChessMove::new(from, to, None));
        }
    }
}
