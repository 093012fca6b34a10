//! FEN 解析和生成
//!
//! 格式: `<棋盘> <回合> [<连吃格>]`
//!
//! 棋盘从第 8 行写到第 1 行，行之间用 `/` 分隔，每行从第 1 列写到第 8 列：
//! - Near：M(兵) K(王)
//! - Far：m k
//! - 空格：数字 (1-8)
//!
//! 回合：`n` 或 `f`
//!
//! 连吃格：连吃未结束时正在吃子的棋子所在格编号，例如 `n 27`

use crate::board::Board;
use crate::error::FenError;
use crate::types::{Rank, Square, Team, BOARD_SIZE};

/// 棋子的 FEN 字符
fn piece_char(team: Team, rank: Rank) -> char {
    let ch = match rank {
        Rank::Man => 'm',
        Rank::King => 'k',
    };
    match team {
        Team::Near => ch.to_ascii_uppercase(),
        Team::Far => ch,
    }
}

/// 解析 FEN 字符串
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(FenError::Format(fen.to_string()));
    }

    let turn_str = parts[1];
    let mut turn_chars = turn_str.chars();
    let turn = match (turn_chars.next().and_then(Team::from_fen_char), turn_chars.next()) {
        (Some(team), None) => team,
        _ => return Err(FenError::Turn(turn_str.to_string())),
    };

    let mut board = Board::empty(turn);
    parse_board(parts[0], &mut board)?;
    board.check_invariants()?;
    if let Some(chain_str) = parts.get(2) {
        let square = parse_chain(chain_str, &board)?;
        board.set_chain(Some(square));
    }
    Ok(board)
}

/// 连吃格必须是走棋方的棋子，且它还有子可吃
fn parse_chain(chain_str: &str, board: &Board) -> Result<Square, FenError> {
    let invalid = || FenError::Chain(chain_str.to_string());
    let square = chain_str
        .parse::<i8>()
        .ok()
        .and_then(Square::new)
        .ok_or_else(invalid)?;
    match board.get_piece(square) {
        Some(piece) if piece.team == board.turn() && piece.can_capture => Ok(square),
        _ => Err(invalid()),
    }
}

/// 解析棋盘字符串
fn parse_board(board_str: &str, board: &mut Board) -> Result<(), FenError> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(FenError::RowCount(rows.len()));
    }

    for (row_idx, row_str) in rows.iter().enumerate() {
        // FEN 从上往下是第 8 行到第 1 行
        let row = BOARD_SIZE - row_idx as i8;
        let mut col: i8 = 0;

        for ch in row_str.chars() {
            if let Some(empty) = ch.to_digit(10) {
                let cols = col + empty as i8;
                if cols > BOARD_SIZE {
                    return Err(FenError::ColumnCount { row, cols });
                }
                col = cols;
                continue;
            }
            let (team, rank) = match ch {
                'M' => (Team::Near, Rank::Man),
                'K' => (Team::Near, Rank::King),
                'm' => (Team::Far, Rank::Man),
                'k' => (Team::Far, Rank::King),
                _ => return Err(FenError::Character(ch)),
            };
            col += 1;
            let square = Square::from_row_col(row, col)
                .ok_or(FenError::ColumnCount { row, cols: col })?;
            board.place(team, rank, square)?;
        }

        if col != BOARD_SIZE {
            return Err(FenError::ColumnCount { row, cols: col });
        }
    }

    Ok(())
}

/// 生成 FEN 字符串，连吃未结束时附带连吃格
pub fn to_fen(board: &Board) -> String {
    let mut rows = Vec::new();

    for row in (1..=BOARD_SIZE).rev() {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for col in 1..=BOARD_SIZE {
            let piece = Square::from_row_col(row, col).and_then(|sq| board.get_piece(sq));
            if let Some(piece) = piece {
                if empty_count > 0 {
                    row_str.push_str(&empty_count.to_string());
                    empty_count = 0;
                }
                row_str.push(piece_char(piece.team, piece.rank));
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    let mut fen = format!("{} {}", rows.join("/"), board.turn().to_fen_char());
    if let Some(square) = board.chain() {
        fen.push_str(&format!(" {}", square));
    }
    fen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvariantViolation, MoveError};
    use crate::test_positions::{JUMP_READY, START};
    use crate::types::Move;

    fn sq(n: i8) -> Square {
        Square::new(n).unwrap()
    }

    #[test]
    fn test_parse_start_fen() {
        let board = parse_fen(START).unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(to_fen(&board), START);
    }

    #[test]
    fn test_parse_pieces_and_turn() {
        let board = parse_fen("8/8/8/5k2/8/1K6/8/8 f").unwrap();
        assert_eq!(board.turn(), Team::Far);

        let far = board.get_piece(sq(38)).unwrap();
        assert_eq!((far.team, far.rank), (Team::Far, Rank::King));
        let near = board.get_piece(sq(18)).unwrap();
        assert_eq!((near.team, near.rank), (Team::Near, Rank::King));
        assert_eq!(board.count(Team::Near) + board.count(Team::Far), 2);
    }

    #[test]
    fn test_roundtrip_after_moves() {
        let mut board = parse_fen(JUMP_READY).unwrap();
        board.play(sq(18), sq(36)).unwrap();
        let fen = to_fen(&board);
        assert!(fen.ends_with(" f"));
        assert_eq!(parse_fen(&fen).unwrap(), board);
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(parse_fen("8/8/8 n"), Err(FenError::RowCount(3))));
        assert!(matches!(parse_fen("8/8/8/8/8/8/8/8"), Err(FenError::Format(_))));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 x"),
            Err(FenError::Turn(_))
        ));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/1q6 n"),
            Err(FenError::Character('q'))
        ));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/7 n"),
            Err(FenError::ColumnCount { row: 1, cols: 7 })
        ));
        // 超长的空格数字在累加前就被拒绝
        assert_eq!(
            parse_fen("99999999999999999/8/8/8/8/8/8/8 n"),
            Err(FenError::ColumnCount { row: 8, cols: 9 })
        );
        assert_eq!(
            parse_fen("44M/8/8/8/8/8/8/8 n"),
            Err(FenError::ColumnCount { row: 8, cols: 9 })
        );
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 n 27 x"),
            Err(FenError::Format(_))
        ));
    }

    /// Near 的 9 号兵连吃途中，13 号兵也能吃 22 号
    const TWO_JUMPERS: &str = "6m1/8/8/3m4/8/1m3m2/M3M3/8 n";

    #[test]
    fn test_chain_roundtrip() {
        let mut board = parse_fen(TWO_JUMPERS).unwrap();
        let outcome = board.apply_capture(sq(9), sq(27)).unwrap();
        assert!(outcome.chain_continues());

        let fen = to_fen(&board);
        assert!(fen.ends_with(" n 27"), "{}", fen);
        let mut reparsed = parse_fen(&fen).unwrap();
        assert_eq!(reparsed, board);

        // 重新解析后仍然只能由连吃的棋子继续
        assert_eq!(
            reparsed.legal_moves(Team::Near),
            vec![Move::capture(sq(27), sq(45))]
        );
        assert_eq!(
            reparsed.apply_capture(sq(13), sq(31)),
            Err(MoveError::ChainInProgress { square: sq(27) })
        );
        reparsed.apply_capture(sq(27), sq(45)).unwrap();
        assert!(to_fen(&reparsed).ends_with(" f"));
    }

    #[test]
    fn test_rejects_invalid_chain_square() {
        // 空格、对方棋子、无子可吃的棋子、非法编号
        for chain in ["27", "18", "13", "0", "x"] {
            let fen = format!("6m1/8/8/3m4/8/1m6/M3M3/8 n {}", chain);
            assert_eq!(
                parse_fen(&fen),
                Err(FenError::Chain(chain.to_string())),
                "{}",
                fen
            );
        }
        let board = parse_fen("6m1/8/8/3m4/8/1m6/M3M3/8 n 9").unwrap();
        assert_eq!(board.chain(), Some(sq(9)));
    }

    #[test]
    fn test_rejects_piece_on_unusable_square() {
        // 第 8 行第 2 列是浅色格
        assert_eq!(
            parse_fen("1M6/8/8/8/8/8/8/8 n"),
            Err(FenError::Invariant(InvariantViolation::UnusableSquare {
                square: sq(58)
            }))
        );
    }

    #[test]
    fn test_rejects_too_many_pieces() {
        let fen = "m1m1m1m1/1m1m1m1m/m1m1m1m1/1m6/8/1M1M1M1M/M1M1M1M1/1M1M1M1M n";
        assert!(matches!(
            parse_fen(fen),
            Err(FenError::Invariant(InvariantViolation::TooManyPieces { .. }))
        ));
    }
}
