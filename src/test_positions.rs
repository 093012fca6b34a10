//! 跳棋测试局面库
//!
//! 提供命名的 FEN 测试局面和随机局面生成，方便测试、基准和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - JUMP_n / CHAIN_n: 吃子与连吃
//! - KING_n: 王的走法
//! - END_n: 残局与终局

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::error::InvariantViolation;
use crate::types::{Rank, Square, Team, PIECES_PER_TEAM};

// =============================================================================
// 开局 (START)
// =============================================================================

/// 初始局面
pub const START: &str = "m1m1m1m1/1m1m1m1m/m1m1m1m1/8/8/1M1M1M1M/M1M1M1M1/1M1M1M1M n";

/// Far 把 43 号兵走到 34 号后轮到 Near
pub const EARLY_1: &str = "m1m1m1m1/1m1m1m1m/m3m1m1/1m6/8/1M1M1M1M/M1M1M1M1/1M1M1M1M n";

// =============================================================================
// 吃子 (JUMP / CHAIN)
// =============================================================================

/// 初始局面，Far 的 43 号兵已走到 27 号，紧贴 Near 的 18、20 号兵
pub const JUMP_READY: &str = "m1m1m1m1/1m1m1m1m/m3m1m1/8/2m5/1M1M1M1M/M1M1M1M1/1M1M1M1M n";

/// Near 的 9 号兵可以连吃 18、36 两枚 Far 兵
pub const CHAIN_1: &str = "6m1/8/8/3m4/8/1m6/M7/8 n";

/// 连吃分叉：Near 的 2 号兵吃掉 11 后，可以吃 27 或 29
pub const CHAIN_2: &str = "6m1/8/8/8/2m1m3/8/2m5/1M6 n";

/// 不等长的连吃分叉：2x20 之后，20x34 还能接着吃 43，20x38 到此为止
pub const CHAIN_3: &str = "6m1/8/2m5/8/2m1m3/8/2m5/1M6 n";

// =============================================================================
// 王 (KING)
// =============================================================================

/// Near 王在中央 36 号，四个方向都能走
pub const KING_1: &str = "6m1/8/8/3K4/8/8/8/8 n";

/// Near 的 52 号兵下一步升变
pub const KING_2: &str = "8/3M4/8/8/8/8/m7/8 n";

// =============================================================================
// 残局 (END)
// =============================================================================

/// Near 吃掉 Far 最后一枚棋子即获胜
pub const END_1: &str = "8/8/8/8/2m5/1M6/8/8 n";

/// 轮到 Far 走，但唯一的兵被堵死
pub const END_2: &str = "8/8/8/8/8/8/m7/1M6 f";

/// 双方各剩一个王
pub const END_3: &str = "8/5k2/8/8/8/8/2K5/8 n";

/// 所有命名局面
pub const ALL_POSITIONS: [&str; 11] = [
    START, EARLY_1, JUMP_READY, CHAIN_1, CHAIN_2, CHAIN_3, KING_1, KING_2, END_1, END_2, END_3,
];

/// 随机合法局面
///
/// 每方 1 到 `max_per_team` 枚棋子，落在随机的可用格上；落在升变行的棋子直接为王。
pub fn random_position<R: Rng>(
    rng: &mut R,
    max_per_team: usize,
) -> Result<Board, InvariantViolation> {
    let turn = if rng.gen_bool(0.5) {
        Team::Near
    } else {
        Team::Far
    };
    let mut board = Board::empty(turn);

    let mut squares: Vec<Square> = Square::playable().collect();
    squares.shuffle(rng);
    let mut free = squares.into_iter();

    let limit = max_per_team.clamp(1, PIECES_PER_TEAM);
    for team in [Team::Near, Team::Far] {
        let count = rng.gen_range(1..=limit);
        for square in free.by_ref().take(count) {
            let rank = if square.row() == team.promotion_row() || rng.gen_bool(0.2) {
                Rank::King
            } else {
                Rank::Man
            };
            board.place(team, rank, square)?;
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameResult;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(n: i8) -> Square {
        Square::new(n).unwrap()
    }

    #[test]
    fn test_all_positions_valid() {
        for (i, fen) in ALL_POSITIONS.iter().enumerate() {
            let board = Board::from_fen(fen);
            assert!(board.is_ok(), "position {} invalid: {:?}", i, board.err());
        }
    }

    #[test]
    fn test_named_positions_describe_themselves() {
        let board = Board::from_fen(CHAIN_1).unwrap();
        assert_eq!(board.legal_jumps(sq(9)), vec![sq(27)]);

        let board = Board::from_fen(CHAIN_2).unwrap();
        assert_eq!(board.legal_jumps(sq(2)), vec![sq(20)]);

        let mut board = Board::from_fen(CHAIN_3).unwrap();
        board.apply_capture(sq(2), sq(20)).unwrap();
        assert_eq!(board.legal_jumps(sq(20)), vec![sq(34), sq(38)]);

        let board = Board::from_fen(KING_1).unwrap();
        assert_eq!(board.legal_simple_moves(sq(36)).len(), 4);

        let board = Board::from_fen(END_2).unwrap();
        assert!(board.is_team_defeated(Team::Far));
        assert_eq!(board.game_result(), GameResult::NearWin);
    }

    #[test]
    fn test_random_positions_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let board = random_position(&mut rng, 12).unwrap();
            assert!(board.check_invariants().is_ok());
            for team in [Team::Near, Team::Far] {
                assert!((1..=12).contains(&board.count(team)));
                for piece in board.pieces(team) {
                    assert!(!piece.is_promotion());
                }
            }
        }
    }

    #[test]
    fn test_random_positions_respect_limit() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let board = random_position(&mut rng, 3).unwrap();
            assert!(board.count(Team::Near) <= 3);
            assert!(board.count(Team::Far) <= 3);
        }
    }
}
