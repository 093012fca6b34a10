//! 求和判断

use crate::board::Board;
use crate::types::Team;

/// 引擎接受求和的阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPolicy {
    /// 对方评分高出引擎评分超过该值时接受
    pub disadvantage_margin: f64,
    /// 双方只剩一枚棋子且评分差不超过该值时接受
    pub equality_margin: f64,
}

impl Default for DrawPolicy {
    fn default() -> Self {
        DrawPolicy {
            disadvantage_margin: 0.3,
            equality_margin: 0.1,
        }
    }
}

impl DrawPolicy {
    /// `engine_eval`/`human_eval` 分别是双方视角下的局面评分
    pub fn accepts(&self, board: &Board, engine_eval: f64, human_eval: f64) -> bool {
        if human_eval - engine_eval > self.disadvantage_margin {
            return true;
        }
        let lone_pieces = board.count(Team::Near) == 1 && board.count(Team::Far) == 1;
        lone_pieces && (engine_eval - human_eval).abs() <= self.equality_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions::END_3;

    #[test]
    fn test_accepts_when_behind() {
        let policy = DrawPolicy::default();
        let board = Board::new();
        assert!(policy.accepts(&board, -5.0, 5.0));
        assert!(!policy.accepts(&board, 5.0, -5.0));
        assert!(!policy.accepts(&board, 1.0, 1.2));
    }

    #[test]
    fn test_accepts_equal_lone_pieces() {
        let policy = DrawPolicy::default();
        let endgame = Board::from_fen(END_3).unwrap();
        assert!(policy.accepts(&endgame, 2.0, 2.05));
        assert!(!policy.accepts(&endgame, 2.0, 1.5));
        // 子多时评分相等也不接受
        assert!(!policy.accepts(&Board::new(), 0.0, 0.0));
    }

    #[test]
    fn test_custom_margins() {
        let policy = DrawPolicy {
            disadvantage_margin: 10.0,
            equality_margin: 0.0,
        };
        assert!(!policy.accepts(&Board::new(), -4.0, 4.0));
        assert!(policy.accepts(&Board::new(), -6.0, 6.0));
    }
}
