//! AI 策略模块
//!
//! 深度受限的 minimax 搜索（可选 Alpha-Beta 剪枝）和求和判断

mod draw;
mod minimax;

pub use draw::DrawPolicy;
pub use minimax::{MinimaxAI, SearchOutcome, SearchStats};

use crate::board::Board;
use crate::error::SearchError;
use crate::types::{Difficulty, Move};
use std::cmp::Ordering;

/// AI 配置
#[derive(Debug, Clone, PartialEq)]
pub struct AIConfig {
    /// 搜索深度
    pub depth: u32,
    /// 是否启用 Alpha-Beta 剪枝，关闭时做完整 minimax
    pub alpha_beta: bool,
    /// 求和阈值
    pub draw: DrawPolicy,
}

impl Default for AIConfig {
    fn default() -> Self {
        AIConfig::from_difficulty(Difficulty::default())
    }
}

impl AIConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        AIConfig {
            depth: difficulty.max_depth(),
            alpha_beta: true,
            draw: DrawPolicy::default(),
        }
    }
}

/// 走法评分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// AI 策略接口
pub trait AIStrategy {
    /// 选择走法（返回带评分的走法列表）
    fn select_moves(&self, board: &Board, n: usize) -> Result<Vec<ScoredMove>, SearchError>;

    /// 选择最佳走法
    fn select_best_move(&self, board: &Board) -> Result<Option<Move>, SearchError> {
        Ok(self.select_moves(board, 1)?.first().map(|sm| sm.mv))
    }
}

/// 按分数降序排序后截断，同分保持生成顺序
pub(crate) fn sort_and_truncate(scored: &mut Vec<ScoredMove>, n: usize) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn scored(from: i8, to: i8, score: f64) -> ScoredMove {
        ScoredMove {
            mv: Move::simple(Square::new(from).unwrap(), Square::new(to).unwrap()),
            score,
        }
    }

    #[test]
    fn test_config_from_difficulty() {
        assert_eq!(AIConfig::from_difficulty(Difficulty::Easy).depth, 1);
        assert_eq!(AIConfig::from_difficulty(Difficulty::Hard).depth, 5);
        let config = AIConfig::default();
        assert_eq!(config.depth, 3);
        assert!(config.alpha_beta);
    }

    #[test]
    fn test_sort_keeps_first_of_equal_scores() {
        let mut moves = vec![
            scored(18, 25, 1.0),
            scored(18, 27, 4.0),
            scored(20, 27, 4.0),
            scored(22, 29, -2.0),
        ];
        sort_and_truncate(&mut moves, 3);
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0], scored(18, 27, 4.0));
        assert_eq!(moves[1], scored(20, 27, 4.0));
        assert_eq!(moves[2], scored(18, 25, 1.0));
    }
}
