//! 错误类型定义
//!
//! 走法拒绝、不变量破坏、评估失败和 FEN 解析错误

use crate::types::{Square, Team};
use thiserror::Error;

/// 棋盘内部状态不一致（程序错误，不是用户输入错误）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// 棋子放在不可落子的格子上
    #[error("Piece on unusable square {square}")]
    UnusableSquare { square: Square },

    /// 棋子记录的位置与所在格子不一致
    #[error("Piece stored at square {stored} claims square {claimed}")]
    OccupancyMismatch { stored: Square, claimed: Square },

    /// 某方棋子数超出上限
    #[error("Team {team} has {count} pieces")]
    TooManyPieces { team: Team, count: usize },

    /// 执行走法时起点没有棋子
    #[error("No piece to move at square {square}")]
    MissingPiece { square: Square },

    /// 吃子跳跃的中点没有对方棋子
    #[error("Capture {from}x{to} has no opponent on the midpoint")]
    CaptureWithoutOpponent { from: Square, to: Square },
}

/// 走法被拒绝
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 起点没有棋子
    #[error("No piece at square {square}")]
    NoPiece { square: Square },

    /// 棋子不属于当前走棋方
    #[error("Piece at square {square} does not belong to {team}")]
    WrongTeam { square: Square, team: Team },

    /// 目标格不在合法目标集合中
    #[error("Illegal move: from square {from} to square {to}")]
    IllegalMove { from: Square, to: Square },

    /// 有子可吃时走了普通走法
    #[error("Capture is mandatory: {from}-{to} is not a capture")]
    MandatoryCapture { from: Square, to: Square },

    /// 连吃尚未结束时选择了其他棋子
    #[error("Capture chain in progress with the piece at square {square}")]
    ChainInProgress { square: Square },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// 局面评估失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// 规范化棋盘中出现非法值
    #[error("Malformed board: value {value} at row {row}, col {col}")]
    MalformedBoard { row: usize, col: usize, value: i8 },
}

/// 搜索失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Evaluator failed: {0}")]
    Eval(#[from] EvalError),

    #[error("Board invariant violated during search: {0}")]
    Invariant(#[from] InvariantViolation),

    /// 生成器产出的走法被执行层拒绝
    #[error("Generated move rejected: {0}")]
    Rejected(#[from] MoveError),
}

/// FEN 解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("Invalid FEN format: expected '<board> <turn> [<chain>]', got: {0}")]
    Format(String),

    #[error("Invalid board: expected 8 rows, got {0}")]
    RowCount(usize),

    #[error("Row {row} has {cols} columns, expected 8")]
    ColumnCount { row: i8, cols: i8 },

    #[error("Invalid character in board: {0}")]
    Character(char),

    #[error("Invalid turn: {0}")]
    Turn(String),

    /// 连吃格上没有走棋方可以继续吃子的棋子
    #[error("Invalid capture chain square: {0}")]
    Chain(String),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
