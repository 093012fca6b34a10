//! 局面评估
//!
//! 搜索只依赖 `Evaluator` 契约：给定规范化棋盘返回一个分数，分数越高对正值一方越有利。
//! `MetricsEvaluator` 是手写的特征加权评估，`MaterialEvaluator` 只数子力。

use serde::Serialize;

use crate::board::Board;
use crate::error::EvalError;
use crate::types::{Team, PIECES_PER_TEAM};

/// 规范化棋盘
///
/// `[row][col]`，行下标 0 对应第 1 行。兵 ±1，王 ±3，Near 为正。
pub type CanonicalBoard = [[i8; 8]; 8];

const MAN: i8 = 1;
const KING: i8 = 3;

/// 正值一方的前进方向（行下标增大）
const FORWARD: [(isize, isize); 2] = [(1, 1), (1, -1)];
const BACKWARD: [(isize, isize); 2] = [(-1, 1), (-1, -1)];

/// 局面评估器
pub trait Evaluator {
    /// 评估名称
    fn name(&self) -> &str;

    /// 评估规范化棋盘，分数越高对正值一方越有利
    fn evaluate(&self, board: &CanonicalBoard) -> Result<f64, EvalError>;
}

/// 翻转视角：取反后旋转 180 度
pub fn reverse(board: &CanonicalBoard) -> CanonicalBoard {
    let mut reversed = [[0i8; 8]; 8];
    for (r, row) in reversed.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = -board[7 - r][7 - c];
        }
    }
    reversed
}

/// 某方视角的规范化棋盘：该方为正值，且朝行下标增大的方向前进
pub fn perspective(board: &Board, team: Team) -> CanonicalBoard {
    let matrix = board.serialize();
    match team {
        Team::Near => matrix,
        Team::Far => reverse(&matrix),
    }
}

/// 校验规范化棋盘：取值只能是 0/±1/±3，不可用格必须为 0
pub fn validate(board: &CanonicalBoard) -> Result<(), EvalError> {
    for (row, cells) in board.iter().enumerate() {
        for (col, &value) in cells.iter().enumerate() {
            let legal = [0, MAN, KING, -MAN, -KING].contains(&value);
            let unusable = row % 2 == col % 2;
            if !legal || (unusable && value != 0) {
                return Err(EvalError::MalformedBoard { row, col, value });
            }
        }
    }
    Ok(())
}

#[inline]
fn cell(board: &CanonicalBoard, r: isize, c: isize) -> Option<i8> {
    if (0..8).contains(&r) && (0..8).contains(&c) {
        Some(board[r as usize][c as usize])
    } else {
        None
    }
}

/// 棋子可以走的方向：正值棋子向前，正值王还可以后退
fn directions(value: i8) -> impl Iterator<Item = (isize, isize)> {
    let forward: &[(isize, isize)] = if value >= MAN { &FORWARD } else { &[] };
    let backward: &[(isize, isize)] = if value == KING { &BACKWARD } else { &[] };
    forward.iter().chain(backward).copied()
}

fn count_where(
    board: &CanonicalBoard,
    rows: std::ops::Range<usize>,
    f: impl Fn(i8) -> bool,
) -> i32 {
    board[rows].iter().flatten().filter(|&&v| f(v)).count() as i32
}

/// 从 (r, c) 出发的吃子分支数，每一跳在副本上继续递归
fn num_branches(board: &CanonicalBoard, r: isize, c: isize) -> i32 {
    let value = board[r as usize][c as usize];
    directions(value)
        .map(|(dr, dc)| {
            let over = cell(board, r + dr, c + dc);
            let land = cell(board, r + 2 * dr, c + 2 * dc);
            match (over, land) {
                (Some(enemy), Some(0)) if enemy < 0 => {
                    let mut next = *board;
                    next[r as usize][c as usize] = 0;
                    next[(r + dr) as usize][(c + dc) as usize] = 0;
                    next[(r + 2 * dr) as usize][(c + 2 * dc) as usize] = value;
                    1 + num_branches(&next, r + 2 * dr, c + 2 * dc)
                }
                _ => 0,
            }
        })
        .sum()
}

fn positive_cells(board: &CanonicalBoard) -> impl Iterator<Item = (isize, isize)> + '_ {
    (0..8isize)
        .flat_map(|r| (0..8isize).map(move |c| (r, c)))
        .filter(move |&(r, c)| board[r as usize][c as usize] > 0)
}

/// 正值一方的走法数：有吃子时只数吃子分支，否则数空闲的斜向一步
fn possible_moves(board: &CanonicalBoard) -> i32 {
    let branches: i32 = positive_cells(board)
        .map(|(r, c)| num_branches(board, r, c))
        .sum();
    if branches > 0 {
        return branches;
    }
    positive_cells(board)
        .map(|(r, c)| {
            directions(board[r as usize][c as usize])
                .filter(|&(dr, dc)| cell(board, r + dr, c + dc) == Some(0))
                .count() as i32
        })
        .sum()
}

/// +1 正值一方获胜，-1 负值一方获胜，0 未分胜负
fn game_winner(board: &CanonicalBoard) -> i32 {
    if count_where(board, 0..8, |v| v < 0) == 0 {
        1
    } else if count_where(board, 0..8, |v| v > 0) == 0 {
        -1
    } else if possible_moves(board) == 0 {
        -1
    } else if possible_moves(&reverse(board)) == 0 {
        1
    } else {
        0
    }
}

/// 内部没有己方棋子保护的对方棋子数
fn capturables(board: &CanonicalBoard) -> i32 {
    let mut count = 0;
    for r in 1..7isize {
        for c in 1..7isize {
            if board[r as usize][c as usize] >= 0 {
                continue;
            }
            let exposed = [(1, 1), (1, -1), (-1, 1), (-1, -1)]
                .iter()
                .all(|&(dr, dc)| cell(board, r + dr, c + dc).is_some_and(|v| v >= 0));
            if exposed {
                count += 1;
            }
        }
    }
    count
}

/// 无法被吃的己方棋子：边线上的棋子，以及有一对同侧保护的内部棋子
fn uncapturables(board: &CanonicalBoard) -> i32 {
    let own = |r: isize, c: isize| cell(board, r, c).is_some_and(|v| v > 0);
    let mut count = 0;
    for r in 1..7isize {
        for c in 1..7isize {
            if !own(r, c) {
                continue;
            }
            let supported = (own(r + 1, c + 1) && own(r + 1, c - 1))
                || (own(r - 1, c + 1) && own(r - 1, c - 1))
                || (own(r + 1, c + 1) && own(r - 1, c + 1))
                || (own(r + 1, c - 1) && own(r - 1, c - 1));
            if supported {
                count += 1;
            }
        }
    }
    let edge_rows = [0usize, 7]
        .iter()
        .flat_map(move |&r| board[r].iter())
        .filter(|&&v| v > 0)
        .count();
    let edge_cols = board[1..7]
        .iter()
        .filter(|row| row[0] > 0)
        .count()
        + board[1..7].iter().filter(|row| row[7] > 0).count();
    count + (edge_rows + edge_cols) as i32
}

fn semicapturables(board: &CanonicalBoard) -> i32 {
    PIECES_PER_TEAM as i32 - uncapturables(board) - capturables(&reverse(board))
}

/// 手写评估的特征向量，均为正值一方减去负值一方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardMetrics {
    pub captured: i32,
    pub potential: i32,
    pub men: i32,
    pub kings: i32,
    pub capturables: i32,
    pub semicapturables: i32,
    pub uncapturables: i32,
    pub middle: i32,
    pub far: i32,
    pub won: i32,
}

impl BoardMetrics {
    /// 计算特征（调用方负责先校验棋盘）
    pub fn compute(board: &CanonicalBoard) -> BoardMetrics {
        let reversed = reverse(board);
        let negated = board.map(|row| row.map(|v| -v));
        BoardMetrics {
            captured: PIECES_PER_TEAM as i32 - count_where(board, 0..8, |v| v < 0),
            potential: possible_moves(board) - possible_moves(&reversed),
            men: count_where(board, 0..8, |v| v == MAN) - count_where(board, 0..8, |v| v == -MAN),
            kings: count_where(board, 0..8, |v| v == KING)
                - count_where(board, 0..8, |v| v == -KING),
            capturables: capturables(board) - capturables(&reversed),
            semicapturables: semicapturables(board),
            uncapturables: uncapturables(board) - uncapturables(&reversed),
            middle: count_where(board, 3..5, |v| v > 0) - count_where(&negated, 3..5, |v| v > 0),
            far: count_where(board, 5..8, |v| v > 0) - count_where(&reversed, 5..8, |v| v > 0),
            won: game_winner(board),
        }
    }

    /// 加权总分
    pub fn score(&self) -> i32 {
        4 * self.captured
            + self.potential
            + self.men
            + 3 * self.kings
            + self.capturables
            + 2 * self.semicapturables
            + 3 * self.uncapturables
            + 2 * self.middle
            + 3 * self.far
            + 100 * self.won
    }
}

/// 手写特征评估（默认）
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEvaluator;

impl MetricsEvaluator {
    pub fn metrics(&self, board: &CanonicalBoard) -> Result<BoardMetrics, EvalError> {
        validate(board)?;
        Ok(BoardMetrics::compute(board))
    }
}

impl Evaluator for MetricsEvaluator {
    fn name(&self) -> &str {
        "metrics"
    }

    fn evaluate(&self, board: &CanonicalBoard) -> Result<f64, EvalError> {
        Ok(self.metrics(board)?.score() as f64)
    }
}

/// 子力评估：兵 1 分，王 3 分
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn name(&self) -> &str {
        "material"
    }

    fn evaluate(&self, board: &CanonicalBoard) -> Result<f64, EvalError> {
        validate(board)?;
        Ok(board.iter().flatten().map(|&v| v as i32).sum::<i32>() as f64)
    }
}

/// 可用的评估器名称
pub const AVAILABLE_EVALUATORS: [&str; 2] = ["metrics", "material"];

/// 按名称创建评估器
pub fn evaluator_from_name(name: &str) -> Result<Box<dyn Evaluator>, String> {
    match name.to_lowercase().as_str() {
        "metrics" => Ok(Box::new(MetricsEvaluator)),
        "material" => Ok(Box::new(MaterialEvaluator)),
        _ => Err(format!(
            "Unknown evaluator: {}. Available: {}",
            name,
            AVAILABLE_EVALUATORS.join(", ")
        )),
    }
}
