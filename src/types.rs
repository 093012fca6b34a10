//! 跳棋核心类型定义
//!
//! 8x8 英式跳棋（English draughts）的基础数据类型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 棋盘边长
pub const BOARD_SIZE: i8 = 8;

/// 每方初始棋子数
pub const PIECES_PER_TEAM: usize = 12;

/// 阵营
///
/// Near 从第 1 行出发向行号增大的方向前进，Far 从第 8 行出发向行号减小的方向前进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Near,
    Far,
}

impl Team {
    /// 获取对方阵营
    pub fn opposite(&self) -> Team {
        match self {
            Team::Near => Team::Far,
            Team::Far => Team::Near,
        }
    }

    /// 前进方向上的行增量
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Team::Near => 1,
            Team::Far => -1,
        }
    }

    /// 升变行（对方底线）
    #[inline]
    pub fn promotion_row(&self) -> i8 {
        match self {
            Team::Near => BOARD_SIZE,
            Team::Far => 1,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Team> {
        match c {
            'n' => Some(Team::Near),
            'f' => Some(Team::Far),
            _ => None,
        }
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Team::Near => 'n',
            Team::Far => 'f',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Near => write!(f, "Near"),
            Team::Far => write!(f, "Far"),
        }
    }
}

/// 棋子等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    /// 普通兵，只能向前斜走
    Man,
    /// 王，可以四个斜向走
    King,
}

impl Rank {
    /// 规范化棋盘中的绝对值
    pub fn value(&self) -> i8 {
        match self {
            Rank::Man => 1,
            Rank::King => 3,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Man => write!(f, "Man"),
            Rank::King => write!(f, "King"),
        }
    }
}

/// 格子编号 `8 * (row - 1) + col`，row/col 取 1..=8
pub fn compute_square_number(row: i8, col: i8) -> i8 {
    BOARD_SIZE * (row - 1) + col
}

/// 编号还原为 (row, col)
pub fn compute_row_and_col(number: i8) -> (i8, i8) {
    (1 + (number - 1) / BOARD_SIZE, 1 + (number - 1) % BOARD_SIZE)
}

/// 棋盘格子
///
/// 只保存合法编号 1..=64；`row + col` 为奇数的格子才可落子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// 从编号创建，超出 1..=64 返回 None
    pub fn new(number: i8) -> Option<Square> {
        if Square::is_valid_number(number) {
            Some(Square(number as u8))
        } else {
            None
        }
    }

    /// 从行列创建
    pub fn from_row_col(row: i8, col: i8) -> Option<Square> {
        if !(1..=BOARD_SIZE).contains(&row) || !(1..=BOARD_SIZE).contains(&col) {
            return None;
        }
        Square::new(compute_square_number(row, col))
    }

    #[inline]
    pub fn is_valid_number(number: i8) -> bool {
        (1..=64).contains(&number)
    }

    #[inline]
    pub fn number(&self) -> i8 {
        self.0 as i8
    }

    #[inline]
    pub fn row(&self) -> i8 {
        compute_row_and_col(self.number()).0
    }

    #[inline]
    pub fn col(&self) -> i8 {
        compute_row_and_col(self.number()).1
    }

    /// 是否为可落子的深色格
    #[inline]
    pub fn is_playable(&self) -> bool {
        (self.row() + self.col()) % 2 == 1
    }

    /// 数组下标（0..64）
    #[inline]
    pub fn to_index(&self) -> usize {
        self.0 as usize - 1
    }

    #[inline]
    pub fn from_index(index: usize) -> Square {
        Square(index as u8 + 1)
    }

    /// 编号加偏移量，结果越界返回 None
    #[inline]
    pub fn offset(&self, delta: i8) -> Option<Square> {
        Square::new(self.number() + delta)
    }

    /// 两格之间的中点（吃子跳跃时被吃棋子所在格）
    #[inline]
    pub fn midpoint(&self, other: Square) -> Square {
        Square((self.0 + other.0) / 2)
    }

    /// 所有可落子的格子，按编号升序
    pub fn playable() -> impl Iterator<Item = Square> {
        (1..=64).map(Square).filter(|sq| sq.is_playable())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub is_capture: bool,
}

impl Move {
    /// 普通走法
    pub fn simple(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            is_capture: false,
        }
    }

    /// 吃子走法
    pub fn capture(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            is_capture: true,
        }
    }

    /// 被吃棋子所在格
    pub fn captured_square(&self) -> Option<Square> {
        if self.is_capture {
            Some(self.from.midpoint(self.to))
        } else {
            None
        }
    }

    /// 从字符串解析
    ///
    /// 格式：普通走法 `22-29`，吃子走法 `22x36`
    pub fn parse(s: &str) -> Option<Move> {
        let s = s.trim();
        let (from, to, is_capture) = if let Some((a, b)) = s.split_once('x') {
            (a, b, true)
        } else {
            let (a, b) = s.split_once('-')?;
            (a, b, false)
        };
        let from = Square::new(from.trim().parse().ok()?)?;
        let to = Square::new(to.trim().parse().ok()?)?;
        Some(Move {
            from,
            to,
            is_capture,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Ongoing,
    NearWin,
    FarWin,
    Draw,
}

impl GameResult {
    /// 某方获胜
    pub fn win_for(team: Team) -> GameResult {
        match team {
            Team::Near => GameResult::NearWin,
            Team::Far => GameResult::FarWin,
        }
    }
}

/// 难度档位，只决定搜索深度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// 对应的最大搜索深度
    pub fn max_depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 3,
            Difficulty::Hard => 5,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty: {}. Available: easy, medium, hard",
                s
            )),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}
