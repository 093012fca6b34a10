//! 跳棋棋盘状态
//!
//! 使用 64 格数组存放棋子，占用关系由棋子位置直接给出。
//! `Board` 是值语义：`clone()` 得到完全独立的副本，搜索在副本上推演。

use crate::error::{FenError, InvariantViolation};
use crate::eval::CanonicalBoard;
use crate::fen::{parse_fen, to_fen};
use crate::types::{Rank, Square, Team, BOARD_SIZE, PIECES_PER_TEAM};

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub team: Team,
    pub rank: Rank,
    pub square: Square,
    /// 轮到本方时是否有子可吃，回合交换时刷新
    pub can_capture: bool,
}

impl Piece {
    pub fn new(team: Team, rank: Rank, square: Square) -> Self {
        Piece {
            team,
            rank,
            square,
            can_capture: false,
        }
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    /// 是否到达升变行（王不会再次升变）
    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.rank == Rank::Man && self.square.row() == self.team.promotion_row()
    }

    /// 规范化棋盘中的取值：Near 为正，Far 为负
    #[inline]
    pub fn canonical_value(&self) -> i8 {
        match self.team {
            Team::Near => self.rank.value(),
            Team::Far => -self.rank.value(),
        }
    }
}

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// 64 个格子，下标为 `square - 1`
    squares: [Option<Piece>; 64],
    turn: Team,
    /// 正在连吃的棋子所在格
    chain: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// 标准初始局面：Near 占第 1-3 行，Far 占第 6-8 行，Near 先走
    pub fn new() -> Board {
        let mut board = Board::empty(Team::Near);
        for sq in Square::playable() {
            let team = match sq.row() {
                1..=3 => Team::Near,
                6..=8 => Team::Far,
                _ => continue,
            };
            board.squares[sq.to_index()] = Some(Piece::new(team, Rank::Man, sq));
        }
        board
    }

    /// 空棋盘
    pub fn empty(turn: Team) -> Board {
        Board {
            squares: [None; 64],
            turn,
            chain: None,
        }
    }

    /// 从 FEN 字符串创建棋盘
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        parse_fen(fen)
    }

    /// 生成 FEN 字符串
    pub fn to_fen(&self) -> String {
        to_fen(self)
    }

    /// 放置一枚棋子
    pub fn place(&mut self, team: Team, rank: Rank, square: Square) -> Result<(), InvariantViolation> {
        if !square.is_playable() {
            return Err(InvariantViolation::UnusableSquare { square });
        }
        if let Some(existing) = self.squares[square.to_index()] {
            return Err(InvariantViolation::OccupancyMismatch {
                stored: square,
                claimed: existing.square,
            });
        }
        self.squares[square.to_index()] = Some(Piece::new(team, rank, square));
        self.refresh_capture_flags();
        Ok(())
    }

    #[inline]
    pub fn turn(&self) -> Team {
        self.turn
    }

    /// 交换走棋方，并重新计算新走棋方的吃子标记
    pub fn set_turn(&mut self, team: Team) {
        self.turn = team;
        self.refresh_capture_flags();
    }

    /// 正在连吃的棋子
    #[inline]
    pub fn chain(&self) -> Option<Square> {
        self.chain
    }

    #[inline]
    pub(crate) fn set_chain(&mut self, chain: Option<Square>) {
        self.chain = chain;
    }

    #[inline]
    pub fn get_piece(&self, square: Square) -> Option<&Piece> {
        self.squares[square.to_index()].as_ref()
    }

    #[inline]
    pub(crate) fn get_piece_mut(&mut self, square: Square) -> Option<&mut Piece> {
        self.squares[square.to_index()].as_mut()
    }

    #[inline]
    pub fn is_free(&self, square: Square) -> bool {
        self.squares[square.to_index()].is_none()
    }

    /// 某方所有棋子，按格子编号升序
    pub fn pieces(&self, team: Team) -> impl Iterator<Item = &Piece> + '_ {
        self.squares
            .iter()
            .filter_map(|p| p.as_ref())
            .filter(move |p| p.team == team)
    }

    /// 某方棋子所在格
    pub fn squares_of(&self, team: Team) -> Vec<Square> {
        self.pieces(team).map(|p| p.square).collect()
    }

    pub fn count(&self, team: Team) -> usize {
        self.pieces(team).count()
    }

    /// 移除棋子（不刷新吃子标记，由走法执行统一刷新）
    pub(crate) fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.to_index()].take()
    }

    /// 移动棋子（不做规则检查），到达底线时就地升变，返回是否升变
    pub(crate) fn relocate(&mut self, from: Square, to: Square) -> bool {
        let Some(mut piece) = self.squares[from.to_index()].take() else {
            return false;
        };
        piece.square = to;
        let promoted = piece.is_promotion();
        if promoted {
            // 兵被同格的王取代，连吃标记随之清除
            piece = Piece::new(piece.team, Rank::King, to);
        }
        self.squares[to.to_index()] = Some(piece);
        promoted
    }

    /// 序列化为规范化棋盘
    ///
    /// 行下标 0 对应第 1 行；Near 兵 1、王 3，Far 兵 -1、王 -3，空格和不可用格为 0。
    pub fn serialize(&self) -> CanonicalBoard {
        let mut matrix = [[0i8; BOARD_SIZE as usize]; BOARD_SIZE as usize];
        for piece in self.squares.iter().flatten() {
            let row = (piece.square.row() - 1) as usize;
            let col = (piece.square.col() - 1) as usize;
            matrix[row][col] = piece.canonical_value();
        }
        matrix
    }

    /// 检查棋盘不变量
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (index, slot) in self.squares.iter().enumerate() {
            let Some(piece) = slot else { continue };
            let stored = Square::from_index(index);
            if piece.square != stored {
                return Err(InvariantViolation::OccupancyMismatch {
                    stored,
                    claimed: piece.square,
                });
            }
            if !stored.is_playable() {
                return Err(InvariantViolation::UnusableSquare { square: stored });
            }
        }
        for team in [Team::Near, Team::Far] {
            let count = self.count(team);
            if count > PIECES_PER_TEAM {
                return Err(InvariantViolation::TooManyPieces { team, count });
            }
        }
        Ok(())
    }
}
