//! 走法生成
//!
//! 兵只能向前斜走一格，王四个斜向都可以走；吃子为斜向跳过相邻的对方棋子。
//! 只要本方任意棋子有子可吃，本方所有普通走法都不合法。

use crate::board::{Board, Piece};
use crate::error::FenError;
use crate::types::{GameResult, Move, Square, Team, BOARD_SIZE};

/// 四个斜向 (行增量, 列增量)，编号偏移分别为 +7、+9、-9、-7
const DIAGONALS: [(i8, i8); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

/// 沿斜向走 `distance` 格后的格子，越过左右边界或上下边界返回 None
#[inline]
fn step(square: Square, (dr, dc): (i8, i8), distance: i8) -> Option<Square> {
    let col = square.col() + dc * distance;
    if !(1..=BOARD_SIZE).contains(&col) {
        return None;
    }
    square.offset((BOARD_SIZE * dr + dc) * distance)
}

/// 棋子可以走的斜向：兵只有前进方向，王四个方向
fn directions(piece: &Piece) -> impl Iterator<Item = (i8, i8)> {
    let forward = piece.team.forward();
    let is_king = piece.is_king();
    DIAGONALS
        .into_iter()
        .filter(move |(dr, _)| is_king || *dr == forward)
}

/// 普通走法的候选目标格（未考虑占用）
pub fn simple_move_candidates(piece: &Piece) -> Vec<Square> {
    directions(piece)
        .filter_map(|dir| step(piece.square, dir, 1))
        .collect()
}

/// 吃子跳跃的候选落点（编号 ±14/±18，未考虑占用和方向）
pub fn jump_candidates(piece: &Piece) -> Vec<Square> {
    DIAGONALS
        .into_iter()
        .filter_map(|dir| step(piece.square, dir, 2))
        .collect()
}

/// 兵只能吃前方的子，王不限方向
#[inline]
fn is_legal_capture(piece: &Piece, opponent: &Piece) -> bool {
    piece.is_king() || (opponent.square.row() - piece.square.row()) * piece.team.forward() > 0
}

impl Board {
    /// 棋子的普通走法目标格（不考虑强制吃子）
    pub fn legal_simple_moves(&self, square: Square) -> Vec<Square> {
        let Some(piece) = self.get_piece(square) else {
            return Vec::new();
        };
        simple_move_candidates(piece)
            .into_iter()
            .filter(|&to| self.is_free(to))
            .collect()
    }

    /// 跳到 `to` 是否为合法吃子
    fn is_legal_jump(&self, piece: &Piece, to: Square) -> bool {
        if !self.is_free(to) {
            return false;
        }
        match self.get_piece(piece.square.midpoint(to)) {
            Some(opponent) => opponent.team != piece.team && is_legal_capture(piece, opponent),
            None => false,
        }
    }

    /// 棋子一次吃子后可以落到的格子
    pub fn legal_jumps(&self, square: Square) -> Vec<Square> {
        let Some(piece) = self.get_piece(square) else {
            return Vec::new();
        };
        jump_candidates(piece)
            .into_iter()
            .filter(|&to| self.is_legal_jump(piece, to))
            .collect()
    }

    /// 计算吃子落点并刷新棋子的 `can_capture` 标记
    pub fn refresh_jumps(&mut self, square: Square) -> Vec<Square> {
        let jumps = self.legal_jumps(square);
        if let Some(piece) = self.get_piece_mut(square) {
            piece.can_capture = !jumps.is_empty();
        }
        jumps
    }

    /// 刷新所有棋子的 `can_capture` 标记
    ///
    /// 只有走棋方的棋子可能为 true；对方棋子一律清除。
    /// 走棋方的强制吃子判断直接读取这些标记。
    pub fn refresh_capture_flags(&mut self) {
        let turn = self.turn();
        for square in Square::playable() {
            match self.get_piece(square).map(|p| p.team) {
                Some(team) if team == turn => {
                    self.refresh_jumps(square);
                }
                Some(_) => {
                    if let Some(piece) = self.get_piece_mut(square) {
                        piece.can_capture = false;
                    }
                }
                None => {}
            }
        }
    }

    /// 可能有子可吃的棋子：走棋方按标记筛选，对方逐个计算
    fn capture_candidates(&self, team: Team) -> impl Iterator<Item = Square> + '_ {
        let flagged = team == self.turn();
        self.pieces(team)
            .filter(move |p| !flagged || p.can_capture)
            .map(|p| p.square)
    }

    /// 某方有吃子走法的棋子及其落点
    pub fn pieces_with_jumps(&self, team: Team) -> Vec<(Square, Vec<Square>)> {
        self.capture_candidates(team)
            .filter_map(|sq| {
                let jumps = self.legal_jumps(sq);
                (!jumps.is_empty()).then_some((sq, jumps))
            })
            .collect()
    }

    /// 某方有普通走法的棋子及其目标格
    pub fn pieces_with_moves(&self, team: Team) -> Vec<(Square, Vec<Square>)> {
        self.squares_of(team)
            .into_iter()
            .filter_map(|sq| {
                let moves = self.legal_simple_moves(sq);
                (!moves.is_empty()).then_some((sq, moves))
            })
            .collect()
    }

    /// 某方是否有子可吃，走棋方直接读取 `can_capture` 标记
    pub fn team_has_jumps(&self, team: Team) -> bool {
        if team == self.turn() {
            return self.pieces(team).any(|p| p.can_capture);
        }
        self.pieces(team)
            .any(|p| !self.legal_jumps(p.square).is_empty())
    }

    /// 棋子当前可以走到的格子（已考虑强制吃子和连吃），用于界面高亮
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        let Some(piece) = self.get_piece(square) else {
            return Vec::new();
        };
        match self.chain() {
            Some(active) if active == square => self.legal_jumps(square),
            Some(_) => Vec::new(),
            None if self.team_has_jumps(piece.team) => self.legal_jumps(square),
            None => self.legal_simple_moves(square),
        }
    }

    /// 某方所有合法走法
    ///
    /// 连吃进行中只返回该棋子的吃子；否则有子可吃时只返回吃子走法。
    /// 顺序固定：按起点编号升序，同一起点按方向表顺序。
    pub fn legal_moves(&self, team: Team) -> Vec<Move> {
        if let Some(active) = self.chain() {
            if self.get_piece(active).is_some_and(|p| p.team == team) {
                return self
                    .legal_jumps(active)
                    .into_iter()
                    .map(|to| Move::capture(active, to))
                    .collect();
            }
        }

        let captures: Vec<Move> = self
            .pieces_with_jumps(team)
            .into_iter()
            .flat_map(|(from, jumps)| jumps.into_iter().map(move |to| Move::capture(from, to)))
            .collect();
        if !captures.is_empty() {
            return captures;
        }

        self.pieces_with_moves(team)
            .into_iter()
            .flat_map(|(from, moves)| moves.into_iter().map(move |to| Move::simple(from, to)))
            .collect()
    }

    /// 某方是否已输：没有棋子，或所有棋子既不能走也不能吃
    pub fn is_team_defeated(&self, team: Team) -> bool {
        !self.squares_of(team).into_iter().any(|sq| {
            !self.legal_simple_moves(sq).is_empty() || !self.legal_jumps(sq).is_empty()
        })
    }

    /// 判断游戏结果
    pub fn game_result(&self) -> GameResult {
        let turn = self.turn();
        if self.count(turn.opposite()) == 0 {
            return GameResult::win_for(turn);
        }
        if self.is_team_defeated(turn) {
            return GameResult::win_for(turn.opposite());
        }
        GameResult::Ongoing
    }
}

/// 从 FEN 获取当前走棋方的合法走法
pub fn get_legal_moves_from_fen(fen: &str) -> Result<Vec<String>, FenError> {
    let board = Board::from_fen(fen)?;
    Ok(board
        .legal_moves(board.turn())
        .iter()
        .map(|mv| mv.to_string())
        .collect())
}
