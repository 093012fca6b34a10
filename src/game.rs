//! 对局
//!
//! 持有实际棋盘、人类一方和引擎。界面层通过 `try_move` 提交人类走法，
//! 走法不合法时返回 false 且棋盘不变。

use log::{debug, error, info};

use crate::ai::{AIConfig, MinimaxAI};
use crate::board::Board;
use crate::error::{MoveError, SearchError};
use crate::types::{Difficulty, GameResult, Move, Square, Team};

/// 人机对局
pub struct Game {
    board: Board,
    human: Team,
    difficulty: Difficulty,
    ai: MinimaxAI,
    history: Vec<Move>,
}

impl Game {
    /// 从初始局面开始，Near 先走
    pub fn new(human: Team, difficulty: Difficulty) -> Self {
        Game::from_board(Board::new(), human, difficulty)
    }

    /// 从指定局面开始
    pub fn from_board(board: Board, human: Team, difficulty: Difficulty) -> Self {
        let ai = MinimaxAI::new(&AIConfig::from_difficulty(difficulty));
        Game::with_ai(board, human, difficulty, ai)
    }

    /// 使用自定义引擎（例如换一个评估器）
    pub fn with_ai(board: Board, human: Team, difficulty: Difficulty, mut ai: MinimaxAI) -> Self {
        ai.set_depth(difficulty.max_depth());
        Game {
            board,
            human,
            difficulty,
            ai,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human(&self) -> Team {
        self.human
    }

    pub fn engine(&self) -> Team {
        self.human.opposite()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// 已执行的走法（连吃的每一跳单独记录）
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn is_human_turn(&self) -> bool {
        self.board.turn() == self.human
    }

    pub fn result(&self) -> GameResult {
        self.board.game_result()
    }

    /// 人类棋子当前可以走到的格子，用于界面高亮
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        match self.board.get_piece(square) {
            Some(piece) if piece.team == self.human && self.is_human_turn() => {
                self.board.legal_destinations(square)
            }
            _ => Vec::new(),
        }
    }

    /// 当前走棋方可以移动的棋子
    pub fn movable_pieces(&self) -> Vec<Square> {
        let mut pieces: Vec<Square> = self
            .board
            .legal_moves(self.board.turn())
            .into_iter()
            .map(|mv| mv.from)
            .collect();
        pieces.dedup();
        pieces
    }

    /// 提交人类走法，返回是否执行
    ///
    /// 吃子后还能继续吃时仍轮到人类，需要用同一棋子继续提交。
    pub fn try_move(&mut self, from: Square, to: Square) -> bool {
        if !self.is_human_turn() {
            debug!("Rejected {}-{}: not {}'s turn", from, to, self.human);
            return false;
        }
        if self.result() != GameResult::Ongoing {
            debug!("Rejected {}-{}: game is over", from, to);
            return false;
        }

        match self.board.play(from, to) {
            Ok(outcome) => {
                self.history.push(outcome.mv);
                true
            }
            Err(MoveError::Invariant(violation)) => {
                error!("{} after {}-{} on {}", violation, from, to, self.board.to_fen());
                false
            }
            Err(e) => {
                debug!("Rejected {}-{}: {}", from, to, e);
                false
            }
        }
    }

    /// 轮到引擎时走完整个回合
    pub fn engine_move(&mut self) -> Result<Vec<Move>, SearchError> {
        if self.is_human_turn() || self.result() != GameResult::Ongoing {
            return Ok(Vec::new());
        }
        let played = self.ai.play_turn(&mut self.board)?;
        self.history.extend_from_slice(&played);
        Ok(played)
    }

    /// 人类求和，返回引擎是否接受
    pub fn offer_draw(&self) -> Result<bool, SearchError> {
        self.ai.offer_draw(&self.board, self.engine())
    }

    /// 重新开始
    pub fn reset(&mut self) {
        info!("New game: human plays {}, difficulty {}", self.human, self.difficulty);
        self.board = Board::new();
        self.history.clear();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.ai.set_depth(difficulty.max_depth());
    }
}
