//! 走法执行与连吃
//!
//! `apply_move` / `apply_capture` 校验后修改棋盘；吃子后同一棋子若还能吃，
//! 回合不交换，只能由这枚棋子继续吃，直到无子可吃为止。升变立即结束回合。

use log::{debug, error};

use crate::board::Board;
use crate::error::{InvariantViolation, MoveError};
use crate::types::{Move, Square};

/// 一步走法执行后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub mv: Move,
    /// 被吃棋子所在格
    pub captured: Option<Square>,
    pub promoted: bool,
    /// 同一棋子必须继续吃的落点，为空表示回合结束
    pub continuation: Vec<Square>,
}

impl StepOutcome {
    #[inline]
    pub fn chain_continues(&self) -> bool {
        !self.continuation.is_empty()
    }
}

impl Board {
    /// 执行走法（不校验规则，只校验棋盘一致性）
    ///
    /// 搜索直接在副本上调用；对外入口是 `apply_move` / `apply_capture`。
    pub(crate) fn execute(&mut self, mv: Move) -> Result<StepOutcome, InvariantViolation> {
        let Some(piece) = self.get_piece(mv.from).copied() else {
            let violation = InvariantViolation::MissingPiece { square: mv.from };
            error!("{} while playing {} on {}", violation, mv, self.to_fen());
            return Err(violation);
        };

        let captured = match mv.captured_square() {
            Some(mid) => {
                if !self.get_piece(mid).is_some_and(|p| p.team != piece.team) {
                    let violation = InvariantViolation::CaptureWithoutOpponent {
                        from: mv.from,
                        to: mv.to,
                    };
                    error!("{} on {}", violation, self.to_fen());
                    return Err(violation);
                }
                self.remove_piece(mid);
                Some(mid)
            }
            None => None,
        };

        let promoted = self.relocate(mv.from, mv.to);

        let continuation = if mv.is_capture && !promoted {
            self.legal_jumps(mv.to)
        } else {
            Vec::new()
        };

        // 两个分支都会刷新吃子标记
        if continuation.is_empty() {
            self.set_chain(None);
            self.set_turn(piece.team.opposite());
        } else {
            self.set_chain(Some(mv.to));
            self.refresh_capture_flags();
        }

        Ok(StepOutcome {
            mv,
            captured,
            promoted,
            continuation,
        })
    }

    /// 起点必须是当前走棋方的棋子，连吃中只能是连吃的那枚
    fn validate_origin(&self, from: Square) -> Result<(), MoveError> {
        let piece = self
            .get_piece(from)
            .ok_or(MoveError::NoPiece { square: from })?;
        if piece.team != self.turn() {
            return Err(MoveError::WrongTeam {
                square: from,
                team: self.turn(),
            });
        }
        match self.chain() {
            Some(active) if active != from => Err(MoveError::ChainInProgress { square: active }),
            _ => Ok(()),
        }
    }

    /// 执行普通走法
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<StepOutcome, MoveError> {
        self.validate_origin(from)?;
        if self.chain().is_some() || self.team_has_jumps(self.turn()) {
            return Err(MoveError::MandatoryCapture { from, to });
        }
        if !self.legal_simple_moves(from).contains(&to) {
            return Err(MoveError::IllegalMove { from, to });
        }
        Ok(self.execute(Move::simple(from, to))?)
    }

    /// 执行一次吃子，返回结果中包含被吃格和后续必须继续吃的落点
    pub fn apply_capture(&mut self, from: Square, to: Square) -> Result<StepOutcome, MoveError> {
        self.validate_origin(from)?;
        if !self.legal_jumps(from).contains(&to) {
            return Err(MoveError::IllegalMove { from, to });
        }
        let outcome = self.execute(Move::capture(from, to))?;
        if outcome.chain_continues() {
            debug!("capture {} continues: {:?}", outcome.mv, outcome.continuation);
        }
        Ok(outcome)
    }

    /// 按目标格自动区分吃子和普通走法
    pub fn play(&mut self, from: Square, to: Square) -> Result<StepOutcome, MoveError> {
        if self.legal_jumps(from).contains(&to) {
            self.apply_capture(from, to)
        } else {
            self.apply_move(from, to)
        }
    }

    /// 从 `from` 吃到 `first` 后一直连吃到底
    ///
    /// 每一跳之后由 `choose` 在同一棋子的后续落点中挑选下一跳。
    pub fn play_capture_chain<F, E>(
        &mut self,
        from: Square,
        first: Square,
        mut choose: F,
    ) -> Result<Vec<Move>, E>
    where
        F: FnMut(&Board, Square, &[Square]) -> Result<Square, E>,
        E: From<MoveError>,
    {
        let mut moves = Vec::new();
        let (mut at, mut to) = (from, first);
        loop {
            let outcome = self.apply_capture(at, to)?;
            moves.push(outcome.mv);
            if !outcome.chain_continues() {
                return Ok(moves);
            }
            at = outcome.mv.to;
            to = choose(self, at, &outcome.continuation)?;
        }
    }
}
