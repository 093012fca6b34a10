//! English draughts AI Engine
//!
//! 英式跳棋 AI 引擎 - 走法生成、连吃规则与 minimax 搜索，支持 FEN 输入输出

pub mod ai;
pub mod board;
pub mod capture;
pub mod error;
pub mod eval;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod test_positions;
pub mod types;

pub use ai::{
    AIConfig, AIStrategy, DrawPolicy, MinimaxAI, ScoredMove, SearchOutcome, SearchStats,
};
pub use board::{Board, Piece};
pub use capture::StepOutcome;
pub use error::{EvalError, FenError, InvariantViolation, MoveError, SearchError};
pub use eval::{
    evaluator_from_name, perspective, reverse, BoardMetrics, CanonicalBoard, Evaluator,
    MaterialEvaluator, MetricsEvaluator, AVAILABLE_EVALUATORS,
};
pub use fen::{parse_fen, to_fen};
pub use game::Game;
pub use movegen::get_legal_moves_from_fen;
pub use types::{Difficulty, GameResult, Move, Rank, Square, Team};
