//! Minimax AI 策略
//!
//! 在棋盘副本上递归推演。吃子后同一棋子还能继续吃时，递归保持深度和
//! 极大/极小角色不变；连吃结束才进入下一层并交换角色。

use log::{debug, trace};

use super::{sort_and_truncate, AIConfig, AIStrategy, ScoredMove};
use crate::board::Board;
use crate::error::{MoveError, SearchError};
use crate::eval::{perspective, Evaluator, MetricsEvaluator};
use crate::types::{Move, Square, Team};

/// 单次搜索的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// 访问的节点数
    pub nodes: u64,
    /// 剪枝次数
    pub cutoffs: u64,
}

/// 搜索结果：根节点所有走法按分数降序排列
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub moves: Vec<ScoredMove>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&ScoredMove> {
        self.moves.first()
    }
}

/// Minimax AI - 可选 Alpha-Beta 剪枝
pub struct MinimaxAI {
    config: AIConfig,
    evaluator: Box<dyn Evaluator>,
}

impl MinimaxAI {
    /// 使用默认的特征评估
    pub fn new(config: &AIConfig) -> Self {
        MinimaxAI::with_evaluator(config, Box::new(MetricsEvaluator))
    }

    pub fn with_evaluator(config: &AIConfig, evaluator: Box<dyn Evaluator>) -> Self {
        MinimaxAI {
            config: config.clone(),
            evaluator,
        }
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.config.depth = depth;
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    /// 从 `team` 的视角评估局面
    pub fn evaluate_position(&self, board: &Board, team: Team) -> Result<f64, SearchError> {
        Ok(self.evaluator.evaluate(&perspective(board, team))?)
    }

    /// 搜索当前走棋方的所有走法
    ///
    /// 每个根走法使用完整窗口单独搜索，所以剪枝与否得到的分数完全相同。
    pub fn search(&self, board: &Board) -> Result<SearchOutcome, SearchError> {
        let root = board.turn();
        let mut stats = SearchStats::default();
        let mut moves = Vec::new();

        for mv in board.legal_moves(root) {
            let mut child = board.clone();
            let outcome = child.execute(mv)?;
            // 根走法开始连吃时，在第 0 层继续由本方选择
            let (depth, maximizing) = if outcome.chain_continues() {
                (0, true)
            } else {
                (1, false)
            };
            let score = self.minimax(
                &mut stats,
                root,
                &child,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                maximizing,
            )?;
            trace!("{} {}: {:.2}", root, mv, score);
            moves.push(ScoredMove { mv, score });
        }

        sort_and_truncate(&mut moves, usize::MAX);
        Ok(SearchOutcome { moves, stats })
    }

    /// 递归搜索，返回 `root` 视角的分数
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &self,
        stats: &mut SearchStats,
        root: Team,
        board: &Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> Result<f64, SearchError> {
        stats.nodes += 1;

        if depth >= self.config.depth
            || board.is_team_defeated(Team::Near)
            || board.is_team_defeated(Team::Far)
        {
            return self.evaluate_position(board, root);
        }

        // 连吃中只有该棋子的吃子，否则受强制吃子约束
        let moves = board.legal_moves(board.turn());
        if moves.is_empty() {
            return self.evaluate_position(board, root);
        }

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for mv in moves {
            let mut child = board.clone();
            let outcome = child.execute(mv)?;
            let score = if outcome.chain_continues() {
                self.minimax(stats, root, &child, depth, alpha, beta, maximizing)?
            } else {
                self.minimax(stats, root, &child, depth + 1, alpha, beta, !maximizing)?
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if self.config.alpha_beta && beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }

        Ok(best)
    }

    /// 替当前走棋方走完一整个回合，返回实际执行的走法
    ///
    /// 吃子时每一跳之后重新搜索，从同一棋子的后续落点中选分数最高的继续吃。
    pub fn play_turn(&self, board: &mut Board) -> Result<Vec<Move>, SearchError> {
        let team = board.turn();
        let Some(best) = self.select_best_move(board)? else {
            debug!("{} has no legal move", team);
            return Ok(Vec::new());
        };
        debug!("{} plays {}", team, best);

        if !best.is_capture {
            board.apply_move(best.from, best.to)?;
            return Ok(vec![best]);
        }

        let choose = |position: &Board, at: Square, _: &[Square]| -> Result<Square, SearchError> {
            let next = self
                .select_best_move(position)?
                .ok_or(MoveError::ChainInProgress { square: at })?;
            debug!("{} continues {}", team, next);
            Ok(next.to)
        };
        board.play_capture_chain(best.from, best.to, choose)
    }

    /// 对方求和时引擎（`engine` 一方）是否接受
    pub fn offer_draw(&self, board: &Board, engine: Team) -> Result<bool, SearchError> {
        let engine_eval = self.evaluate_position(board, engine)?;
        let human_eval = self.evaluate_position(board, engine.opposite())?;
        let accepted = self.config.draw.accepts(board, engine_eval, human_eval);
        debug!(
            "draw offer: engine {:.2}, opponent {:.2}, accepted {}",
            engine_eval, human_eval, accepted
        );
        Ok(accepted)
    }
}

impl AIStrategy for MinimaxAI {
    fn select_moves(&self, board: &Board, n: usize) -> Result<Vec<ScoredMove>, SearchError> {
        let mut scored = self.search(board)?.moves;
        sort_and_truncate(&mut scored, n);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::eval::{CanonicalBoard, MaterialEvaluator};
    use crate::test_positions::{random_position, CHAIN_3, END_2, END_3, START};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(n: i8) -> Square {
        Square::new(n).unwrap()
    }

    fn config(depth: u32, alpha_beta: bool) -> AIConfig {
        AIConfig {
            depth,
            alpha_beta,
            ..AIConfig::default()
        }
    }

    /// Near 的 9 号兵可以连吃两枚，22 号兵只能吃一枚
    const TWO_CAPTURES: &str = "6m1/8/8/3m4/6m1/1m3M2/M7/8 n";

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn name(&self) -> &str {
            "failing"
        }

        fn evaluate(&self, _board: &CanonicalBoard) -> Result<f64, EvalError> {
            Err(EvalError::MalformedBoard {
                row: 0,
                col: 0,
                value: 9,
            })
        }
    }

    #[test]
    fn test_depth_one_prefers_longer_capture() {
        let board = Board::from_fen(TWO_CAPTURES).unwrap();
        let ai = MinimaxAI::with_evaluator(&config(1, true), Box::new(MaterialEvaluator));
        let outcome = ai.search(&board).unwrap();

        assert_eq!(outcome.moves.len(), 2);
        let best = outcome.best().unwrap();
        assert_eq!(best.mv, Move::capture(sq(9), sq(27)));
        assert_eq!(best.score, 0.0);
        assert_eq!(outcome.moves[1].mv, Move::capture(sq(22), sq(40)));
        assert_eq!(outcome.moves[1].score, -1.0);
    }

    #[test]
    fn test_play_turn_finishes_chain() {
        let mut board = Board::from_fen(TWO_CAPTURES).unwrap();
        let ai = MinimaxAI::new(&config(1, true));
        let played = ai.play_turn(&mut board).unwrap();

        assert_eq!(
            played,
            vec![Move::capture(sq(9), sq(27)), Move::capture(sq(27), sq(45))]
        );
        assert_eq!(board.count(Team::Far), 2);
        assert_eq!(board.turn(), Team::Far);
        assert_eq!(board.chain(), None);
    }

    #[test]
    fn test_play_turn_takes_longer_branch() {
        let mut board = Board::from_fen(CHAIN_3).unwrap();
        let ai = MinimaxAI::with_evaluator(&config(1, true), Box::new(MaterialEvaluator));

        // 分叉处重新搜索：20x34 还能再吃 43，优于到此为止的 20x38
        let mut fork = board.clone();
        fork.apply_capture(sq(2), sq(20)).unwrap();
        let outcome = ai.search(&fork).unwrap();
        assert_eq!(outcome.moves[0].mv, Move::capture(sq(20), sq(34)));
        assert_eq!(outcome.moves[1].mv, Move::capture(sq(20), sq(38)));
        assert!(outcome.moves[0].score > outcome.moves[1].score);

        let played = ai.play_turn(&mut board).unwrap();
        assert_eq!(
            played,
            vec![
                Move::capture(sq(2), sq(20)),
                Move::capture(sq(20), sq(34)),
                Move::capture(sq(34), sq(52)),
            ]
        );
        assert_eq!(board.squares_of(Team::Far), vec![sq(29), sq(63)]);
        assert_eq!(board.turn(), Team::Far);
    }

    #[test]
    fn test_play_turn_simple_move() {
        let mut board = Board::from_fen(START).unwrap();
        let ai = MinimaxAI::new(&config(2, true));
        let played = ai.play_turn(&mut board).unwrap();

        assert_eq!(played.len(), 1);
        assert!(!played[0].is_capture);
        assert_eq!(board.turn(), Team::Far);
        assert_eq!(board.count(Team::Near), 12);
    }

    #[test]
    fn test_play_turn_without_moves() {
        let mut board = Board::from_fen(END_2).unwrap();
        let before = board.clone();
        let ai = MinimaxAI::new(&AIConfig::default());
        assert_eq!(ai.play_turn(&mut board).unwrap(), Vec::new());
        assert_eq!(board, before);
    }

    #[test]
    fn test_far_scores_from_own_side() {
        // Far 的 27 号兵吃掉 Near 最后一枚棋子
        let board = Board::from_fen("8/8/8/8/2m5/1M6/8/8 f").unwrap();
        let ai = MinimaxAI::new(&config(3, true));
        let outcome = ai.search(&board).unwrap();
        let best = outcome.best().unwrap();
        assert_eq!(best.mv, Move::capture(sq(27), sq(9)));
        assert!(best.score > 100.0);
    }

    #[test]
    fn test_alpha_beta_matches_full_search() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..30 {
            let board = random_position(&mut rng, 6).unwrap();
            let pruned = MinimaxAI::new(&config(3, true)).search(&board).unwrap();
            let full = MinimaxAI::new(&config(3, false)).search(&board).unwrap();

            assert_eq!(pruned.moves, full.moves, "board {}", board.to_fen());
            assert!(pruned.stats.nodes <= full.stats.nodes);
            assert_eq!(full.stats.cutoffs, 0);
        }
    }

    #[test]
    fn test_alpha_beta_prunes_opening() {
        let board = Board::new();
        let pruned = MinimaxAI::new(&config(4, true)).search(&board).unwrap();
        let full = MinimaxAI::new(&config(4, false)).search(&board).unwrap();

        assert_eq!(pruned.best(), full.best());
        assert!(pruned.stats.cutoffs > 0);
        assert!(pruned.stats.nodes < full.stats.nodes);
    }

    #[test]
    fn test_search_is_deterministic() {
        let board = Board::new();
        let ai = MinimaxAI::new(&config(3, true));
        assert_eq!(ai.search(&board).unwrap(), ai.search(&board).unwrap());
    }

    #[test]
    fn test_evaluator_failure_propagates() {
        let board = Board::new();
        let ai = MinimaxAI::with_evaluator(&config(2, true), Box::new(FailingEvaluator));
        assert!(matches!(ai.search(&board), Err(SearchError::Eval(_))));
        assert!(ai.offer_draw(&board, Team::Far).is_err());
    }

    #[test]
    fn test_offer_draw() {
        let ai = MinimaxAI::new(&AIConfig::default());
        let endgame = Board::from_fen(END_3).unwrap();
        assert!(ai.offer_draw(&endgame, Team::Far).unwrap());
        assert!(!ai.offer_draw(&Board::new(), Team::Far).unwrap());

        let mut behind = Board::new();
        behind.remove_piece(sq(41));
        let material = MinimaxAI::with_evaluator(&AIConfig::default(), Box::new(MaterialEvaluator));
        assert!(material.offer_draw(&behind, Team::Far).unwrap());
        assert!(!material.offer_draw(&behind, Team::Near).unwrap());
    }
}
