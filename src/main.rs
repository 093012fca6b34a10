//! English draughts AI CLI
//!
//! 命令行界面，用于测试 AI，也可以作为界面层的后端
//!
//! 支持两种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 通信

use checkers_ai::{
    evaluator_from_name, get_legal_moves_from_fen, perspective, AIConfig, Board, BoardMetrics,
    Difficulty, GameResult, MetricsEvaluator, MinimaxAI, Move, Team,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "checkers-ai")]
#[command(about = "English draughts AI Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取合法走法
    Moves {
        /// FEN 字符串
        #[arg(long)]
        fen: String,
    },

    /// 选择最佳走法
    Best {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// 难度 (easy, medium, hard)
        #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// 搜索深度，覆盖难度
        #[arg(long)]
        depth: Option<u32>,

        /// 评估器 (metrics, material)
        #[arg(long, default_value = "metrics")]
        evaluator: String,

        /// 关闭 Alpha-Beta 剪枝
        #[arg(long)]
        no_prune: bool,

        /// 返回的走法数量
        #[arg(long, default_value = "1")]
        n: usize,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 评估局面分数（走棋方视角）
    Eval {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// 评估器 (metrics, material)
        #[arg(long, default_value = "metrics")]
        evaluator: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 引擎自我对弈
    Play {
        /// 难度 (easy, medium, hard)
        #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,

        /// 起始局面，默认为初始局面
        #[arg(long)]
        fen: Option<String>,

        /// 最多走多少个回合
        #[arg(long, default_value = "200")]
        max_turns: usize,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server,
}

#[derive(Serialize, Deserialize)]
struct MoveResult {
    #[serde(rename = "move")]
    mv: String,
    score: f64,
}

#[derive(Serialize, Deserialize)]
struct MovesResponse {
    moves: Vec<MoveResult>,
    total: usize,
    nodes: u64,
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    evaluator: Option<String>,
    #[serde(default)]
    n: Option<usize>,
    #[serde(default, rename = "move")]
    mv: Option<String>,
    /// 求和时引擎一方，默认为不在走棋的一方
    #[serde(default)]
    team: Option<Team>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<MoveResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    // eval 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<BoardMetrics>,
    // apply 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captured: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation: Option<Vec<i8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<GameResult>,
    // draw 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted: Option<bool>,
}

impl ServerResponse {
    fn success_moves(moves: Vec<MoveResult>, depth: u32, nodes: u64, elapsed_ms: f64) -> Self {
        Self {
            ok: true,
            moves: Some(moves),
            depth: Some(depth),
            nodes: Some(nodes),
            elapsed_ms: Some(elapsed_ms),
            ..Default::default()
        }
    }

    fn success_legal_moves(legal_moves: Vec<String>) -> Self {
        Self {
            ok: true,
            legal_moves: Some(legal_moves),
            ..Default::default()
        }
    }

    fn success_eval(eval_score: f64, team: Team, metrics: Option<BoardMetrics>) -> Self {
        Self {
            ok: true,
            eval: Some(eval_score),
            team: Some(team),
            metrics,
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn exit_with_error(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

/// 根据难度、深度和评估器名称创建引擎
fn build_ai(
    difficulty: Difficulty,
    depth: Option<u32>,
    evaluator: &str,
    alpha_beta: bool,
) -> Result<MinimaxAI, String> {
    let config = AIConfig {
        depth: depth.unwrap_or_else(|| difficulty.max_depth()),
        alpha_beta,
        ..AIConfig::default()
    };
    Ok(MinimaxAI::with_evaluator(&config, evaluator_from_name(evaluator)?))
}

/// 搜索并返回评分走法和节点数
fn do_best(ai: &MinimaxAI, fen: &str, n: usize) -> Result<(Vec<MoveResult>, u64), String> {
    let board = Board::from_fen(fen).map_err(|e| e.to_string())?;
    let outcome = ai.search(&board).map_err(|e| e.to_string())?;
    let moves = outcome
        .moves
        .into_iter()
        .take(n)
        .map(|sm| MoveResult {
            mv: sm.mv.to_string(),
            score: sm.score,
        })
        .collect();
    Ok((moves, outcome.stats.nodes))
}

/// 走棋方视角的评估，特征评估时附带特征向量
fn do_eval(fen: &str, evaluator: &str) -> Result<(f64, Team, Option<BoardMetrics>), String> {
    let board = Board::from_fen(fen).map_err(|e| e.to_string())?;
    let team = board.turn();
    let ai = build_ai(Difficulty::default(), None, evaluator, true)?;
    let score = ai
        .evaluate_position(&board, team)
        .map_err(|e| e.to_string())?;
    let metrics = if evaluator == "metrics" {
        let matrix = perspective(&board, team);
        Some(MetricsEvaluator.metrics(&matrix).map_err(|e| e.to_string())?)
    } else {
        None
    };
    Ok((score, team, metrics))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves { fen } => match get_legal_moves_from_fen(&fen) {
            Ok(moves) => {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
            Err(e) => exit_with_error(e),
        },

        Commands::Best {
            fen,
            difficulty,
            depth,
            evaluator,
            no_prune,
            n,
            json,
        } => {
            let ai = build_ai(difficulty, depth, &evaluator, !no_prune)
                .unwrap_or_else(|e| exit_with_error(e));

            let start = Instant::now();
            let (moves, nodes) = do_best(&ai, &fen, n).unwrap_or_else(|e| exit_with_error(e));
            let elapsed = start.elapsed().as_secs_f64();

            if json {
                let response = MovesResponse {
                    total: moves.len(),
                    moves,
                    nodes,
                };
                print_json(&response, true);
                eprintln!(
                    "Stats: depth={}, nodes={}, time={:.3}s",
                    ai.config().depth,
                    nodes,
                    elapsed
                );
            } else {
                println!("Best moves (depth={}):", ai.config().depth);
                for m in moves {
                    println!("  {} (score: {:.2})", m.mv, m.score);
                }
                println!("\nStats: nodes={}, time={:.3}s", nodes, elapsed);
            }
        }

        Commands::Eval {
            fen,
            evaluator,
            json,
        } => {
            let (score, team, metrics) =
                do_eval(&fen, &evaluator).unwrap_or_else(|e| exit_with_error(e));
            if json {
                print_json(&ServerResponse::success_eval(score, team, metrics), true);
            } else {
                println!("Eval ({} to move): {:.2}", team, score);
                if let Some(m) = metrics {
                    println!("  {:?}", m);
                }
            }
        }

        Commands::Play {
            difficulty,
            fen,
            max_turns,
        } => {
            let mut board = match fen {
                Some(fen) => Board::from_fen(&fen).unwrap_or_else(|e| exit_with_error(e)),
                None => Board::new(),
            };
            let ai = MinimaxAI::new(&AIConfig::from_difficulty(difficulty));
            self_play(&ai, &mut board, max_turns);
        }

        Commands::Server => {
            run_server();
        }
    }
}

/// 引擎自我对弈，每回合打印走法和局面
fn self_play(ai: &MinimaxAI, board: &mut Board, max_turns: usize) {
    println!("{}", board.to_fen());
    for turn in 1..=max_turns {
        let result = board.game_result();
        if result != GameResult::Ongoing {
            println!("Result: {:?}", result);
            return;
        }
        let team = board.turn();
        match ai.play_turn(board) {
            Ok(played) => {
                let line: Vec<String> = played.iter().map(Move::to_string).collect();
                println!("{:>3}. {}: {}", turn, team, line.join(" "));
                println!("     {}", board.to_fen());
            }
            Err(e) => exit_with_error(e),
        }
    }
    println!("Result: no decision after {} turns", max_turns);
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = ServerResponse::error(&format!("Invalid JSON: {}", e));
                print_json(&response, false);
                let _ = stdout.flush();
                continue;
            }
        };

        // 处理命令
        let response = match request.cmd.as_str() {
            "best" => handle_best_request(&request),
            "moves" => handle_moves_request(&request),
            "apply" => handle_apply_request(&request),
            "eval" => handle_eval_request(&request),
            "draw" => handle_draw_request(&request),
            "quit" => break,
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        };

        // 返回响应
        print_json(&response, false);
        let _ = stdout.flush();
    }
}

/// 处理 best 命令
fn handle_best_request(request: &ServerRequest) -> ServerResponse {
    let difficulty = request.difficulty.unwrap_or_default();
    let evaluator = request.evaluator.as_deref().unwrap_or("metrics");
    let n = request.n.unwrap_or(5);

    let ai = match build_ai(difficulty, request.depth, evaluator, true) {
        Ok(ai) => ai,
        Err(e) => return ServerResponse::error(&e),
    };

    let start = Instant::now();
    match do_best(&ai, &request.fen, n) {
        Ok((moves, nodes)) => {
            let elapsed = start.elapsed().as_secs_f64();
            ServerResponse::success_moves(moves, ai.config().depth, nodes, elapsed * 1000.0)
        }
        Err(e) => ServerResponse::error(&format!("AI error: {}", e)),
    }
}

/// 处理 moves 命令
fn handle_moves_request(request: &ServerRequest) -> ServerResponse {
    match get_legal_moves_from_fen(&request.fen) {
        Ok(moves) => ServerResponse::success_legal_moves(moves),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}

/// 处理 apply 命令：执行一步（连吃中的一跳），返回新局面
fn handle_apply_request(request: &ServerRequest) -> ServerResponse {
    let mut board = match Board::from_fen(&request.fen) {
        Ok(board) => board,
        Err(e) => return ServerResponse::error(&format!("Invalid FEN: {}", e)),
    };
    let Some(mv) = request.mv.as_deref().and_then(Move::parse) else {
        return ServerResponse::error("Missing or invalid move");
    };

    match board.play(mv.from, mv.to) {
        Ok(outcome) => ServerResponse {
            ok: true,
            fen: Some(board.to_fen()),
            captured: outcome.captured.map(|sq| sq.number()),
            continuation: Some(outcome.continuation.iter().map(|sq| sq.number()).collect()),
            result: Some(board.game_result()),
            ..Default::default()
        },
        Err(e) => ServerResponse::error(&format!("Rejected: {}", e)),
    }
}

/// 处理 eval 命令（静态评估）
fn handle_eval_request(request: &ServerRequest) -> ServerResponse {
    let evaluator = request.evaluator.as_deref().unwrap_or("metrics");
    match do_eval(&request.fen, evaluator) {
        Ok((score, team, metrics)) => ServerResponse::success_eval(score, team, metrics),
        Err(e) => ServerResponse::error(&e),
    }
}

/// 处理 draw 命令：走棋方求和，引擎决定是否接受
fn handle_draw_request(request: &ServerRequest) -> ServerResponse {
    let board = match Board::from_fen(&request.fen) {
        Ok(board) => board,
        Err(e) => return ServerResponse::error(&format!("Invalid FEN: {}", e)),
    };
    let engine = request.team.unwrap_or_else(|| board.turn().opposite());
    let ai = MinimaxAI::new(&AIConfig::default());
    match ai.offer_draw(&board, engine) {
        Ok(accepted) => ServerResponse {
            ok: true,
            accepted: Some(accepted),
            team: Some(engine),
            ..Default::default()
        },
        Err(e) => ServerResponse::error(&format!("Evaluator error: {}", e)),
    }
}
