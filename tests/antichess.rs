/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::PieceKind;
use newt::{
    is_quiet, quiescent_search, Antichess, EndgameKind, Engine, EngineConfig, EvalWeights,
    Evaluator, IllegalMove, Rules, Score, Setup, FEN_STARTPOS,
};

/// Positions where the side to move has at least one capture.
const NOISY_FENS: &[&str] = &[
    "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
    "rnbqkbnr/ppp1pppp/8/3p4/2P1P3/8/PP1P1PPP/RNBQKBNR b KQkq - 0 2",
    "4k3/8/8/3p4/8/8/3Q4/4K3 w - - 0 1",
    "r3k3/8/8/8/8/8/8/R3K3 w - - 0 1",
    "4k3/8/8/8/8/8/3q4/4K3 w - - 0 1",
];

/// Positions where the side to move has no captures.
const QUIET_FENS: &[&str] = &[
    FEN_STARTPOS,
    "rnbqkbnr/pppppppp/8/8/8/2N5/PPPPPPPP/R1BQKBNR b KQkq - 1 1",
    "4k3/3p4/8/8/8/8/4P3/4K3 w - - 0 1",
    "8/8/3k4/8/8/8/8/R3K3 w - - 0 1",
];

fn engine() -> Engine {
    Engine::new(EngineConfig {
        seed: Some(0),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn forced_capture_invariant() {
    for fen in NOISY_FENS {
        let pos = Antichess::from_fen(fen).unwrap();
        assert!(pos.has_capture(), "{fen}");

        let moves = pos.legal_moves();
        assert!(!moves.is_empty(), "{fen}");
        assert!(moves.iter().all(|&mv| pos.is_capture(mv)), "{fen}");

        // Every chess move that isn't a capture is rejected by the variant
        for mv in pos.rules().legal_moves() {
            assert_eq!(pos.is_legal(mv), pos.is_capture(mv), "{fen}: {mv}");
        }
    }
}

#[test]
fn no_capture_fallback() {
    for fen in QUIET_FENS {
        let pos = Antichess::from_fen(fen).unwrap();
        assert!(!pos.has_capture(), "{fen}");
        assert_eq!(pos.legal_moves(), pos.rules().legal_moves(), "{fen}");
    }
}

#[test]
fn quiescence_is_static_eval_when_quiet() {
    let weights = EvalWeights::default();

    for fen in QUIET_FENS {
        let pos = Antichess::from_fen(fen).unwrap();
        assert!(is_quiet(&pos), "{fen}");

        let mut nodes = 0;
        let q = quiescent_search(&pos, -Score::INF, Score::INF, weights, &mut nodes);
        assert_eq!(q, Evaluator::new(&pos, weights).eval(), "{fen}");
    }
}

#[test]
fn first_move_is_the_opening() {
    let mut engine = engine();
    let pos = Antichess::from_fen(FEN_STARTPOS).unwrap();
    assert_eq!(engine.choose_move(&pos).unwrap(), "b1c3");
}

#[test]
fn lone_rook_mates_from_two_square_box() {
    let mut engine = Engine::new(EngineConfig {
        opening: None,
        seed: Some(0),
        ..Default::default()
    })
    .unwrap();
    let pos = Antichess::from_fen("8/8/8/8/8/1R6/8/k1K5 w - - 0 1").unwrap();
    assert_eq!(EndgameKind::classify(&pos), Some(EndgameKind::OneRook));

    let mv = engine.choose_move(&pos).unwrap();
    assert_eq!(mv, "b3a3");
    assert!(pos.with_move_made(mv).is_checkmate());
}

#[test]
fn capture_is_played_over_anything_else() {
    // Rxd8 mates, which leaves Black without moves and hands them the game. Rd2 would not.
    let pos = Antichess::from_fen("3b3k/6pp/8/8/8/8/8/K2R4 w - - 0 1").unwrap();
    let capture = pos.rules().parse_move("d1d8").unwrap();
    let quiet = pos.rules().parse_move("d1d2").unwrap();
    assert!(Rules::legal_moves(pos.rules()).contains(&quiet));
    assert_eq!(pos.legal_moves(), vec![capture]);

    // Both from White's point of view
    let weights = EvalWeights::default();
    let after_capture = -Evaluator::new(&pos.with_move_made(capture), weights).eval();
    let after_quiet = -Evaluator::new(&pos.with_move_made(quiet), weights).eval();
    assert_eq!(after_capture, -Score::WIN);
    assert!(after_quiet > after_capture);

    let mut engine = engine();
    let mv = engine.choose_move(&pos).unwrap();
    assert!(pos.is_capture(mv));
    assert_eq!(mv, capture);
}

#[test]
fn illegal_moves_are_never_applied() {
    let mut pos =
        Antichess::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
            .unwrap();
    let before = pos.to_fen();

    assert!(matches!(
        pos.make_move_uci("g1f3"),
        Err(IllegalMove::CaptureRequired(_))
    ));
    assert!(matches!(
        pos.make_move_uci("e4e6"),
        Err(IllegalMove::NotLegal(_)) | Err(IllegalMove::Unparsable { .. })
    ));
    assert!(matches!(
        pos.make_move_uci("hello"),
        Err(IllegalMove::Unparsable { .. })
    ));
    assert_eq!(pos.to_fen(), before);

    assert!(pos.make_move_uci("e4d5").is_ok());
    assert_ne!(pos.to_fen(), before);
}

#[test]
fn endgame_confinement_never_loosens() {
    let mut engine = Engine::new(EngineConfig {
        opening: None,
        seed: Some(11),
        ..Default::default()
    })
    .unwrap();

    for (fen, kind) in [
        ("8/8/3k4/8/8/8/8/R3K3 w - - 0 1", PieceKind::Rook),
        ("8/8/8/3k4/8/2R5/8/4K3 w - - 0 1", PieceKind::Rook),
        ("7k/8/8/8/4Q3/2K5/8/8 w - - 0 1", PieceKind::Queen),
        ("8/8/8/3k4/8/8/2Q5/4K3 w - - 0 1", PieceKind::Queen),
    ] {
        let pos = Antichess::from_fen(fen).unwrap();
        let mv = engine.choose_move(&pos).unwrap();
        let child = pos.with_move_made(mv);
        if child.is_checkmate() {
            continue;
        }

        let us = pos.side_to_move();
        let before = Setup::of(&pos, us, kind).unwrap();
        let after = Setup::of(&child, us, kind).unwrap();
        assert!(after.area() <= before.area(), "{fen}: {mv}");
    }
}
