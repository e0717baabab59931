//! Effect dispatcher tests - resolution branches and obstacle damage rules

use cubematch::core::effects::{color_clear, double_white, final_bonus, resolve_group};
use cubematch::core::matching::find_best_group;
use cubematch::core::{Board, PieceKind, SimpleRng};
use cubematch::hooks::{SessionHooks, TargetLedger};
use cubematch::types::{CubeColor, ObstacleKind, TargetKey};

fn cube(color: CubeColor) -> PieceKind {
    PieceKind::Colored { color }
}

fn stone() -> PieceKind {
    PieceKind::Obstacle {
        kind: ObstacleKind::Stone,
        hit_points: 2,
    }
}

/// Headless hooks plus a handle to read remaining target counts.
fn hooks_with(targets: &[(TargetKey, u32)]) -> (SessionHooks, TargetLedger) {
    let ledger = TargetLedger::new(targets.iter().copied());
    let hooks = SessionHooks::new(
        Box::new(cubematch::hooks::NullPresenter),
        Box::new(ledger.clone()),
        Box::new(cubematch::hooks::NullOutcome),
    );
    (hooks, ledger)
}

#[test]
fn test_plain_three_destroys_and_decrements() {
    let mut board = Board::new(4, 2);
    for x in 0..3 {
        board.spawn(cube(CubeColor::Red), x, 0);
    }
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Color(CubeColor::Red), 5)]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    assert_eq!(outcome.destroyed, 3);
    assert_eq!(board.piece_count(), 0);
    assert_eq!(ledger.remaining(TargetKey::Color(CubeColor::Red)), 2);
}

#[test]
fn test_five_group_spawns_white_at_center() {
    let mut board = Board::new(5, 1);
    for x in 0..5 {
        board.spawn(cube(CubeColor::Blue), x, 0);
    }
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    assert_eq!(outcome.destroyed, 5);
    // Odd run of 5 centers at index 2.
    let white = board.piece_at(2, 0).expect("white spawned at center");
    assert!(white.is_white());
    assert_eq!(outcome.spawned, Some(white.id));
    assert_eq!(board.piece_count(), 1);
}

#[test]
fn test_four_group_promotes_flagged_cube() {
    let mut board = Board::new(4, 1);
    let mut ids = Vec::new();
    for x in 0..4 {
        ids.push(board.spawn(cube(CubeColor::Black), x, 0));
    }
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Color(CubeColor::Black), 10)]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, Some(ids[3]));

    // Three destroyed, the flagged cube promoted in place.
    assert_eq!(outcome.destroyed, 3);
    let promoted = board.piece(ids[3]).expect("promoted cube survives");
    assert_eq!(
        promoted.special_kind(),
        Some(cubematch::types::SpecialKind::AreaClear)
    );
    assert_eq!((promoted.x, promoted.y), (3, 0));
    assert_eq!(ledger.remaining(TargetKey::Color(CubeColor::Black)), 7);
}

#[test]
fn test_four_group_without_flag_destroys_all() {
    let mut board = Board::new(4, 1);
    for x in 0..4 {
        board.spawn(cube(CubeColor::Black), x, 0);
    }
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);
    assert_eq!(outcome.destroyed, 4);
    assert_eq!(board.piece_count(), 0);
}

#[test]
fn test_row_clear_special_hits_row_obstacle_once() {
    // Row 0: red special, stone (2 HP), four colored cubes. The special is
    // matched through a vertical run of reds in column 0.
    let mut board = Board::new(6, 3);
    let special = board.spawn(cube(CubeColor::Red), 0, 0);
    board.piece_mut(special).unwrap().promote_to_special();
    board.spawn(cube(CubeColor::Red), 0, 1);
    board.spawn(cube(CubeColor::Red), 0, 2);
    let stone_id = board.spawn(stone(), 1, 0);
    for x in 2..6 {
        board.spawn(cube(CubeColor::Blue), x, 0);
    }
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    assert!(group.has_special);
    resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    // Stone survives with 1 HP: the sweep hit and the adjacency pass are
    // deduplicated within the resolution step.
    let stone_piece = board.piece(stone_id).expect("stone survives on 1 HP");
    assert_eq!(stone_piece.hit_points(), 1);
    // The four colored cubes and the whole red group are gone.
    for x in 2..6 {
        assert!(board.is_empty(x, 0));
    }
    assert!(board.piece(special).is_none());
    assert_eq!(board.piece_count(), 1);
}

#[test]
fn test_obstacle_adjacent_on_two_sides_damaged_once() {
    // L-shaped 5-group of red wrapping a stone at (1, 1): the stone
    // touches group members on two sides but takes exactly one hit.
    let mut board = Board::new(4, 4);
    for x in 0..3 {
        board.spawn(cube(CubeColor::Red), x, 0);
    }
    board.spawn(cube(CubeColor::Red), 0, 1);
    board.spawn(cube(CubeColor::Red), 0, 2);
    let stone_id = board.spawn(stone(), 1, 1);
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    assert_eq!(group.size(), 5);
    resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    let stone_piece = board.piece(stone_id).expect("stone survives");
    assert_eq!(stone_piece.hit_points(), 1);
}

#[test]
fn test_white_board_clear_empties_everything() {
    let mut board = Board::new(4, 4);
    for x in 0..3 {
        board.spawn(PieceKind::White, x, 0);
    }
    board.spawn(cube(CubeColor::Red), 3, 0);
    for x in 0..4 {
        board.spawn(cube(if x % 2 == 0 { CubeColor::Blue } else { CubeColor::Black }), x, 1);
    }
    board.spawn(stone(), 0, 2);
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Obstacle(ObstacleKind::Stone), 1)]);
    let mut rng = SimpleRng::new(1);

    let group = find_best_group(&mut board).unwrap();
    assert!(group.is_white_clear());
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    assert!(outcome.board_cleared);
    assert_eq!(board.piece_count(), 0);
    // Obstacles are cleared outright regardless of hit points.
    assert_eq!(ledger.remaining(TargetKey::Obstacle(ObstacleKind::Stone)), 0);
}

#[test]
fn test_zap_special_stays_within_budget() {
    // Yellow special matched vertically; the rest of the board is a
    // matchless spread of zap candidates.
    let mut board = Board::new(5, 5);
    let special = board.spawn(cube(CubeColor::Yellow), 0, 0);
    board.piece_mut(special).unwrap().promote_to_special();
    board.spawn(cube(CubeColor::Yellow), 0, 1);
    board.spawn(cube(CubeColor::Yellow), 0, 2);
    for y in 0..5 {
        for x in 1..5 {
            let color = if (x + y) % 2 == 0 {
                CubeColor::Red
            } else {
                CubeColor::Blue
            };
            board.spawn(cube(color), x, y);
        }
    }
    let before = board.piece_count();
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(7);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    // The group's 3 cubes always die; the zap adds at most 5 more.
    assert!(outcome.destroyed >= 3);
    assert!(outcome.destroyed <= 3 + cubematch::types::ZAP_BUDGET);
    assert_eq!(board.piece_count(), before - outcome.destroyed as usize);
}

#[test]
fn test_zap_destroys_obstacles_outright_at_full_cost() {
    // Yellow special column; the only zap candidates are 2 HP stones in
    // columns 2-4 (column 1 and the cells above the group stay empty so
    // the adjacency pass has nothing to damage). The budget of 5 affords
    // exactly two stones at 2 points each; the leftover point covers none.
    let mut board = Board::new(5, 5);
    let special = board.spawn(cube(CubeColor::Yellow), 0, 0);
    board.piece_mut(special).unwrap().promote_to_special();
    board.spawn(cube(CubeColor::Yellow), 0, 1);
    board.spawn(cube(CubeColor::Yellow), 0, 2);
    for x in 2..5 {
        for y in 0..5 {
            board.spawn(stone(), x, y);
        }
    }
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Obstacle(ObstacleKind::Stone), 15)]);
    let mut rng = SimpleRng::new(5);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    // Three group cubes plus two stones, each paid for and despawned whole.
    assert_eq!(outcome.destroyed, 5);
    assert_eq!(ledger.remaining(TargetKey::Obstacle(ObstacleKind::Stone)), 13);
    let survivors: Vec<_> = board.pieces().filter(|p| p.is_obstacle()).collect();
    assert_eq!(survivors.len(), 13);
    // No stone is ever left partially damaged by the zap.
    assert!(survivors.iter().all(|p| p.hit_points() == 2));
}

#[test]
fn test_zap_skips_obstacle_costing_more_than_budget() {
    let mut board = Board::new(4, 4);
    let special = board.spawn(cube(CubeColor::Yellow), 0, 0);
    board.piece_mut(special).unwrap().promote_to_special();
    board.spawn(cube(CubeColor::Yellow), 0, 1);
    board.spawn(cube(CubeColor::Yellow), 0, 2);
    // The only candidate needs more points than the whole zap budget.
    let tough = board.spawn(
        PieceKind::Obstacle {
            kind: ObstacleKind::Stone,
            hit_points: cubematch::types::ZAP_BUDGET as u8 + 1,
        },
        2,
        2,
    );
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Obstacle(ObstacleKind::Stone), 1)]);
    let mut rng = SimpleRng::new(9);

    let group = find_best_group(&mut board).unwrap();
    let outcome = resolve_group(&mut board, &mut hooks, &mut rng, &group, None);

    // The search gives up after its attempt bound; the obstacle is skipped
    // entirely, never partially paid for.
    assert_eq!(outcome.destroyed, 3);
    let stone_piece = board.piece(tough).expect("stone untouched");
    assert_eq!(
        stone_piece.hit_points(),
        cubematch::types::ZAP_BUDGET as u8 + 1
    );
    assert_eq!(ledger.remaining(TargetKey::Obstacle(ObstacleKind::Stone)), 1);
}

#[test]
fn test_color_clear_destroys_target_color_and_white() {
    let mut board = Board::new(4, 2);
    let white = board.spawn(PieceKind::White, 0, 0);
    board.spawn(cube(CubeColor::Red), 1, 0);
    board.spawn(cube(CubeColor::Red), 3, 1);
    board.spawn(cube(CubeColor::Blue), 2, 0);
    let (mut hooks, ledger) = hooks_with(&[(TargetKey::Color(CubeColor::Red), 2)]);

    let destroyed = color_clear(&mut board, &mut hooks, white, CubeColor::Red);

    assert_eq!(destroyed, 3); // two reds plus the white itself
    assert!(board.piece(white).is_none());
    assert_eq!(board.piece_count(), 1); // the blue survives
    assert_eq!(ledger.remaining(TargetKey::Color(CubeColor::Red)), 0);
}

#[test]
fn test_double_white_wipes_rows_and_columns() {
    // Whites at (1, 1) and (2, 1): the union is row 1 plus columns 1 and 2.
    let mut board = Board::new(4, 4);
    let a = board.spawn(PieceKind::White, 1, 1);
    let b = board.spawn(PieceKind::White, 2, 1);
    for x in [0, 3] {
        board.spawn(cube(CubeColor::Red), x, 1); // row victims
    }
    for y in [0, 2, 3] {
        board.spawn(cube(CubeColor::Blue), 1, y); // column 1 victims
        board.spawn(cube(CubeColor::Black), 2, y); // column 2 victims
    }
    let survivor = board.spawn(cube(CubeColor::Yellow), 0, 3);

    let (mut hooks, _) = hooks_with(&[]);
    let destroyed = double_white(&mut board, &mut hooks, a, b);

    // 2 row victims + 6 column victims + both originators.
    assert_eq!(destroyed, 10);
    assert!(board.piece(a).is_none());
    assert!(board.piece(b).is_none());
    assert!(board.piece(survivor).is_some());
    assert_eq!(board.piece_count(), 1);
}

#[test]
fn test_final_bonus_pulls_more_colors_with_more_whites() {
    // Five whites sit in the 3-color tier; with one cube of each color on
    // the board, exactly three of the four colors get pulled in.
    let mut board = Board::new(4, 4);
    for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2), (3, 3)] {
        board.spawn(PieceKind::White, x, y);
    }
    board.spawn(cube(CubeColor::Red), 1, 1);
    board.spawn(cube(CubeColor::Yellow), 3, 1);
    board.spawn(cube(CubeColor::Blue), 1, 3);
    board.spawn(cube(CubeColor::Black), 3, 0);
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(6);

    let destroyed = final_bonus(&mut board, &mut hooks, &mut rng);

    // All five whites plus one cube per chosen color.
    assert_eq!(destroyed, 8);
    assert!(board.pieces().all(|p| !p.is_white()));
    assert_eq!(board.piece_count(), 1);
}

#[test]
fn test_final_bonus_consumes_all_whites() {
    let mut board = Board::new(4, 4);
    board.spawn(PieceKind::White, 0, 0);
    board.spawn(PieceKind::White, 3, 3);
    for x in 0..4 {
        board.spawn(
            cube(if x % 2 == 0 {
                CubeColor::Red
            } else {
                CubeColor::Blue
            }),
            x,
            2,
        );
    }
    let (mut hooks, _) = hooks_with(&[]);
    let mut rng = SimpleRng::new(3);

    let destroyed = final_bonus(&mut board, &mut hooks, &mut rng);

    // Both whites always go; two whites pull exactly one color.
    assert!(destroyed >= 2);
    assert!(board.pieces().all(|p| !p.is_white()));
    // Exactly one of the two colors was pulled off the board.
    let reds = board
        .pieces()
        .filter(|p| p.match_color() == Some(CubeColor::Red))
        .count();
    let blues = board
        .pieces()
        .filter(|p| p.match_color() == Some(CubeColor::Blue))
        .count();
    assert!(
        (reds == 0) != (blues == 0),
        "exactly one color cleared, got reds={reds} blues={blues}"
    );
}
