use rmaze_lib::{
    search::Branches, steps, CellFlags, Direction, Maze, Phase, Position, Solver, SolverKind,
};
use std::collections::HashSet;
use std::error::Error;

/// Adds walls on every east and south edge except the listed open ones,
/// turning the open-grid default into an explicit maze.
fn carve(maze: &Maze, open: &[(isize, isize, Direction)]) {
    for pos in maze.positions() {
        for dir in [Direction::East, Direction::South] {
            let next = pos.step(dir);
            if next.row >= maze.height() || next.col >= maze.width() {
                continue;
            }
            if !open.contains(&(pos.row, pos.col, dir)) {
                maze.set_wall(pos, dir);
            }
        }
    }
}

fn path_cells(maze: &Maze) -> HashSet<Position> {
    maze.positions()
        .filter(|&pos| maze.has(pos, CellFlags::ON_PATH))
        .collect()
}

/// Checks that the marked path is a connected region containing both
/// ends, with every consecutive hop crossing an open edge.
fn assert_path_connects(maze: &Maze) {
    let path = path_cells(maze);
    assert!(path.contains(&maze.start()), "start is not on the path");
    assert!(path.contains(&maze.end()), "end is not on the path");
    let mut seen = HashSet::new();
    let mut frontier = vec![maze.start()];
    seen.insert(maze.start());
    while let Some(pos) = frontier.pop() {
        for dir in Direction::ALL {
            let next = pos.step(dir);
            if maze.can_move(pos, dir) && path.contains(&next) && seen.insert(next) {
                frontier.push(next);
            }
        }
    }
    assert_eq!(seen, path, "path is not connected");
}

#[test]
fn wall_queries_are_symmetric() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(4, 4)?;
    maze.set_wall(Position::new(1, 1), Direction::East);
    maze.set_wall(Position::new(2, 2), Direction::North);
    maze.set_wall(Position::new(0, 3), Direction::West);
    maze.set_wall(Position::new(3, 0), Direction::South);
    for pos in maze.positions() {
        for dir in Direction::ALL {
            assert_eq!(
                maze.can_move(pos, dir),
                maze.can_move(pos.step(dir), dir.opposite()),
                "asymmetric at {:?} {:?}",
                pos,
                dir
            );
        }
    }
    Ok(())
}

#[test]
fn junctions_need_more_than_two_exits() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 3)?;
    assert!(maze.is_junction(Position::new(1, 1)));
    assert!(!maze.is_junction(Position::new(0, 0)));
    assert!(maze.is_junction(Position::new(0, 1)));
    Ok(())
}

#[test]
fn reset_keeps_only_walls() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 3)?;
    maze.set_wall(Position::new(1, 1), Direction::East);
    let pos = Position::new(1, 1);
    maze.mark(pos, CellFlags::VISITED | CellFlags::ON_PATH | CellFlags::PRUNED);
    maze.set_visit_order(pos, 7);
    maze.set_owner(pos, 3);
    maze.reset();
    for pos in maze.positions() {
        assert_eq!(maze.flags(pos) & !CellFlags::WALLS, CellFlags::empty());
        assert_eq!(maze.visit_order(pos), -1);
        assert_eq!(maze.owner(pos), None);
    }
    assert!(maze.has(Position::new(1, 1), CellFlags::EAST_WALL));
    Ok(())
}

#[test]
fn marking_is_idempotent() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(2, 2)?;
    let pos = Position::new(0, 0);
    maze.mark(pos, CellFlags::ON_PATH);
    let once = maze.flags(pos);
    maze.mark(pos, CellFlags::ON_PATH);
    assert_eq!(maze.flags(pos), once);
    Ok(())
}

#[test]
fn loader_decodes_packed_walls() -> Result<(), Box<dyn Error>> {
    // 16x2, so each row fills exactly one body word.
    let mut data = Vec::new();
    data.extend_from_slice(&16i32.to_le_bytes());
    data.extend_from_slice(&2i32.to_le_bytes());
    data.extend_from_slice(&1i32.to_le_bytes());
    let word0: u32 = 0b01 | 0b10 << 10; // east wall at (0,0), south wall at (0,5)
    let word1: u32 = 0b11 << 30; // both walls at (1,15)
    data.extend_from_slice(&word0.to_le_bytes());
    data.extend_from_slice(&word1.to_le_bytes());

    let maze = Maze::from_bytes(&data)?;
    assert_eq!(maze.width(), 16);
    assert_eq!(maze.height(), 2);
    assert!(maze.has(Position::new(0, 0), CellFlags::EAST_WALL));
    assert!(!maze.has(Position::new(0, 0), CellFlags::SOUTH_WALL));
    assert!(maze.has(Position::new(0, 5), CellFlags::SOUTH_WALL));
    assert!(maze.has(Position::new(1, 15), CellFlags::EAST_WALL | CellFlags::SOUTH_WALL));
    assert!(!maze.can_move(Position::new(0, 0), Direction::East));
    assert!(!maze.can_move(Position::new(0, 5), Direction::South));
    assert!(maze.can_move(Position::new(0, 1), Direction::South));
    Ok(())
}

#[test]
fn loader_rejects_bad_input() -> Result<(), Box<dyn Error>> {
    assert!(matches!(
        Maze::from_bytes(&[0; 8]),
        Err(rmaze_lib::Error::TruncatedHeader(8))
    ));

    let mut negative = Vec::new();
    negative.extend_from_slice(&(-3i32).to_le_bytes());
    negative.extend_from_slice(&4i32.to_le_bytes());
    negative.extend_from_slice(&1i32.to_le_bytes());
    assert!(matches!(
        Maze::from_bytes(&negative),
        Err(rmaze_lib::Error::NonPositiveSize(-3, 4))
    ));

    let mut short = Vec::new();
    short.extend_from_slice(&16i32.to_le_bytes());
    short.extend_from_slice(&2i32.to_le_bytes());
    short.extend_from_slice(&1i32.to_le_bytes());
    short.extend_from_slice(&[0; 4]);
    assert!(matches!(
        Maze::from_bytes(&short),
        Err(rmaze_lib::Error::TruncatedBody { need: 8, got: 4 })
    ));
    Ok(())
}

#[test]
fn bfs_open_grid() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 3)?;
    let mut solver = SolverKind::Bfs.solver(&maze);
    let tokens: Vec<_> = steps(&mut *solver).collect();
    assert_eq!(tokens.last(), Some(&Phase::Finished));

    // Tokens run searching, then backtracking, then the terminal.
    let search_end = tokens.iter().position(|&t| t != Phase::Searching).unwrap();
    assert!(tokens[search_end..tokens.len() - 1]
        .iter()
        .all(|&t| t == Phase::Backtracking));

    assert_eq!(maze.visit_order(maze.start()), 1);
    assert_eq!(maze.visit_order(maze.end()), 5);
    let expected: HashSet<_> = [(0, 1), (1, 1), (2, 1)]
        .iter()
        .map(|&(r, c)| Position::new(r, c))
        .collect();
    assert_eq!(path_cells(&maze), expected);
    Ok(())
}

#[test]
fn bfs_corridor_visit_order_is_cell_distance() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(1, 6)?;
    let mut solver = SolverKind::Bfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    assert_eq!(maze.visit_order(maze.end()), 6);
    assert_eq!(path_cells(&maze).len(), 6);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn bfs_resolves_identically_after_reset() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(5, 5)?;
    maze.set_wall(Position::new(1, 2), Direction::South);
    maze.set_wall(Position::new(2, 1), Direction::East);

    let mut solver = SolverKind::Bfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    let first = path_cells(&maze);
    let first_order = maze.visit_order(maze.end());
    drop(solver);

    maze.reset();
    let mut solver = SolverKind::Bfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    assert_eq!(path_cells(&maze), first);
    assert_eq!(maze.visit_order(maze.end()), first_order);
    Ok(())
}

#[test]
fn dfs_solves_a_corridor() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(1, 5)?;
    let mut solver = SolverKind::Dfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    assert_eq!(path_cells(&maze).len(), 5);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn dfs_erases_the_grey_trail() -> Result<(), Box<dyn Error>> {
    // A 5x5 maze whose only junction (1,2) hangs two dead ends off the
    // route south of the start; the real path runs along the east side.
    let maze = Maze::new(5, 5)?;
    carve(
        &maze,
        &[
            // main path
            (0, 2, Direction::East),
            (0, 3, Direction::East),
            (0, 4, Direction::South),
            (1, 4, Direction::South),
            (2, 4, Direction::South),
            (3, 4, Direction::South),
            (4, 3, Direction::East),
            (4, 2, Direction::East),
            // dead-end trap
            (0, 2, Direction::South),
            (1, 2, Direction::South),
            (1, 2, Direction::East),
        ],
    );
    let mut solver = SolverKind::Dfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);

    // The abandoned branch keeps neither its grey trail nor stack bits.
    for &(row, col) in &[(1, 2), (2, 2), (1, 3)] {
        let pos = Position::new(row, col);
        assert!(!maze.has(pos, CellFlags::VISITED), "{:?} still grey", pos);
        assert!(!maze.has(pos, CellFlags::ON_STACK), "{:?} on stack", pos);
        assert!(!maze.has(pos, CellFlags::ON_PATH), "{:?} on path", pos);
    }
    assert!(maze.has(Position::new(1, 2), CellFlags::DEAD_JUNCTION));
    assert!(!maze.has(Position::new(2, 2), CellFlags::DEAD_JUNCTION));

    let expected: HashSet<_> = [
        (0, 2),
        (0, 3),
        (0, 4),
        (1, 4),
        (2, 4),
        (3, 4),
        (4, 4),
        (4, 3),
        (4, 2),
    ]
    .iter()
    .map(|&(r, c)| Position::new(r, c))
    .collect();
    assert_eq!(path_cells(&maze), expected);
    Ok(())
}

#[test]
fn race_meets_in_a_corridor() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(1, 9)?;
    let mut solver = SolverKind::Race.solver(&maze);
    let tokens: Vec<_> = steps(&mut *solver).collect();
    assert_eq!(tokens.last(), Some(&Phase::Finished));
    assert_eq!(path_cells(&maze).len(), 9);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn race_splices_both_halves() -> Result<(), Box<dyn Error>> {
    // Two equal-length branches between start and end; the teams meet
    // in one of them and the splice must cover it end to end.
    let maze = Maze::new(3, 5)?;
    carve(
        &maze,
        &[
            (0, 0, Direction::East),
            (0, 1, Direction::East),
            (4, 0, Direction::East),
            (4, 1, Direction::East),
            (0, 0, Direction::South),
            (1, 0, Direction::South),
            (2, 0, Direction::South),
            (3, 0, Direction::South),
            (0, 2, Direction::South),
            (1, 2, Direction::South),
            (2, 2, Direction::South),
            (3, 2, Direction::South),
        ],
    );
    let mut solver = SolverKind::Race.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    assert_eq!(path_cells(&maze).len(), 7);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn race_team_bits_match_owners_mid_search() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 5)?;
    carve(
        &maze,
        &[
            (0, 0, Direction::East),
            (0, 1, Direction::East),
            (4, 0, Direction::East),
            (4, 1, Direction::East),
            (0, 0, Direction::South),
            (1, 0, Direction::South),
            (2, 0, Direction::South),
            (3, 0, Direction::South),
            (0, 2, Direction::South),
            (1, 2, Direction::South),
            (2, 2, Direction::South),
            (3, 2, Direction::South),
        ],
    );
    let mut solver = SolverKind::Race.solver(&maze);
    assert_eq!(solver.run(Some(3)), Phase::Searching);
    for pos in maze.positions() {
        let flags = maze.flags(pos);
        if flags.contains(CellFlags::VISITED_FWD) && !flags.contains(CellFlags::VISITED_REV) {
            assert!(matches!(maze.owner(pos), Some(0..=2)), "{:?}", pos);
        }
        if flags.contains(CellFlags::VISITED_REV) && !flags.contains(CellFlags::VISITED_FWD) {
            assert!(matches!(maze.owner(pos), Some(3..=5)), "{:?}", pos);
        }
    }
    Ok(())
}

/// A 3x16 maze: the path runs straight down the middle column. A
/// three-cell dead-end corridor hangs off the start along the east
/// wall, the west column's lower half is a row of one-cell stubs that
/// slow the reverse search down, and its upper half is an isolated
/// corridor whose pruning crosses a band boundary.
fn skeleton_maze() -> Result<Maze, Box<dyn Error>> {
    let maze = Maze::new(3, 16)?;
    let mut open = vec![
        (0, 1, Direction::East),
        (0, 2, Direction::South),
        (1, 2, Direction::South),
    ];
    for row in 0..15 {
        open.push((row, 1, Direction::South));
    }
    for row in 0..7 {
        open.push((row, 0, Direction::South));
    }
    for row in 8..16 {
        open.push((row, 0, Direction::East));
    }
    carve(&maze, &open);
    Ok(maze)
}

#[test]
fn prune_floods_dead_end_corridor() -> Result<(), Box<dyn Error>> {
    let maze = skeleton_maze()?;
    let mut solver = SolverKind::Prune.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);

    for row in 0..3 {
        let pos = Position::new(row, 2);
        assert!(maze.has(pos, CellFlags::PRUNED), "{:?} not pruned", pos);
        assert!(
            !maze.has(pos, CellFlags::VISITED_FWD),
            "walker entered {:?}",
            pos
        );
    }
    let expected: HashSet<_> = (0..16).map(|row| Position::new(row, 1)).collect();
    assert_eq!(path_cells(&maze), expected);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn prune_path_cells_carry_parent_hints() -> Result<(), Box<dyn Error>> {
    let maze = skeleton_maze()?;
    let mut solver = SolverKind::Prune.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    // Every path cell past the walker's trail was reached by the
    // reverse search and so carries a parent hint.
    for pos in path_cells(&maze) {
        if pos == maze.start() || pos == maze.end() || maze.has(pos, CellFlags::VISITED_FWD) {
            continue;
        }
        assert!(
            maze.flags(pos).intersects(CellFlags::PARENT_MASK),
            "{:?} has no parent hint",
            pos
        );
    }
    Ok(())
}

#[test]
fn prune_handles_fewer_rows_than_bands() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 2)?;
    let mut solver = SolverKind::Prune.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    assert_path_connects(&maze);
    Ok(())
}

#[test]
fn single_cell_maze_finishes_immediately() -> Result<(), Box<dyn Error>> {
    for kind in [
        SolverKind::Bfs,
        SolverKind::Dfs,
        SolverKind::Race,
        SolverKind::Prune,
    ] {
        let maze = Maze::new(1, 1)?;
        let mut solver = kind.solver(&maze);
        assert_eq!(solver.run(None), Phase::Finished, "{}", kind);
        assert_eq!(
            path_cells(&maze),
            [Position::new(0, 0)].iter().copied().collect(),
            "{}",
            kind
        );
    }
    Ok(())
}

#[test]
fn walled_off_start_has_no_solution() -> Result<(), Box<dyn Error>> {
    for kind in [
        SolverKind::Bfs,
        SolverKind::Dfs,
        SolverKind::Race,
        SolverKind::Prune,
    ] {
        let maze = Maze::new(1, 2)?;
        maze.set_wall(maze.start(), Direction::South);
        let mut solver = kind.solver(&maze);
        assert_eq!(solver.run(Some(100)), Phase::NoSolution, "{}", kind);
    }
    Ok(())
}

#[test]
fn unsolvable_tree_maze_terminates() -> Result<(), Box<dyn Error>> {
    // The start is boxed in; the rest of the grid is a tree, so every
    // walker exhausts its stack in bounded time.
    let open = [
        (0, 0, Direction::South),
        (1, 0, Direction::East),
        (1, 1, Direction::East),
        (0, 2, Direction::South),
        (1, 1, Direction::South),
        (2, 0, Direction::East),
        (2, 1, Direction::East),
    ];
    for kind in [
        SolverKind::Bfs,
        SolverKind::Dfs,
        SolverKind::Race,
        SolverKind::Prune,
    ] {
        let maze = Maze::new(3, 3)?;
        carve(&maze, &open);
        let mut solver = kind.solver(&maze);
        assert_eq!(solver.run(Some(500)), Phase::NoSolution, "{}", kind);
    }
    Ok(())
}

#[test]
fn terminal_phase_repeats() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(2, 2)?;
    let mut solver = SolverKind::Bfs.solver(&maze);
    let tokens: Vec<_> = steps(&mut *solver).collect();
    assert_eq!(
        tokens.iter().filter(|t| t.is_terminal()).count(),
        1,
        "exactly one terminal token"
    );
    assert_eq!(solver.step(), Phase::Finished);
    assert_eq!(solver.step(), Phase::Finished);
    Ok(())
}

#[test]
fn branches_rotate_through_slots() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 3)?;
    let center = Position::new(1, 1);
    let mut branches = Branches::new(&maze, center, 0);
    assert_eq!(branches.len(), 4);
    assert_eq!(branches.next(), Some(Direction::East));
    assert_eq!(branches.next(), Some(Direction::South));
    assert_eq!(branches.next(), Some(Direction::West));
    assert_eq!(branches.next(), Some(Direction::North));
    assert_eq!(branches.next(), Some(Direction::East));

    branches.remove(Direction::South);
    assert_eq!(branches.len(), 3);
    assert_eq!(branches.next(), Some(Direction::West));
    Ok(())
}

#[test]
fn branches_claim_and_retire() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(3, 3)?;
    let center = Position::new(1, 1);
    maze.mark(center, CellFlags::dead_branch(Direction::East));

    let mut branches = Branches::new(&maze, center, 0);
    // The dead east branch is dropped on the way; south gets claimed.
    assert_eq!(branches.next_mt(&maze, center), Some(Direction::South));
    assert_eq!(branches.len(), 3);
    assert!(maze.has(center, CellFlags::occupied(Direction::South)));

    // Retiring the claimed branch marks it dead on the cell.
    assert_eq!(branches.pop_current(&maze, center), Some(Direction::South));
    assert!(maze.has(center, CellFlags::dead_branch(Direction::South)));
    assert_eq!(branches.len(), 2);

    // A rival claim on every remaining branch still yields a fallback.
    maze.mark(
        center,
        CellFlags::occupied(Direction::West) | CellFlags::occupied(Direction::North),
    );
    assert!(branches.next_mt(&maze, center).is_some());
    Ok(())
}

#[test]
fn plaintext_shows_walls_and_path() -> Result<(), Box<dyn Error>> {
    let maze = Maze::new(2, 2)?;
    maze.set_wall(Position::new(0, 0), Direction::East);
    let mut solver = SolverKind::Bfs.solver(&maze);
    assert_eq!(solver.run(None), Phase::Finished);
    let text = maze.plaintext();
    assert!(text.contains('S'));
    assert!(text.contains('E'));
    assert!(text.contains('|'));
    Ok(())
}
