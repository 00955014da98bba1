use crate::grid::Grid;
use rand::Rng;

/// Gravity added per tick in the reference setup
pub const DEFAULT_GRAVITY: f64 = 0.1;

/// Velocity actually stored after a tick. Gravity is truncated here while the
/// fall target uses the untruncated value, so for gravity < 1 the stored
/// velocity never grows. Grains resting under gravity >= 1 keep gaining
/// velocity, so it saturates at `i32::MAX`.
#[inline]
fn integrate(velocity: i32, gravity: f64) -> i32 {
    velocity.saturating_add(gravity.floor() as i32)
}

/// Lowest row a grain could reach this tick, clamped to the grid
#[inline]
fn fall_target(row: usize, velocity: i32, gravity: f64, rows: usize) -> usize {
    let reach = (row as f64 + velocity as f64 + gravity).floor() as i64;
    reach.clamp(0, rows as i64 - 1) as usize
}

/// A landing cell must be empty now and not already taken by an earlier grain
/// this tick.
#[inline]
fn free(current: &Grid, next: &Grid, col: isize, row: usize) -> bool {
    current.within_cols(col)
        && current.is_empty(col as usize, row)
        && next.is_empty(col as usize, row)
}

/// Compute the next generation of `current` into `next`.
///
/// `next` is fully overwritten; `current` is only read. Grains are visited
/// column by column (col ascending, then row ascending) and the first grain to
/// claim an empty cell keeps it, so no grain is ever lost or duplicated.
///
/// Returns the number of grains that moved.
pub fn step<R: Rng>(current: &Grid, next: &mut Grid, gravity: f64, rng: &mut R) -> usize {
    assert_eq!(
        (current.cols(), current.rows()),
        (next.cols(), next.rows()),
        "double buffers must share dimensions"
    );
    next.clear();

    let rows = current.rows();
    let mut moved_count = 0;

    for i in 0..current.cols() {
        for j in 0..rows {
            let cell = current.get(i, j);
            if cell.is_empty() {
                continue;
            }

            let state = cell.color_code;
            let velocity = integrate(cell.velocity, gravity);
            let target = fall_target(j, cell.velocity, gravity, rows);
            let col = i as isize;
            let mut moved = false;

            // Farthest reachable row first, back toward the grain
            for y in (j + 1..=target).rev() {
                let direction: isize = if rng.gen::<f64>() < 0.5 { 1 } else { -1 };

                let landing = [col, col + direction, col - direction]
                    .into_iter()
                    .find(|&c| free(current, next, c, y));

                if let Some(c) = landing {
                    next.set(c as usize, y, state, velocity);
                    moved = true;
                    break;
                }
            }

            if moved {
                moved_count += 1;
            } else {
                next.set(i, j, state, velocity);
            }
        }
    }

    moved_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Step `grid` in place through a scratch buffer
    fn tick(grid: &mut Grid, gravity: f64, rng: &mut StdRng) -> usize {
        let mut next = Grid::new(grid.cols(), grid.rows());
        let moved = step(grid, &mut next, gravity, rng);
        std::mem::swap(grid, &mut next);
        moved
    }

    #[test]
    fn test_free_fall_one_row_per_tick() {
        let mut grid = Grid::new(20, 20);
        grid.set(10, 0, 200, 1);
        let mut rng = rng();

        for expected_row in 1..20 {
            assert_eq!(tick(&mut grid, DEFAULT_GRAVITY, &mut rng), 1);
            let cell = grid.get(10, expected_row);
            assert_eq!(cell.color_code, 200);
            assert_eq!(cell.velocity, 1);
            assert_eq!(grid.occupied_count(), 1);
        }

        // Resting on the floor, never overshooting
        for _ in 0..5 {
            assert_eq!(tick(&mut grid, DEFAULT_GRAVITY, &mut rng), 0);
            assert_eq!(grid.get(10, 19).color_code, 200);
        }
    }

    #[test]
    fn test_truncated_gravity_keeps_velocity() {
        let mut grid = Grid::new(3, 50);
        grid.set(1, 0, 10, 1);
        let mut rng = rng();
        for _ in 0..10 {
            tick(&mut grid, 0.9, &mut rng);
        }
        let (_, row, cell) = grid.occupied().next().unwrap();
        assert_eq!(cell.velocity, 1);
        // floor(row + 1 + 0.9) == row + 1
        assert_eq!(row, 10);
    }

    #[test]
    fn test_whole_gravity_accelerates() {
        let mut grid = Grid::new(3, 50);
        grid.set(1, 0, 10, 1);
        let mut rng = rng();

        tick(&mut grid, 1.0, &mut rng);
        assert_eq!(grid.get(1, 2).velocity, 2);
        tick(&mut grid, 1.0, &mut rng);
        assert_eq!(grid.get(1, 5).velocity, 3);
    }

    #[test]
    fn test_falls_short_when_farthest_row_is_full() {
        let mut grid = Grid::new(3, 10);
        for col in 0..3 {
            grid.set(col, 3, 1, 1);
        }
        grid.set(1, 0, 20, 3);

        for seed in 0..8 {
            let mut g = grid.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            tick(&mut g, DEFAULT_GRAVITY, &mut rng);
            assert_eq!(g.get(1, 2).color_code, 20);
            assert_eq!(g.get(1, 2).velocity, 3);
            assert!(g.is_empty(1, 0));
            assert_eq!(g.occupied_count(), 4);
        }
    }

    #[test]
    fn test_far_diagonal_beats_near_straight() {
        let mut grid = Grid::new(3, 4);
        grid.set(1, 3, 1, 1);
        grid.set(1, 0, 20, 3);

        for seed in 0..8 {
            let mut g = grid.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            tick(&mut g, DEFAULT_GRAVITY, &mut rng);
            let left = g.get(0, 3).color_code;
            let right = g.get(2, 3).color_code;
            assert!(left == 20 || right == 20);
            assert!(g.is_empty(1, 2));
            assert_eq!(g.get(1, 3).color_code, 1);
            assert_eq!(g.occupied_count(), 2);
        }
    }

    #[test]
    fn test_resting_velocity_saturates() {
        let mut grid = Grid::new(1, 2);
        grid.set(0, 1, 9, i32::MAX - 1);
        let mut rng = rng();

        for _ in 0..3 {
            assert_eq!(tick(&mut grid, 2.0, &mut rng), 0);
            assert_eq!(grid.get(0, 1).velocity, i32::MAX);
        }
    }

    #[test]
    fn test_slides_off_a_grain_below() {
        let mut grid = Grid::new(11, 10);
        grid.set(5, 9, 1, 1);
        grid.set(5, 8, 2, 1);
        let mut rng = rng();

        tick(&mut grid, DEFAULT_GRAVITY, &mut rng);

        assert_eq!(grid.get(5, 9).color_code, 1);
        assert!(grid.is_empty(5, 8));
        let left = grid.get(4, 9).color_code;
        let right = grid.get(6, 9).color_code;
        assert!(left == 2 || right == 2);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_wall_counts_as_occupied() {
        let mut grid = Grid::new(5, 10);
        grid.set(0, 9, 1, 1);
        grid.set(0, 8, 2, 1);

        for seed in 0..16 {
            let mut g = grid.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            tick(&mut g, DEFAULT_GRAVITY, &mut rng);
            assert_eq!(g.get(1, 9).color_code, 2);
        }
    }

    #[test]
    fn test_packed_column_is_immobile() {
        let rows = 12;
        let mut grid = Grid::new(20, rows);
        for col in 9..=11 {
            for row in 0..rows {
                grid.set(col, row, 50, 1);
            }
        }
        let mut rng = rng();
        let before: Vec<_> = (0..rows).map(|r| grid.get(10, r)).collect();

        tick(&mut grid, DEFAULT_GRAVITY, &mut rng);

        let after: Vec<_> = (0..rows).map(|r| grid.get(10, r)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_first_claim_wins_collision() {
        let mut grid = Grid::new(9, 2);
        for col in [3, 4, 6, 7] {
            grid.set(col, 1, 1, 1);
        }
        grid.set(4, 0, 20, 1);
        grid.set(6, 0, 30, 1);
        let mut rng = rng();

        let moved = tick(&mut grid, DEFAULT_GRAVITY, &mut rng);

        assert_eq!(moved, 1);
        assert_eq!(grid.get(5, 1).color_code, 20);
        assert_eq!(grid.get(6, 0).color_code, 30);
        assert!(grid.is_empty(4, 0));
        assert_eq!(grid.occupied_count(), 6);
    }

    #[test]
    fn test_conservation_and_bounds() {
        let mut rng = rng();
        let mut grid = Grid::new(30, 25);
        for col in 0..30 {
            for row in 0..25 {
                if rng.gen::<f64>() < 0.4 {
                    grid.set(col, row, rng.gen_range(1..=360), 1);
                }
            }
        }
        let count = grid.occupied_count();

        for _ in 0..60 {
            tick(&mut grid, DEFAULT_GRAVITY, &mut rng);
            assert_eq!(grid.occupied_count(), count);
            for (col, row, cell) in grid.occupied() {
                assert!(col < 30 && row < 25);
                assert!((1..=360).contains(&cell.color_code));
            }
        }
    }

    #[test]
    fn test_empty_cells_stay_empty() {
        let mut grid = Grid::new(10, 10);
        grid.set(1, 0, 5, 1);
        let mut rng = rng();

        tick(&mut grid, DEFAULT_GRAVITY, &mut rng);

        for col in 4..10 {
            for row in 0..10 {
                assert!(grid.is_empty(col, row));
            }
        }
    }

    #[test]
    fn test_zero_sized_grid() {
        let current = Grid::new(0, 10);
        let mut next = Grid::new(0, 10);
        assert_eq!(step(&current, &mut next, DEFAULT_GRAVITY, &mut rng()), 0);
    }
}
