//! Random world generation.

use delve_protocol::Position;
use rand::Rng;

use crate::{Cell, Grid, WorldConfig};

/// Where a player lands when they enter the treasure room. Generation never
/// puts a treasure here.
pub const ROOM_ENTRY: Position = Position::new(0, 0);

/// The freshly generated terrain of a world.
#[derive(Debug, Clone)]
pub struct Layout {
    pub main: Grid,
    pub room: Grid,
    /// The single `RoomEntrance` cell of the main grid.
    pub entrance: Position,
    /// Main + room treasure count: the win threshold.
    pub total_treasures: u32,
}

/// Generates the main grid and the treasure room.
///
/// Placement is rejection sampling: draw a uniform cell, retry if it is
/// taken. [`WorldConfig::validate`] guarantees enough free cells exist, so
/// the loops terminate; callers must validate first.
pub fn generate<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Layout {
    let mut main = Grid::new(config.rows, config.cols);
    let entrance = random_cell(&main, rng);

    for _ in 0..config.treasures {
        loop {
            let pos = random_cell(&main, rng);
            if pos != entrance && main.get(pos) == Some(Cell::Empty) {
                let value = rng.random_range(config.treasure_values.clone());
                main.set(pos, Cell::Treasure(value));
                break;
            }
        }
    }
    main.set(entrance, Cell::RoomEntrance);

    let mut room = Grid::new(config.room_rows, config.room_cols);
    let mut placed = 0;
    while placed < config.room_treasures {
        let pos = random_cell(&room, rng);
        if pos != ROOM_ENTRY && room.get(pos) == Some(Cell::Empty) {
            let value = rng.random_range(config.room_treasure_values.clone());
            room.set(pos, Cell::Treasure(value));
            placed += 1;
        }
    }

    let total_treasures = (main.count_treasures() + room.count_treasures()) as u32;
    tracing::debug!(
        %entrance,
        main_treasures = config.treasures,
        room_treasures = config.room_treasures,
        "world generated"
    );

    Layout {
        main,
        room,
        entrance,
        total_treasures,
    }
}

/// A uniformly random position inside `grid`.
pub(crate) fn random_cell<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Position {
    Position::new(
        rng.random_range(0..grid.rows()),
        rng.random_range(0..grid.cols()),
    )
}
