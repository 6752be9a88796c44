//! The shared world: grids, players, and the rules that change them.

use std::collections::BTreeMap;

use delve_protocol::{Direction, PlayerId, Position, Tile, VisiblePlayer, WorldView};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::generator::random_cell;
use crate::{generate, Cell, GameError, Grid, Layout, Outcome, WorldConfig, ROOM_ENTRY};

/// Which grid a player is standing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    MainArea,
    TreasureRoom,
}

/// A player's in-world state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Coordinates inside the grid named by `location`.
    pub position: Position,
    pub score: u32,
    pub location: Location,
    /// How many times this player has been admitted to the treasure room.
    /// The room arbiter's re-entry policy reads this.
    pub room_visits: u32,
}

/// The result of a successful [`World::move_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: Position,
    /// Equal to `from` when the move ran into a wall.
    pub to: Position,
    /// Value of the treasure picked up on arrival, if any.
    pub treasure: Option<u32>,
}

impl Step {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// The single source of truth for a game.
///
/// Owns both grids, every player's position and score, and the treasure
/// counters. Invariants held by every method:
///
/// - `collected <= total`; the game is over exactly when they are equal,
///   and from then on [`outcome`](Self::outcome) is `Some` and never changes;
/// - no two players share a cell of the same grid;
/// - every position is inside the grid named by its player's location.
#[derive(Debug)]
pub struct World {
    main: Grid,
    room: Grid,
    entrance: Position,
    entrance_open: bool,
    // BTreeMap so views list players in a stable order.
    players: BTreeMap<PlayerId, Player>,
    collected: u32,
    total: u32,
    room_remaining: u32,
    outcome: Option<Outcome>,
}

impl World {
    /// Builds a world from an already generated layout.
    pub fn new(layout: Layout) -> Self {
        let room_remaining = layout.room.count_treasures() as u32;
        Self {
            main: layout.main,
            room: layout.room,
            entrance: layout.entrance,
            entrance_open: true,
            players: BTreeMap::new(),
            collected: 0,
            total: layout.total_treasures,
            room_remaining,
            outcome: None,
        }
    }

    /// Validates `config` and generates a fresh world from the thread RNG.
    pub fn generate(config: &WorldConfig) -> Result<Self, GameError> {
        Self::generate_with(config, &mut rand::rng())
    }

    /// Like [`generate`](Self::generate) with a caller-supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(
        config: &WorldConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::new(generate(config, rng)))
    }

    // -- Accessors --------------------------------------------------------

    pub fn main_grid(&self) -> &Grid {
        &self.main
    }

    pub fn room_grid(&self) -> &Grid {
        &self.room
    }

    pub fn entrance(&self) -> Position {
        self.entrance
    }

    /// `false` once the room has been emptied and its entrance removed.
    pub fn room_open(&self) -> bool {
        self.entrance_open
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn treasures_left(&self) -> u32 {
        self.total - self.collected
    }

    pub fn room_treasures_left(&self) -> u32 {
        self.room_remaining
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Fails with [`GameError::GameOver`] once the game has ended.
    pub fn ensure_running(&self) -> Result<(), GameError> {
        if self.is_over() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn grid(&self, location: Location) -> &Grid {
        match location {
            Location::MainArea => &self.main,
            Location::TreasureRoom => &self.room,
        }
    }

    /// The player standing on `pos` of the given grid, if any.
    fn occupant_at(&self, location: Location, pos: Position) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.location == location && p.position == pos)
            .map(|p| p.id)
    }

    // -- Registration -----------------------------------------------------

    /// Places a new player with score 0 on a uniformly random free cell of
    /// the main area (empty terrain, nobody standing there).
    ///
    /// Draws random cells and retries on collision; if that keeps failing
    /// the free cells are enumerated and one is chosen uniformly, so a
    /// crowded world cannot spin forever.
    pub fn spawn_player<R: Rng + ?Sized>(
        &mut self,
        id: PlayerId,
        rng: &mut R,
    ) -> Result<Position, GameError> {
        if self.players.contains_key(&id) {
            return Err(GameError::DuplicateId(id));
        }
        let position = self.random_free_cell(rng).ok_or(GameError::WorldFull)?;
        self.insert_player(id, position);
        Ok(position)
    }

    /// Places a new player on a chosen main-area cell.
    ///
    /// Any terrain is allowed (standing on a treasure does not collect it;
    /// only moving onto it does). Used to stage exact scenarios.
    pub fn spawn_player_at(&mut self, id: PlayerId, position: Position) -> Result<(), GameError> {
        if self.players.contains_key(&id) {
            return Err(GameError::DuplicateId(id));
        }
        if !self.main.contains(position) {
            return Err(GameError::InvalidConfig(format!(
                "spawn position {position} is outside the main grid"
            )));
        }
        if self.occupant_at(Location::MainArea, position).is_some() {
            return Err(GameError::PositionOccupied);
        }
        self.insert_player(id, position);
        Ok(())
    }

    fn insert_player(&mut self, id: PlayerId, position: Position) {
        self.players.insert(
            id,
            Player {
                id,
                position,
                score: 0,
                location: Location::MainArea,
                room_visits: 0,
            },
        );
        tracing::debug!(player_id = %id, %position, "player placed");
    }

    fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let is_free = |pos: Position| {
            self.main.get(pos).is_some_and(Cell::is_empty)
                && self.occupant_at(Location::MainArea, pos).is_none()
        };

        let attempts = self.main.rows() * self.main.cols() * 4;
        for _ in 0..attempts {
            let pos = random_cell(&self.main, rng);
            if is_free(pos) {
                return Some(pos);
            }
        }

        let free: Vec<Position> = self.main.positions().filter(|p| is_free(*p)).collect();
        free.choose(rng).copied()
    }

    /// Removes a player. Their score leaves with them.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            tracing::debug!(player_id = %id, "player removed from world");
        }
        removed
    }

    // -- Movement ---------------------------------------------------------

    /// Moves a player one cell in the grid they currently occupy.
    ///
    /// - Stepping off the edge is a no-op, not an error.
    /// - Stepping onto another player in the same grid fails with
    ///   [`GameError::PositionOccupied`] and changes nothing.
    /// - Stepping onto a treasure adds its value to the score, empties the
    ///   cell, and bumps the collected counter (and the room counter when in
    ///   the room). Taking the last treasure ends the game.
    pub fn move_player(&mut self, id: PlayerId, direction: Direction) -> Result<Step, GameError> {
        self.ensure_running()?;
        let player = self.players.get(&id).ok_or(GameError::UnknownPlayer(id))?;
        let (location, from) = (player.location, player.position);

        let grid = self.grid(location);
        let Some(to) = grid.step(from, direction) else {
            return Ok(Step {
                from,
                to: from,
                treasure: None,
            });
        };
        if self.occupant_at(location, to).is_some() {
            return Err(GameError::PositionOccupied);
        }
        let treasure = grid.get(to).and_then(Cell::treasure_value);

        let player = self.players.get_mut(&id).ok_or(GameError::UnknownPlayer(id))?;
        player.position = to;
        if let Some(value) = treasure {
            player.score += value;
            self.collect(id, location, to, value);
        }

        Ok(Step { from, to, treasure })
    }

    /// Books a treasure pickup and runs the win detector.
    fn collect(&mut self, id: PlayerId, location: Location, pos: Position, value: u32) {
        let taken = match location {
            Location::MainArea => self.main.take_treasure(pos),
            Location::TreasureRoom => self.room.take_treasure(pos),
        };
        debug_assert_eq!(taken, Some(value));

        self.collected += 1;
        debug_assert!(self.collected <= self.total, "collected more than placed");
        tracing::debug!(
            player_id = %id,
            %pos,
            value,
            collected = self.collected,
            total = self.total,
            "treasure collected"
        );

        if location == Location::TreasureRoom {
            self.room_remaining = self.room_remaining.saturating_sub(1);
            if self.room_remaining == 0 {
                self.close_room();
            }
        }
        self.detect_win();
    }

    /// Removes the entrance once the room holds nothing more. Happens once.
    fn close_room(&mut self) {
        if self.entrance_open {
            self.entrance_open = false;
            self.main.set(self.entrance, Cell::Empty);
            tracing::info!(entrance = %self.entrance, "treasure room emptied, entrance removed");
        }
    }

    /// The win detector. Once every treasure is collected, fixes the
    /// outcome from the players registered right now.
    pub fn detect_win(&mut self) -> Option<&Outcome> {
        if self.outcome.is_none() && self.collected >= self.total {
            let outcome = Outcome::decide(self.players.values());
            match &outcome {
                Outcome::Winner { player, score } => {
                    tracing::info!(winner = %player, score, "game over");
                }
                Outcome::Tie { players, score } => {
                    tracing::info!(tied = ?players, score, "game over in a tie");
                }
            }
            self.outcome = Some(outcome);
        }
        self.outcome.as_ref()
    }

    // -- Room transitions -------------------------------------------------

    /// Checks that `id` may step through the entrance right now.
    pub fn check_entry(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.ensure_running()?;
        let player = self.players.get(&id).ok_or(GameError::UnknownPlayer(id))?;
        if !self.entrance_open {
            return Err(GameError::RoomClosed);
        }
        if player.location != Location::MainArea || player.position != self.entrance {
            return Err(GameError::NotAtEntrance);
        }
        Ok(player)
    }

    /// Moves a player from the entrance into the room's entry cell.
    ///
    /// Only the room arbiter calls this, holding the room lease lock.
    pub fn admit_to_room(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.check_entry(id)?;
        if self.occupant_at(Location::TreasureRoom, ROOM_ENTRY).is_some() {
            return Err(GameError::PositionOccupied);
        }
        let player = self.players.get_mut(&id).ok_or(GameError::UnknownPlayer(id))?;
        player.location = Location::TreasureRoom;
        player.position = ROOM_ENTRY;
        player.room_visits += 1;
        Ok(())
    }

    /// Moves a player out of the room back onto the entrance cell.
    ///
    /// If someone else is standing on the entrance, the player lands on the
    /// first free neighbour instead. Works after the game has ended so that
    /// a lease can always be wound down.
    pub fn return_from_room(&mut self, id: PlayerId) -> Result<Position, GameError> {
        let player = self.players.get(&id).ok_or(GameError::UnknownPlayer(id))?;
        if player.location != Location::TreasureRoom {
            return Err(GameError::NotInRoom(id));
        }
        let landing = self.landing_cell();
        let player = self.players.get_mut(&id).ok_or(GameError::UnknownPlayer(id))?;
        player.location = Location::MainArea;
        player.position = landing;
        Ok(landing)
    }

    fn landing_cell(&self) -> Position {
        let vacant = |pos: Position| self.occupant_at(Location::MainArea, pos).is_none();
        if vacant(self.entrance) {
            return self.entrance;
        }

        let neighbours = Direction::ALL
            .into_iter()
            .filter_map(|dir| self.main.step(self.entrance, dir));
        let mut candidates = neighbours.chain(self.main.positions());
        let open = |pos: &Position| vacant(*pos) && self.main.get(*pos).is_some_and(Cell::is_empty);
        match candidates.find(open) {
            Some(pos) => pos,
            None => {
                tracing::warn!(entrance = %self.entrance, "no free landing cell, stacking on entrance");
                self.entrance
            }
        }
    }

    // -- Projection -------------------------------------------------------

    /// Builds the view `id` is allowed to see: their own grid with only the
    /// players in that grid overlaid. Never mutates.
    pub fn project(&self, id: PlayerId) -> Result<WorldView, GameError> {
        let me = self.players.get(&id).ok_or(GameError::UnknownPlayer(id))?;

        let mut grid: Vec<Vec<Tile>> = self
            .grid(me.location)
            .iter_rows()
            .map(|row| row.iter().map(|&cell| Tile::from(cell)).collect())
            .collect();

        let players: Vec<VisiblePlayer> = self
            .players
            .values()
            .filter(|p| p.location == me.location)
            .map(|p| VisiblePlayer {
                id: p.id,
                position: p.position,
                score: p.score,
                is_you: p.id == id,
            })
            .collect();

        for p in &players {
            if let Some(tile) = grid
                .get_mut(p.position.row)
                .and_then(|row| row.get_mut(p.position.col))
            {
                *tile = if p.is_you {
                    Tile::You
                } else {
                    Tile::Player { id: p.id }
                };
            }
        }

        Ok(WorldView {
            grid,
            players,
            treasures_left: self.treasures_left(),
            room_treasures_left: self.room_remaining,
            in_room: me.location == Location::TreasureRoom,
            score: me.score,
        })
    }
}
