//! The room arbiter: grants, releases, and expires the treasure room lease.

use std::sync::Arc;

use delve_protocol::{PlayerId, WorldView};
use delve_world::{Location, Player, World};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::{Lease, RoomConfig, RoomError, RoomState};

/// Everything guarded by the room lock.
#[derive(Debug, Default)]
struct Slot {
    lease: Option<Lease>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    /// Clears the lease and cancels its timer, if any.
    fn release(&mut self) -> Option<Lease> {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.lease.take()
    }
}

/// Owns the treasure room lease.
///
/// Lock order is always room, then world: every method that needs both
/// takes `self`'s lock first. Nothing here ever touches the session lock.
#[derive(Debug)]
pub struct RoomArbiter {
    config: RoomConfig,
    slot: Mutex<Slot>,
}

impl RoomArbiter {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// The current lease, if the room is occupied.
    pub async fn lease(&self) -> Option<Lease> {
        self.slot.lock().await.lease
    }

    pub async fn state(&self) -> RoomState {
        RoomState::from(self.slot.lock().await.lease.as_ref())
    }

    pub async fn occupant(&self) -> Option<PlayerId> {
        self.lease().await.map(|lease| lease.occupant)
    }

    /// Grants `player` the room and arms the eviction timer.
    ///
    /// Rejections, in order: game over, unknown player, room closed, not at
    /// the entrance, room busy, re-entry policy. On success the player is
    /// on the room's entry cell and the returned view shows the room.
    pub async fn enter(
        self: &Arc<Self>,
        world: &Arc<Mutex<World>>,
        player: PlayerId,
    ) -> Result<WorldView, RoomError> {
        let mut slot = self.slot.lock().await;
        let mut guard = world.lock().await;

        let visits = guard.check_entry(player)?.room_visits;
        if let Some(lease) = &slot.lease {
            tracing::debug!(player_id = %player, occupant = %lease.occupant, "room busy");
            return Err(RoomError::RoomBusy);
        }
        let squatter = guard
            .players()
            .find(|p| p.location == Location::TreasureRoom)
            .map(|p| p.id);
        debug_assert!(squatter.is_none(), "player inside the room without a lease");
        if let Some(squatter) = squatter {
            tracing::error!(player_id = %squatter, "player inside the room without a lease");
            return Err(RoomError::LeaseConflict(squatter));
        }
        if !self.config.reentry.allows(visits) {
            return Err(RoomError::AlreadyUsed);
        }

        guard.admit_to_room(player)?;
        let view = guard.project(player)?;
        drop(guard);

        let now = Instant::now();
        slot.generation += 1;
        let lease = Lease {
            occupant: player,
            granted_at: now,
            deadline: now + self.config.time_limit,
            generation: slot.generation,
        };
        slot.lease = Some(lease);
        slot.timer = Some(self.arm_timer(world, lease));

        tracing::info!(
            player_id = %player,
            generation = lease.generation,
            time_limit = ?self.config.time_limit,
            "room lease granted"
        );
        Ok(view)
    }

    /// Releases `player`'s lease and puts them back on the entrance.
    pub async fn leave(
        &self,
        world: &Mutex<World>,
        player: PlayerId,
    ) -> Result<WorldView, RoomError> {
        let mut slot = self.slot.lock().await;
        let mut guard = world.lock().await;

        guard.ensure_running()?;
        match &slot.lease {
            Some(lease) if lease.occupant == player => {}
            _ => return Err(RoomError::NotInRoom(player)),
        }

        let landing = guard.return_from_room(player)?;
        let view = guard.project(player)?;
        drop(guard);

        if let Some(lease) = slot.release() {
            tracing::info!(
                player_id = %player,
                %landing,
                held_for = ?lease.held_for(),
                "room lease released"
            );
        }
        Ok(view)
    }

    /// Evicts the occupant of lease `generation` if it is still current.
    ///
    /// Returns `false` without touching anything when the lease has since
    /// been released or re-granted. Runs even after the game has ended so
    /// the room is always left free.
    pub async fn expire(&self, world: &Mutex<World>, generation: u64) -> bool {
        let mut slot = self.slot.lock().await;
        let lease = match slot.lease {
            Some(lease) if lease.generation == generation => lease,
            _ => return false,
        };

        let mut guard = world.lock().await;
        match guard.return_from_room(lease.occupant) {
            Ok(landing) => {
                tracing::warn!(
                    player_id = %lease.occupant,
                    %landing,
                    generation,
                    held_for = ?lease.held_for(),
                    "room time limit reached, player evicted"
                );
            }
            Err(e) => {
                tracing::error!(player_id = %lease.occupant, error = %e, "eviction found no occupant");
            }
        }
        drop(guard);

        // The timer being dropped here is the one running this call.
        slot.timer = None;
        slot.lease = None;
        true
    }

    /// Removes `player` from the world, releasing their lease if they hold
    /// one, under a single acquisition of both locks.
    pub async fn forfeit(&self, world: &Mutex<World>, player: PlayerId) -> Option<Player> {
        let mut slot = self.slot.lock().await;
        let mut guard = world.lock().await;

        let removed = guard.remove_player(player);
        drop(guard);

        if slot.lease.is_some_and(|lease| lease.occupant == player) {
            if let Some(lease) = slot.release() {
                tracing::info!(
                    player_id = %player,
                    held_for = ?lease.held_for(),
                    "room lease released on disconnect"
                );
            }
        }
        removed
    }

    fn arm_timer(self: &Arc<Self>, world: &Arc<Mutex<World>>, lease: Lease) -> JoinHandle<()> {
        let arbiter = Arc::clone(self);
        let world = Arc::clone(world);
        tokio::spawn(async move {
            time::sleep_until(lease.deadline).await;
            arbiter.expire(&world, lease.generation).await;
        })
    }
}

impl Default for RoomArbiter {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
