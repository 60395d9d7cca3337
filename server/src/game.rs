//! Authoritative arena state and its transition function.
//!
//! [`World`] is plain data. Every mutation goes through [`World::apply`],
//! which runs one [`Event`] to completion and returns the snapshots that
//! must be handed to players. No I/O happens here, so the world can be
//! driven in tests with a synthetic clock.

use crate::collision::detect_collisions;
use log::{debug, info, warn};
use shared::motion::{self, FUEL_MAX};
use shared::{Brick, Button, Cannon, GameTime, Missile, TeamId, Update, TEAM_COUNT};
use std::time::Duration;

pub const FUEL_AT_JOIN: f32 = FUEL_MAX / 2.0;
pub const FIRE_COST: f32 = 1.0;
pub const BRICK_COST: f32 = 2.0;
pub const CANNON_START_X: f32 = 0.5;
pub const CANNON_START_SPEED: f32 = 0.15;
pub const CANNON_FULL_LIFE: f32 = 1.0;
pub const MISSILE_DAMAGE: f32 = 0.25;
pub const MISSILE_SPEED: f32 = 0.5;
/// Bricks are never removed, so the field stops accepting them here to keep
/// a full snapshot well inside the frame size limit.
pub const MAX_BRICKS: usize = 32_768;

/// Identity handle of a connected session.
pub type PlayerId = u32;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub team: TeamId,
    /// Instant at which fuel would have been zero.
    pub fuel_start: GameTime,
    pub cannon_id: u32,
    pub cannon_start: GameTime,
    pub cannon_speed: f32,
    pub cannon_coord_x: f32,
    pub cannon_life: f32,
}

impl Player {
    pub fn fuel(&self, now: GameTime) -> f32 {
        motion::fuel(0.0, now.since(self.fuel_start))
    }

    /// Rewrites the fuel origin so that [`Player::fuel`] reads `level` at `now`.
    pub fn set_fuel(&mut self, now: GameTime, level: f32) {
        self.fuel_start = now.before(motion::fuel_recharge_span(level));
    }

    pub fn consume_fuel(&mut self, now: GameTime, amount: f32) {
        let level = self.fuel(now);
        self.set_fuel(now, level - amount);
    }

    pub fn cannon_x(&self, now: GameTime) -> f32 {
        motion::cannon_position(
            self.cannon_coord_x,
            self.cannon_speed,
            now.since(self.cannon_start),
        )
        .0
    }

    /// Moves the cannon origin to `now` without changing its trajectory.
    pub fn rebase_cannon(&mut self, now: GameTime) {
        let (x, speed) = motion::cannon_position(
            self.cannon_coord_x,
            self.cannon_speed,
            now.since(self.cannon_start),
        );
        self.cannon_coord_x = x;
        self.cannon_speed = speed;
        self.cannon_start = now;
    }

    pub fn is_destroyed(&self) -> bool {
        self.cannon_life <= 0.0
    }

    fn cannon_view(&self, recipient: PlayerId) -> Cannon {
        Cannon {
            id: self.cannon_id,
            start: self.cannon_start,
            coord_x: self.cannon_coord_x,
            speed: self.cannon_speed,
            team: self.team,
            life: self.cannon_life,
            player: self.id == recipient,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Team {
    /// Connected players, used for balancing.
    pub count: usize,
    pub score: u32,
}

/// Mutation requests, processed strictly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Join(PlayerId),
    Leave(PlayerId),
    Input { player_id: PlayerId, button: Button },
    /// Regular snapshot broadcast.
    UpdateTick,
    /// Collision sweep; broadcasts only when something was hit.
    CollisionTick,
}

/// Snapshot addressed to one player.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub player_id: PlayerId,
    pub update: Update,
}

#[derive(Debug, Clone)]
pub struct World {
    /// Connected players. Removal swaps in the last player, so order is not stable.
    pub players: Vec<Player>,
    /// Live missiles, unordered.
    pub missiles: Vec<Missile>,
    pub bricks: Vec<Brick>,
    pub teams: [Team; TEAM_COUNT],
    pub update_interval: Duration,
    next_cannon_id: u32,
    next_missile_id: u32,
    next_brick_id: u32,
}

impl World {
    pub fn new(update_interval: Duration) -> Self {
        Self {
            players: Vec::new(),
            missiles: Vec::new(),
            bricks: Vec::new(),
            teams: [Team::default(); TEAM_COUNT],
            update_interval,
            next_cannon_id: 0,
            next_missile_id: 0,
            next_brick_id: 0,
        }
    }

    /// Runs one event to completion at server time `now`.
    pub fn apply(&mut self, event: Event, now: GameTime) -> Vec<Delivery> {
        match event {
            Event::Join(player_id) => {
                self.add_player(player_id, now);
                Vec::new()
            }
            Event::Leave(player_id) => {
                self.remove_player(player_id);
                Vec::new()
            }
            Event::Input { player_id, button } => self.handle_input(player_id, button, now),
            Event::UpdateTick => self.update(now, false),
            Event::CollisionTick => {
                if detect_collisions(self, now) {
                    self.update(now, false)
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn add_player(&mut self, player_id: PlayerId, now: GameTime) {
        let team: TeamId = if self.teams[0].count > self.teams[1].count {
            1
        } else {
            0
        };

        let mut player = Player {
            id: player_id,
            team,
            fuel_start: now,
            cannon_id: self.next_cannon_id,
            cannon_start: now,
            cannon_speed: CANNON_START_SPEED,
            cannon_coord_x: CANNON_START_X,
            cannon_life: CANNON_FULL_LIFE,
        };
        player.set_fuel(now, FUEL_AT_JOIN);
        self.next_cannon_id += 1;

        info!(
            "Player {} joined team {} (cannon {}, teams {}/{})",
            player_id,
            team,
            player.cannon_id,
            self.teams[0].count,
            self.teams[1].count
        );

        self.teams[team as usize].count += 1;
        self.players.push(player);
    }

    fn remove_player(&mut self, player_id: PlayerId) {
        match self.players.iter().position(|p| p.id == player_id) {
            Some(index) => {
                let player = self.players.swap_remove(index);
                self.teams[player.team as usize].count -= 1;
                info!("Player {} left team {}", player_id, player.team);
            }
            None => warn!("Leave for unknown player {}", player_id),
        }
    }

    fn handle_input(&mut self, player_id: PlayerId, button: Button, now: GameTime) -> Vec<Delivery> {
        let Some(index) = self.players.iter().position(|p| p.id == player_id) else {
            warn!("Input {:?} from unknown player {}", button, player_id);
            return Vec::new();
        };

        if self.players[index].is_destroyed() {
            debug!("Player {} pressed {:?} with a destroyed cannon", player_id, button);
            return Vec::new();
        }

        match button {
            Button::Turn => {
                let player = &mut self.players[index];
                player.rebase_cannon(now);
                player.cannon_speed = -player.cannon_speed;
                self.update(now, false)
            }
            Button::PlaceBrick => {
                if self.bricks.len() >= MAX_BRICKS {
                    debug!("Player {}: brick rejected, field is full", player_id);
                    return Vec::new();
                }
                let player = &mut self.players[index];
                if player.fuel(now) < BRICK_COST {
                    return Vec::new();
                }
                player.consume_fuel(now, BRICK_COST);
                player.rebase_cannon(now);
                let brick = Brick {
                    id: self.next_brick_id,
                    coord_x: player.cannon_coord_x,
                    coord_y: 0.0,
                    team: player.team,
                };
                self.next_brick_id += 1;
                debug!("Player {} placed brick {}", player_id, brick.id);
                self.bricks.push(brick);
                Vec::new()
            }
            Button::Fire => {
                let player = &mut self.players[index];
                let fuel = player.fuel(now);
                if fuel < FIRE_COST {
                    return Vec::new();
                }
                player.consume_fuel(now, FIRE_COST);
                player.rebase_cannon(now);
                let missile = Missile {
                    id: self.next_missile_id,
                    coord_x: player.cannon_coord_x,
                    coord_y: 0.0,
                    speed: MISSILE_SPEED,
                    team: player.team,
                    start: now,
                };
                self.next_missile_id += 1;
                debug!(
                    "Player {} fired missile {} (fuel {:.2} -> {:.2}, {} in flight)",
                    player_id,
                    missile.id,
                    fuel,
                    player.fuel(now),
                    self.missiles.len() + 1
                );
                self.missiles.push(missile);
                self.update(now, true)
            }
        }
    }

    /// Rebases every moving entity to `now`, retires spent missiles and
    /// builds one snapshot per player.
    fn update(&mut self, now: GameTime, fire_sound: bool) -> Vec<Delivery> {
        for player in &mut self.players {
            player.rebase_cannon(now);
        }

        let mut i = 0;
        while i < self.missiles.len() {
            let missile = &mut self.missiles[i];
            missile.coord_y = missile.progress_at(now);
            missile.start = now;
            if missile.coord_y >= 1.0 {
                self.missiles.swap_remove(i);
            } else {
                i += 1;
            }
        }

        self.players
            .iter()
            .map(|player| Delivery {
                player_id: player.id,
                update: self.snapshot_for(player, now, fire_sound),
            })
            .collect()
    }

    pub fn snapshot_for(&self, recipient: &Player, now: GameTime, fire_sound: bool) -> Update {
        Update {
            fuel: recipient.fuel(now),
            interval: self.update_interval,
            timestamp: now,
            missiles: self.missiles.clone(),
            bricks: self.bricks.clone(),
            cannons: self
                .players
                .iter()
                .map(|p| p.cannon_view(recipient.id))
                .collect(),
            team: recipient.team,
            scores: [self.teams[0].score, self.teams[1].score],
            fire_sound,
        }
    }
}
