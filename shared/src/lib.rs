use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod geometry;
pub mod motion;

/// Number of teams in the arena.
pub const TEAM_COUNT: usize = 2;

/// Identifier of a team: 0 defends the bottom edge, 1 the top edge.
pub type TeamId = u8;

/// Point on the server clock, in seconds since the world started.
///
/// Values can be negative: rewriting a fuel origin moves it to a synthetic
/// instant that may precede server start.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct GameTime(pub f64);

impl GameTime {
    pub fn from_secs(secs: f64) -> Self {
        GameTime(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Time elapsed from `origin` up to `self`, clamped at zero.
    pub fn since(self, origin: GameTime) -> Duration {
        Duration::from_secs_f64((self.0 - origin.0).max(0.0))
    }

    pub fn after(self, span: Duration) -> GameTime {
        GameTime(self.0 + span.as_secs_f64())
    }

    pub fn before(self, span: Duration) -> GameTime {
        GameTime(self.0 - span.as_secs_f64())
    }
}

/// Buttons a client can press. Encoded on the wire by variant index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Fire,
    Turn,
    PlaceBrick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientPacket {
    Input(Button),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerPacket {
    Update(Update),
}

/// Per-recipient world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Recipient's fuel level at `timestamp`.
    pub fuel: f32,
    /// Period of regular snapshots.
    pub interval: Duration,
    /// Server clock when the snapshot was built.
    pub timestamp: GameTime,
    pub missiles: Vec<Missile>,
    pub bricks: Vec<Brick>,
    pub cannons: Vec<Cannon>,
    /// Recipient's team.
    pub team: TeamId,
    pub scores: [u32; TEAM_COUNT],
    pub fire_sound: bool,
}

impl Update {
    /// The recipient's own cannon, if present.
    pub fn own_cannon(&self) -> Option<&Cannon> {
        self.cannons.iter().find(|c| c.player)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cannon {
    pub id: u32,
    /// Origin of the motion law below.
    pub start: GameTime,
    pub coord_x: f32,
    pub speed: f32,
    pub team: TeamId,
    pub life: f32,
    /// True only in the snapshot sent to this cannon's owner.
    pub player: bool,
}

impl Cannon {
    pub fn position_at(&self, now: GameTime) -> f32 {
        motion::cannon_position(self.coord_x, self.speed, now.since(self.start)).0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub id: u32,
    /// Horizontal position, fixed at launch.
    pub coord_x: f32,
    /// Travel progress at `start`, from 0 (launcher) to 1 (far edge).
    pub coord_y: f32,
    pub speed: f32,
    pub team: TeamId,
    pub start: GameTime,
}

impl Missile {
    pub fn progress_at(&self, now: GameTime) -> f32 {
        motion::missile_travel(self.coord_y, self.speed, now.since(self.start))
    }

    /// Team 0 missiles fly from the bottom edge towards the top.
    pub fn flies_up(&self) -> bool {
        self.team == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub coord_x: f32,
    pub coord_y: f32,
    pub team: TeamId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample_update() -> Update {
        Update {
            fuel: 4.5,
            interval: Duration::from_millis(1000),
            timestamp: GameTime(12.5),
            missiles: vec![Missile {
                id: 3,
                coord_x: 0.25,
                coord_y: 0.1,
                speed: 0.5,
                team: 1,
                start: GameTime(12.0),
            }],
            bricks: vec![Brick {
                id: 0,
                coord_x: 0.75,
                coord_y: 0.0,
                team: 0,
            }],
            cannons: vec![
                Cannon {
                    id: 0,
                    start: GameTime(12.0),
                    coord_x: 0.5,
                    speed: 0.15,
                    team: 0,
                    life: 1.0,
                    player: false,
                },
                Cannon {
                    id: 1,
                    start: GameTime(11.0),
                    coord_x: 0.2,
                    speed: -0.15,
                    team: 1,
                    life: 0.75,
                    player: true,
                },
            ],
            team: 1,
            scores: [2, 0],
            fire_sound: true,
        }
    }

    #[test]
    fn test_game_time_since_clamps_negative_spans() {
        let early = GameTime(3.0);
        let late = GameTime(5.5);
        assert_eq!(late.since(early), Duration::from_millis(2500));
        assert_eq!(early.since(late), Duration::ZERO);
    }

    #[test]
    fn test_game_time_can_precede_origin() {
        let t = GameTime(2.0).before(Duration::from_secs(15));
        assert_approx_eq!(t.as_secs(), -13.0, 1e-9);
        assert_approx_eq!(t.after(Duration::from_secs(13)).as_secs(), 0.0, 1e-9);
    }

    #[test]
    fn test_own_cannon_lookup() {
        let update = sample_update();
        assert_eq!(update.own_cannon().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_missile_direction_follows_team() {
        let mut missile = sample_update().missiles[0].clone();
        assert!(!missile.flies_up());
        missile.team = 0;
        assert!(missile.flies_up());
    }

    #[test]
    fn test_cannon_and_missile_extrapolation() {
        let update = sample_update();
        let cannon = &update.cannons[0];
        assert_approx_eq!(cannon.position_at(GameTime(14.0)), 0.8, 1e-5);

        let missile = &update.missiles[0];
        assert_approx_eq!(missile.progress_at(GameTime(13.0)), 0.6, 1e-5);
        assert_eq!(missile.progress_at(GameTime(100.0)), 1.0);
    }

    #[test]
    fn test_packet_serialization_update() {
        let packet = ServerPacket::Update(sample_update());
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: ServerPacket = bincode::deserialize(&serialized).unwrap();
        assert_eq!(deserialized, packet);
    }

    #[test]
    fn test_button_discriminants_are_small_integers() {
        let fire = bincode::serialize(&ClientPacket::Input(Button::Fire)).unwrap();
        let brick = bincode::serialize(&ClientPacket::Input(Button::PlaceBrick)).unwrap();
        assert_eq!(fire, vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(brick, vec![0, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_button_is_rejected() {
        let bogus = vec![0u8, 0, 0, 0, 9, 0, 0, 0];
        assert!(bincode::deserialize::<ClientPacket>(&bogus).is_err());
    }
}
