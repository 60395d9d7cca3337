//! Missile versus cannon hit detection.

use crate::game::{World, MISSILE_DAMAGE};
use log::{debug, info};
use shared::geometry::{cannon_box, missile_box};
use shared::GameTime;

/// Sweeps every live missile against opposing, still-alive cannons at `now`.
///
/// A missile that hits is removed and damages exactly one cannon. A cannon
/// whose life runs out is frozen in place and scores a point for the
/// attacking team. Returns whether anything was hit.
pub fn detect_collisions(world: &mut World, now: GameTime) -> bool {
    let mut hit = false;
    let mut i = 0;

    'missiles: while i < world.missiles.len() {
        let (team, up, missile_rect) = {
            let missile = &world.missiles[i];
            let up = missile.flies_up();
            let rect = missile_box(missile.coord_x, missile.progress_at(now), up);
            (missile.team, up, rect)
        };

        for player in world.players.iter_mut() {
            if player.team == team || player.is_destroyed() {
                continue;
            }

            // Upward missiles target the top edge.
            let cannon_rect = cannon_box(player.cannon_x(now), up);
            if !missile_rect.intersects(&cannon_rect) {
                continue;
            }

            let missile = world.missiles.swap_remove(i);
            hit = true;

            player.cannon_life -= MISSILE_DAMAGE;
            debug!(
                "Missile {} hit cannon {} (life {:.2})",
                missile.id, player.cannon_id, player.cannon_life
            );

            if player.cannon_life <= 0.0 {
                player.cannon_life = 0.0;
                player.rebase_cannon(now);
                player.cannon_speed = 0.0;
                world.teams[team as usize].score += 1;
                info!(
                    "Cannon {} destroyed, team {} scores ({} - {})",
                    player.cannon_id, team, world.teams[0].score, world.teams[1].score
                );
            }

            continue 'missiles;
        }

        i += 1;
    }

    hit
}
