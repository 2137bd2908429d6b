use temple_engine::EntityId;

use crate::boosts::{BoostKind, BoostManager};
use crate::config::GameSettings;
use crate::lives::HitOutcome;
use crate::objects::{Category, ObjectKind, ObstacleShape};
use crate::progression::StoryPhase;
use crate::world::World;

/// Obstacles are only tested inside this depth band.
const IMPACT_Z: (f32, f32) = (3.0, 7.0);
/// Jump clearance over a block.
const CLEARANCE: f32 = 0.3;

const GEM_Z: (f32, f32) = (2.0, 9.0);
const GEM_LATERAL: f32 = 1.5;
const BOOST_LATERAL: f32 = 1.6;
const LETTER_Z: (f32, f32) = (3.0, 8.0);
const LETTER_LATERAL: f32 = 1.5;
const LETTER_REACH: f32 = 3.0;
const MAGNET_FRONT_Z: f32 = 10.0;
const MAGNET_COLLECT_Z: f32 = 1.5;
const MAGNET_PULL: f32 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collected {
    pub id: EntityId,
    pub category: Category,
    pub points: u64,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Obstacle registered as a hit and what it did.
    pub hit: Option<(EntityId, HitOutcome)>,
    pub collected: Vec<Collected>,
    pub caught: bool,
}

fn within(z: f32, band: (f32, f32)) -> bool {
    z > band.0 && z < band.1
}

/// One collision pass: obstacles, then pickups, then the catch test.
pub fn run(world: &mut World, now_ms: f64, dt: f32) -> CollisionReport {
    let mut report = CollisionReport::default();
    let settings = world.settings.clone();

    report.hit = check_obstacles(world, &settings, now_ms);
    if matches!(report.hit, Some((_, outcome)) if outcome.is_fatal()) {
        return report;
    }

    report.collected = collect_pickups(world, &settings, now_ms, dt);

    if let Some(story) = &world.story {
        if world.progress.phase() == StoryPhase::Chase
            && story.pos.distance(world.player.pos) < settings.difficulty.catch_radius
        {
            report.caught = true;
        }
    }
    report
}

fn check_obstacles(world: &mut World, settings: &GameSettings, now_ms: f64) -> Option<(EntityId, HitOutcome)> {
    let player_box = world.player.aabb(settings.difficulty.hitbox_tolerance);
    let mut hit = None;
    for obstacle in world.pools.get(Category::Obstacle) {
        if obstacle.consumed || !within(obstacle.pos.z, IMPACT_Z) {
            continue;
        }
        if !player_box.intersects(&obstacle.aabb()) {
            continue;
        }
        let ObjectKind::Obstacle { shape } = obstacle.kind else { continue };
        match shape {
            ObstacleShape::Barrier if world.player.sliding => continue,
            ObstacleShape::Block if world.player.pos.y > shape.height() - CLEARANCE => continue,
            _ => {}
        }
        if settings.boosts.pass_through && world.boosts.grants_pass_through() {
            continue;
        }
        hit = Some(obstacle.id);
        break;
    }

    let id = hit?;
    let outcome = world.lives.register_hit(&mut world.boosts, now_ms);
    if outcome != HitOutcome::Ignored {
        if let Some(obstacle) = world.pools.get_mut(Category::Obstacle).iter_mut().find(|o| o.id == id) {
            obstacle.consumed = true;
        }
    }
    Some((id, outcome))
}

fn collect_pickups(world: &mut World, settings: &GameSettings, now_ms: f64, dt: f32) -> Vec<Collected> {
    let magnet = world.boosts.is_active(BoostKind::Magnet);
    let player = world.player.pos;
    let lane_x = world.player.lane_x();
    let mut collected = Vec::new();

    for category in Category::ALL {
        if category == Category::Obstacle {
            continue;
        }
        for object in world.pools.get_mut(category).iter_mut() {
            if object.consumed {
                continue;
            }
            let take = match category {
                Category::Boost => {
                    within(object.pos.z, GEM_Z) && (object.pos.x - lane_x).abs() < BOOST_LATERAL
                }
                Category::Letter => {
                    within(object.pos.z, LETTER_Z)
                        && (object.pos.x - lane_x).abs() < LETTER_LATERAL
                        && object.pos.distance(player) < LETTER_REACH
                }
                _ => {
                    let in_reach = within(object.pos.z, GEM_Z) && (object.pos.x - lane_x).abs() < GEM_LATERAL;
                    let pulled = magnet
                        && within(object.pos.z, (-settings.boosts.magnet_depth, MAGNET_FRONT_Z))
                        && (object.pos.x - lane_x).abs() < settings.boosts.magnet_range;
                    if pulled {
                        object.pos.x += (lane_x - object.pos.x) * (MAGNET_PULL * dt).min(1.0);
                    }
                    in_reach || (pulled && object.pos.z > MAGNET_COLLECT_Z)
                }
            };
            if take {
                object.consumed = true;
                collected.push(Collected { id: object.id, category, points: 0, kind: object.kind });
            }
        }
    }

    for item in collected.iter_mut() {
        apply(world, item, now_ms);
    }
    for item in &collected {
        world.pools.remove(item.category, item.id);
    }
    collected
}

fn apply(world: &mut World, item: &mut Collected, now_ms: f64) {
    match item.kind {
        ObjectKind::Gem { tier } => {
            item.points = tier.base_value() * world.boosts.score_multiplier();
            world.stats.score += item.points;
            world.stats.count_gem(tier);
        }
        ObjectKind::Boost { kind } => {
            activate_boost(&mut world.boosts, kind, now_ms);
        }
        ObjectKind::Letter { ch, slot } => {
            world.progress.collect_letter(slot, ch);
        }
        ObjectKind::Obstacle { .. } => {}
    }
}

fn activate_boost(boosts: &mut BoostManager, kind: BoostKind, now_ms: f64) {
    boosts.activate(kind, now_ms);
    log::debug!("boost {:?} on until {}", kind, now_ms + boosts.duration_ms(kind));
}
