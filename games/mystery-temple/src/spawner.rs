use glam::Vec3;
use temple_engine::{EngineContext, EntityId, GameEvent, Rng};

use crate::boosts::BoostKind;
use crate::config::{Difficulty, QualityTier, SpawnCaps, LANES, SPAWN_GAP, SPAWN_Z};
use crate::events::EVENT_OBJECT_SPAWN;
use crate::objects::{Category, GemTier, ObjectKind, ObjectPools, ObstacleShape, WorldObject};

/// The rune the spawner should offer next: its slot and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterRequest {
    pub slot: usize,
    pub ch: char,
}

/// Rolls new objects at the far end of the track.
#[derive(Debug, Clone)]
pub struct Spawner {
    caps: SpawnCaps,
}

impl Spawner {
    pub fn new(quality: QualityTier) -> Self {
        Self { caps: quality.caps() }
    }

    pub fn set_quality(&mut self, quality: QualityTier) {
        self.caps = quality.caps();
    }

    pub fn cap(&self, category: Category) -> usize {
        match category {
            Category::Obstacle => self.caps.obstacles,
            Category::BlueGem => self.caps.blue_gems,
            Category::GreenGem => self.caps.green_gems,
            Category::RedGem => self.caps.red_gems,
            Category::Boost => self.caps.boosts,
            Category::Letter => 1,
        }
    }

    /// One spawn roll per category. Returns the number of objects created.
    pub fn tick(
        &self,
        pools: &mut ObjectPools,
        rng: &mut Rng,
        rates: &Difficulty,
        letter: Option<LetterRequest>,
        ctx: &mut EngineContext,
    ) -> usize {
        let mut spawned = 0;
        for category in Category::ALL {
            if pools.count(category) >= self.cap(category) {
                continue;
            }
            let rate = match category {
                Category::Obstacle => rates.obstacle_rate,
                Category::BlueGem => rates.blue_gem_rate,
                Category::GreenGem => rates.green_gem_rate,
                Category::RedGem => rates.red_gem_rate,
                Category::Boost => rates.boost_rate,
                Category::Letter => rates.letter_rate,
            };
            // Letters wait for a request: every slot filled means none.
            let request = match (category, letter) {
                (Category::Letter, None) => continue,
                (_, request) => request,
            };
            if !rng.chance(rate) {
                continue;
            }
            let lane = rng.next_int(LANES.len() as u32) as usize;
            let x = LANES[lane];
            if !lane_is_clear(pools, category, x) {
                continue;
            }
            let id = ctx.next_id();
            let object = build(category, id, x, rng, request);
            log::debug!("spawn {:?} #{} in lane {}", category, id.0, lane);
            ctx.emit_event(GameEvent::new(EVENT_OBJECT_SPAWN, id.0 as f32, object.kind.render_kind(), x));
            pools.push(object);
            spawned += 1;
        }
        spawned
    }
}

fn lane_is_clear(pools: &ObjectPools, category: Category, x: f32) -> bool {
    !pools
        .get(category)
        .iter()
        .any(|o| (o.pos.x - x).abs() < 0.5 && o.pos.z < SPAWN_Z + SPAWN_GAP)
}

fn build(category: Category, id: EntityId, x: f32, rng: &mut Rng, letter: Option<LetterRequest>) -> WorldObject {
    let (y, kind) = match category {
        Category::Obstacle => {
            let shape = if rng.chance(0.65) { ObstacleShape::Block } else { ObstacleShape::Barrier };
            return WorldObject::obstacle(id, x, SPAWN_Z, shape);
        }
        Category::BlueGem => (1.0, ObjectKind::Gem { tier: GemTier::Blue }),
        Category::GreenGem => (rng.range(1.2, 2.2), ObjectKind::Gem { tier: GemTier::Green }),
        Category::RedGem => (rng.range(1.4, 2.3), ObjectKind::Gem { tier: GemTier::Red }),
        Category::Boost => {
            let kind = rng.pick(&BoostKind::ALL).copied().unwrap_or(BoostKind::Shield);
            (1.4, ObjectKind::Boost { kind })
        }
        Category::Letter => {
            let req = letter.unwrap_or(LetterRequest { slot: 0, ch: '?' });
            (1.0, ObjectKind::Letter { ch: req.ch, slot: req.slot })
        }
    };
    WorldObject::new(id, Vec3::new(x, y, SPAWN_Z), kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eager() -> Difficulty {
        Difficulty {
            obstacle_rate: 1.0,
            blue_gem_rate: 1.0,
            green_gem_rate: 1.0,
            red_gem_rate: 1.0,
            letter_rate: 1.0,
            boost_rate: 1.0,
            ..Difficulty::default()
        }
    }

    #[test]
    fn caps_are_never_exceeded() {
        for quality in [QualityTier::Low, QualityTier::High] {
            let spawner = Spawner::new(quality);
            let mut pools = ObjectPools::new();
            let mut rng = Rng::new(11);
            let mut ctx = EngineContext::new();
            let request = Some(LetterRequest { slot: 0, ch: 'L' });
            for _ in 0..500 {
                spawner.tick(&mut pools, &mut rng, &eager(), request, &mut ctx);
                pools.advance(SPAWN_GAP + 0.1);
                ctx.clear_frame_data();
                for category in Category::ALL {
                    assert!(pools.count(category) <= spawner.cap(category), "{category:?} over cap");
                }
            }
            assert_eq!(pools.count(Category::Obstacle), spawner.cap(Category::Obstacle));
        }
    }

    #[test]
    fn letters_only_spawn_on_request() {
        let spawner = Spawner::new(QualityTier::High);
        let mut pools = ObjectPools::new();
        let mut rng = Rng::new(5);
        let mut ctx = EngineContext::new();
        for _ in 0..50 {
            spawner.tick(&mut pools, &mut rng, &eager(), None, &mut ctx);
            ctx.clear_frame_data();
        }
        assert_eq!(pools.count(Category::Letter), 0);

        let request = LetterRequest { slot: 2, ch: 'V' };
        for _ in 0..50 {
            spawner.tick(&mut pools, &mut rng, &eager(), Some(request), &mut ctx);
            ctx.clear_frame_data();
        }
        let letters = pools.get(Category::Letter);
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].kind, ObjectKind::Letter { ch: 'V', slot: 2 });
    }

    #[test]
    fn same_lane_needs_a_gap() {
        let mut pools = ObjectPools::new();
        pools.push(WorldObject::obstacle(EntityId(1), 0.0, SPAWN_Z, ObstacleShape::Block));
        assert!(!lane_is_clear(&pools, Category::Obstacle, 0.0));
        assert!(lane_is_clear(&pools, Category::Obstacle, 4.0));
        assert!(lane_is_clear(&pools, Category::BlueGem, 0.0));
    }

    #[test]
    fn spawns_announce_themselves() {
        let spawner = Spawner::new(QualityTier::Low);
        let mut pools = ObjectPools::new();
        let mut rng = Rng::new(3);
        let mut ctx = EngineContext::new();
        let n = spawner.tick(&mut pools, &mut rng, &eager(), None, &mut ctx);
        assert!(n > 0);
        let announced = ctx.events.iter().filter(|e| e.kind_code() == EVENT_OBJECT_SPAWN).count();
        assert_eq!(announced, n);
        assert!(pools.iter().all(|o| o.pos.z == SPAWN_Z));
    }
}
