use glam::Vec3;
use temple_engine::{Aabb, EntityId};

use crate::boosts::BoostKind;

// Render kinds understood by the page's scene.
pub const RENDER_PLAYER: f32 = 0.0;
pub const RENDER_BLOCK: f32 = 1.0;
pub const RENDER_BARRIER: f32 = 2.0;
pub const RENDER_GEM_BLUE: f32 = 3.0;
pub const RENDER_GEM_GREEN: f32 = 4.0;
pub const RENDER_GEM_RED: f32 = 5.0;
/// Boost pickups use `RENDER_BOOST + kind index`.
pub const RENDER_BOOST: f32 = 6.0;
pub const RENDER_LETTER: f32 = 10.0;
pub const RENDER_STORY: f32 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleShape {
    /// Cube sitting on the track; jump over it.
    Block,
    /// Raised beam; slide under it.
    Barrier,
}

impl ObstacleShape {
    pub fn height(self) -> f32 {
        match self {
            ObstacleShape::Block => 1.5,
            ObstacleShape::Barrier => 3.6,
        }
    }

    pub fn center_y(self) -> f32 {
        match self {
            ObstacleShape::Block => 0.75,
            ObstacleShape::Barrier => 2.6,
        }
    }

    fn half_extents(self) -> Vec3 {
        match self {
            ObstacleShape::Block => Vec3::splat(0.75),
            ObstacleShape::Barrier => Vec3::new(1.3, 0.5, 0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemTier {
    Blue,
    Green,
    Red,
}

impl GemTier {
    pub fn base_value(self) -> u64 {
        match self {
            GemTier::Blue => 50,
            GemTier::Green => 100,
            GemTier::Red => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    Obstacle { shape: ObstacleShape },
    Gem { tier: GemTier },
    Boost { kind: BoostKind },
    Letter { ch: char, slot: usize },
}

/// One collection per category; an object lives in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Obstacle,
    BlueGem,
    GreenGem,
    RedGem,
    Boost,
    Letter,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Obstacle,
        Category::BlueGem,
        Category::GreenGem,
        Category::RedGem,
        Category::Boost,
        Category::Letter,
    ];

    pub fn code(self) -> f32 {
        match self {
            Category::Obstacle => 0.0,
            Category::BlueGem => 1.0,
            Category::GreenGem => 2.0,
            Category::RedGem => 3.0,
            Category::Boost => 4.0,
            Category::Letter => 5.0,
        }
    }
}

impl ObjectKind {
    pub fn category(&self) -> Category {
        match self {
            ObjectKind::Obstacle { .. } => Category::Obstacle,
            ObjectKind::Gem { tier: GemTier::Blue } => Category::BlueGem,
            ObjectKind::Gem { tier: GemTier::Green } => Category::GreenGem,
            ObjectKind::Gem { tier: GemTier::Red } => Category::RedGem,
            ObjectKind::Boost { .. } => Category::Boost,
            ObjectKind::Letter { .. } => Category::Letter,
        }
    }

    pub fn render_kind(&self) -> f32 {
        match self {
            ObjectKind::Obstacle { shape: ObstacleShape::Block } => RENDER_BLOCK,
            ObjectKind::Obstacle { shape: ObstacleShape::Barrier } => RENDER_BARRIER,
            ObjectKind::Gem { tier: GemTier::Blue } => RENDER_GEM_BLUE,
            ObjectKind::Gem { tier: GemTier::Green } => RENDER_GEM_GREEN,
            ObjectKind::Gem { tier: GemTier::Red } => RENDER_GEM_RED,
            ObjectKind::Boost { kind } => RENDER_BOOST + kind.index() as f32,
            ObjectKind::Letter { .. } => RENDER_LETTER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: EntityId,
    pub pos: Vec3,
    pub consumed: bool,
    pub kind: ObjectKind,
}

impl WorldObject {
    pub fn new(id: EntityId, pos: Vec3, kind: ObjectKind) -> Self {
        Self { id, pos, consumed: false, kind }
    }

    pub fn obstacle(id: EntityId, x: f32, z: f32, shape: ObstacleShape) -> Self {
        Self::new(id, Vec3::new(x, shape.center_y(), z), ObjectKind::Obstacle { shape })
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn half_extents(&self) -> Vec3 {
        match self.kind {
            ObjectKind::Obstacle { shape } => shape.half_extents(),
            ObjectKind::Gem { .. } => Vec3::splat(0.4),
            ObjectKind::Boost { .. } | ObjectKind::Letter { .. } => Vec3::splat(0.5),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.pos, self.half_extents())
    }
}

/// Per-category object collections owned by the world.
#[derive(Debug, Default)]
pub struct ObjectPools {
    obstacles: Vec<WorldObject>,
    blue_gems: Vec<WorldObject>,
    green_gems: Vec<WorldObject>,
    red_gems: Vec<WorldObject>,
    boosts: Vec<WorldObject>,
    letters: Vec<WorldObject>,
}

impl ObjectPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[WorldObject] {
        match category {
            Category::Obstacle => &self.obstacles,
            Category::BlueGem => &self.blue_gems,
            Category::GreenGem => &self.green_gems,
            Category::RedGem => &self.red_gems,
            Category::Boost => &self.boosts,
            Category::Letter => &self.letters,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<WorldObject> {
        match category {
            Category::Obstacle => &mut self.obstacles,
            Category::BlueGem => &mut self.blue_gems,
            Category::GreenGem => &mut self.green_gems,
            Category::RedGem => &mut self.red_gems,
            Category::Boost => &mut self.boosts,
            Category::Letter => &mut self.letters,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    pub fn push(&mut self, object: WorldObject) {
        self.get_mut(object.category()).push(object);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    /// Move every object towards the player.
    pub fn advance(&mut self, dz: f32) {
        for category in Category::ALL {
            for object in self.get_mut(category).iter_mut() {
                object.pos.z += dz;
            }
        }
    }

    /// Remove objects that passed `limit_z` or were consumed. Returns them.
    pub fn cull(&mut self, limit_z: f32) -> Vec<WorldObject> {
        let mut removed = Vec::new();
        for category in Category::ALL {
            let pool = self.get_mut(category);
            let mut i = 0;
            while i < pool.len() {
                if pool[i].pos.z > limit_z || pool[i].consumed {
                    removed.push(pool.swap_remove(i));
                } else {
                    i += 1;
                }
            }
        }
        removed
    }

    pub fn remove(&mut self, category: Category, id: EntityId) -> Option<WorldObject> {
        let pool = self.get_mut(category);
        let idx = pool.iter().position(|o| o.id == id)?;
        Some(pool.swap_remove(idx))
    }

    pub fn clear_category(&mut self, category: Category) -> Vec<WorldObject> {
        std::mem::take(self.get_mut(category))
    }

    pub fn clear(&mut self) -> Vec<WorldObject> {
        Category::ALL.into_iter().flat_map(|c| self.clear_category(c)).collect()
    }
}

/// The object pursued during a chase.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryObject {
    pub id: EntityId,
    pub pos: Vec3,
    pub target_lane: usize,
    /// +1 moves right, -1 moves left.
    pub direction: i32,
    /// Frames since the last lane change.
    pub move_timer: f32,
    pub color: u32,
}

impl StoryObject {
    pub const START: Vec3 = Vec3::new(0.0, 2.0, -60.0);

    pub fn new(id: EntityId, color: u32) -> Self {
        Self {
            id,
            pos: Self::START,
            target_lane: crate::config::CENTER_LANE,
            direction: 1,
            move_timer: 0.0,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(id: u32, z: f32, tier: GemTier) -> WorldObject {
        WorldObject::new(EntityId(id), Vec3::new(0.0, 1.0, z), ObjectKind::Gem { tier })
    }

    #[test]
    fn objects_land_in_their_own_pool() {
        let mut pools = ObjectPools::new();
        pools.push(gem(1, -80.0, GemTier::Green));
        pools.push(WorldObject::obstacle(EntityId(2), 4.0, -80.0, ObstacleShape::Block));
        assert_eq!(pools.count(Category::GreenGem), 1);
        assert_eq!(pools.count(Category::Obstacle), 1);
        assert_eq!(pools.count(Category::BlueGem), 0);
        assert_eq!(pools.total(), 2);
    }

    #[test]
    fn cull_removes_passed_and_consumed() {
        let mut pools = ObjectPools::new();
        pools.push(gem(1, 14.0, GemTier::Blue));
        pools.push(gem(2, -10.0, GemTier::Blue));
        let mut eaten = gem(3, -20.0, GemTier::Red);
        eaten.consumed = true;
        pools.push(eaten);
        pools.advance(2.0);
        let removed: Vec<u32> = pools.cull(15.0).iter().map(|o| o.id.0).collect();
        assert!(removed.contains(&1));
        assert!(removed.contains(&3));
        assert_eq!(pools.total(), 1);
        assert_eq!(pools.get(Category::BlueGem)[0].pos.z, -8.0);
    }

    #[test]
    fn remove_takes_from_one_pool_only() {
        let mut pools = ObjectPools::new();
        pools.push(gem(5, 0.0, GemTier::Blue));
        assert!(pools.remove(Category::GreenGem, EntityId(5)).is_none());
        assert!(pools.remove(Category::BlueGem, EntityId(5)).is_some());
        assert!(pools.remove(Category::BlueGem, EntityId(5)).is_none());
    }

    #[test]
    fn barrier_sits_above_a_sliding_player() {
        let barrier = WorldObject::obstacle(EntityId(1), 0.0, 5.0, ObstacleShape::Barrier);
        assert!(barrier.aabb().min.y > 1.2);
        let block = WorldObject::obstacle(EntityId(2), 0.0, 5.0, ObstacleShape::Block);
        assert_eq!(block.aabb().max.y, ObstacleShape::Block.height());
    }
}
