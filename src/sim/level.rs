//! Level layout: arena walls and the block grid
//!
//! Layouts are generated from the level index alone, so a block's GUID is
//! the same every time the level is built. Save files rely on this to
//! refer to blocks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use uuid::Uuid;

use super::body::{Collider, Contact, MotionWorld};
use super::collision::{Rect, Shape, intersect_shape_rect};
use super::powerup::PowerUpKind;
use super::state::Paddle;
use crate::consts::*;

/// Seed mixed with the level index for layout generation
const LAYOUT_SEED: u64 = 0x6172_6b61_6e6f_6964;

/// A breakable block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub guid: Uuid,
    pub rect: Rect,
    /// Score awarded when destroyed
    pub score: u32,
    /// Power-up that always drops when this block is destroyed
    pub guaranteed_powerup: Option<PowerUpKind>,
    enabled: bool,
}

impl Block {
    pub fn new(guid: Uuid, rect: Rect, score: u32) -> Self {
        Self {
            guid,
            rect,
            score,
            guaranteed_powerup: None,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// An arena wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub rect: Rect,
    /// Touching a hazard wall costs a life
    pub hazard: bool,
}

impl Wall {
    pub fn collider(&self) -> Collider {
        if self.hazard {
            Collider::HazardWall
        } else {
            Collider::PlainWall
        }
    }
}

/// Everything static in a level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub index: u32,
    /// Playable area inside the walls
    pub bounds: Rect,
    pub walls: Vec<Wall>,
    pub blocks: Vec<Block>,
}

impl Level {
    /// Build the layout for a (1-based) level index
    pub fn build(index: u32) -> Self {
        let t = WALL_THICKNESS;
        let bounds = Rect::new(Vec2::new(t, t), Vec2::new(ARENA_WIDTH - t, ARENA_HEIGHT));

        let walls = vec![
            // Left
            Wall {
                rect: Rect::new(Vec2::ZERO, Vec2::new(t, ARENA_HEIGHT)),
                hazard: false,
            },
            // Right
            Wall {
                rect: Rect::new(Vec2::new(ARENA_WIDTH - t, 0.0), Vec2::new(ARENA_WIDTH, ARENA_HEIGHT)),
                hazard: false,
            },
            // Top
            Wall {
                rect: Rect::new(Vec2::ZERO, Vec2::new(ARENA_WIDTH, t)),
                hazard: false,
            },
            // Bottom (below the paddle)
            Wall {
                rect: Rect::new(
                    Vec2::new(0.0, ARENA_HEIGHT),
                    Vec2::new(ARENA_WIDTH, ARENA_HEIGHT + t),
                ),
                hazard: true,
            },
        ];

        let mut rng = Pcg32::seed_from_u64(LAYOUT_SEED ^ u64::from(index));
        let rows = index.saturating_add(2).min(MAX_BLOCK_ROWS);
        let pitch_x = BLOCK_WIDTH + BLOCK_GAP;
        let cols = ((ARENA_WIDTH - 2.0 * t) / pitch_x).floor() as u32;
        let used_width = cols as f32 * pitch_x - BLOCK_GAP;
        let left = (ARENA_WIDTH - used_width) / 2.0;

        let mut blocks = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let min = Vec2::new(
                    left + col as f32 * pitch_x,
                    BLOCK_TOP + row as f32 * (BLOCK_HEIGHT + BLOCK_GAP),
                );
                let rect = Rect::new(min, min + Vec2::new(BLOCK_WIDTH, BLOCK_HEIGHT));

                let mut bytes = [0u8; 16];
                rng.fill(&mut bytes);
                let guid = uuid::Builder::from_random_bytes(bytes).into_uuid();

                // Top rows are worth more
                let score = BLOCK_SCORE * (rows - row);
                let mut block = Block::new(guid, rect, score);
                if rng.random_ratio(1, 16) {
                    let pick = rng.random_range(0..PowerUpKind::ALL.len());
                    block.guaranteed_powerup = Some(PowerUpKind::ALL[pick]);
                }
                blocks.push(block);
            }
        }

        log::debug!("Built level {index}: {} blocks", blocks.len());

        Self {
            index,
            bounds,
            walls,
            blocks,
        }
    }

    pub fn block(&self, guid: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|b| b.guid == guid)
    }

    pub fn block_mut(&mut self, guid: Uuid) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.guid == guid)
    }

    pub fn remaining_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_enabled()).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.remaining_blocks() == 0
    }
}

/// Collision view of a level with the current paddle
///
/// Scan order: paddle, walls, then enabled blocks in layout order. Only the
/// first overlapping surface is reported.
pub struct Surfaces<'a> {
    level: &'a Level,
    paddle: &'a Paddle,
}

impl<'a> Surfaces<'a> {
    pub fn new(level: &'a Level, paddle: &'a Paddle) -> Self {
        Self { level, paddle }
    }
}

impl MotionWorld for Surfaces<'_> {
    fn move_and_collide(&self, shape: &Shape, from: Vec2, motion: Vec2) -> Option<Contact> {
        let target = from + motion;

        if let Some(hit) = intersect_shape_rect(shape, target, &self.paddle.rect()) {
            return Some(Contact {
                hit,
                collider: Collider::PlainWall,
            });
        }

        for wall in &self.level.walls {
            if let Some(hit) = intersect_shape_rect(shape, target, &wall.rect) {
                return Some(Contact {
                    hit,
                    collider: wall.collider(),
                });
            }
        }

        self.level
            .blocks
            .iter()
            .filter(|b| b.is_enabled())
            .find_map(|block| {
                intersect_shape_rect(shape, target, &block.rect).map(|hit| Contact {
                    hit,
                    collider: Collider::Block(block.guid),
                })
            })
    }
}
