//! Instance records for rendering
//!
//! One flat `#[repr(C)]` record per ball, ready to copy into a GPU instance
//! buffer or hand to JS as a `Float32Array`/`Uint32Array` view.

use bytemuck::{Pod, Zeroable};

use crate::sim::{Ball, PhysicsEngine};

/// Set in [`BallInstance::flags`] while a ball is held by the pointer
pub const FLAG_PINNED: u32 = 1;

/// Per-ball draw data
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    pub position: [f32; 2],
    pub radius: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub flags: u32,
}

impl BallInstance {
    pub fn from_ball(ball: &Ball) -> Self {
        Self {
            position: ball.position.to_array(),
            radius: ball.radius(),
            color: ball.color.0,
            flags: if ball.is_pinned() { FLAG_PINNED } else { 0 },
        }
    }

    /// Words per record, for JS-side stride math
    pub const STRIDE_WORDS: usize = std::mem::size_of::<Self>() / 4;
}

/// Refill `out` with one record per ball, in engine order
pub fn write_instances(engine: &PhysicsEngine, out: &mut Vec<BallInstance>) {
    out.clear();
    out.extend(engine.balls().iter().map(BallInstance::from_ball));
}

/// Raw bytes of a record slice
pub fn as_bytes(instances: &[BallInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
