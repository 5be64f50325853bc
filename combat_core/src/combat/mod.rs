//! Combat resolution - To-hit numbers and single attacks

mod resolution;
mod to_hit;

pub use resolution::{resolve_attack, AttackResult, HitRecord};
pub use to_hit::{to_hit_breakdown, to_hit_probability, ToHitBreakdown};
