mod builder;
mod dag;
mod insertion;
mod trap_map;
mod trapezoid;

pub use builder::MapBuilder;
pub use trap_map::{Location, MapStats, TrapMap};
pub use trapezoid::{TrapId, Trapezoid};
