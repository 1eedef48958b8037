pub mod handle;
pub mod slot_arena;

pub use handle::{Handle, HandleRepr};
pub use slot_arena::SlotArena;
