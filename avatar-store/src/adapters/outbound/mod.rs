mod local_store;
mod memory;
pub mod supabase;

pub use local_store::*;
pub use memory::*;
