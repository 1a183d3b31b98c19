mod avatar;
mod local_store;
mod session;

pub use avatar::*;
pub use local_store::*;
pub use session::*;
