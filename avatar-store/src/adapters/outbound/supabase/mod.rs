mod avatar;
mod session;

pub use avatar::*;
pub use session::*;
