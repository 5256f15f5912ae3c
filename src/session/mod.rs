mod arena;
mod dispatch;
mod rounds;
mod session;

pub use arena::*;
pub use session::*;
