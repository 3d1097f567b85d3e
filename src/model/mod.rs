pub mod export;
pub mod round;
pub mod session;

pub use export::*;
pub use round::*;
pub use session::*;
