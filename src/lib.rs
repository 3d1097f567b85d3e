pub mod args;
pub mod model;
pub mod controller {
    pub mod round;
    pub mod sheets;
}
pub mod mvu {
    pub mod error;
}
pub mod view {
    pub mod index;
}

pub use controller::round::AppState;
pub use mvu::error::AppError;
