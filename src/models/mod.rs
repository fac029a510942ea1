pub mod market;
pub mod feed;

pub use market::*;
pub use feed::*;
