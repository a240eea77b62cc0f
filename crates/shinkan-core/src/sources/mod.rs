//! Catalog sources for discovering new releases

pub mod rakuten;
pub mod traits;

pub use rakuten::*;
pub use traits::*;
