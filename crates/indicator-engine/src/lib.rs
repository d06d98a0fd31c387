pub mod analyzer;
pub mod confluence;
pub mod history;
pub mod indicators;
pub mod patterns;


pub use analyzer::*;
pub use confluence::*;
pub use history::*;
pub use indicators::*;
pub use patterns::*;
