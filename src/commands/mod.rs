pub mod cards;
pub mod seed;
pub mod settings;
pub mod trading;

pub use cards::*;
pub use seed::*;
pub use settings::*;
pub use trading::*;
