pub mod card;
pub mod settings;

pub use card::*;
pub use settings::*;
