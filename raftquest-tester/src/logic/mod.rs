pub mod assets;
pub mod checks;
pub mod reports;
pub mod tester;

pub use assets::TesterAssets;
pub use tester::*;
