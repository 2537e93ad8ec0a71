pub mod bidders;
pub mod download;
pub mod generate;
pub mod health;
pub mod progress;
pub mod upload;

pub use bidders::*;
pub use download::*;
pub use generate::*;
pub use health::*;
pub use progress::*;
pub use upload::*;
