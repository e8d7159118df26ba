pub mod error;
pub mod health;
pub mod messages;
pub mod note;
pub mod presence;

pub use error::*;
pub use health::*;
pub use messages::*;
pub use note::*;
pub use presence::*;
