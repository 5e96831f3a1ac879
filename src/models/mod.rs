pub mod media;
pub mod photo;
pub mod project;
pub mod user;

pub use media::*;
pub use photo::*;
pub use project::*;
pub use user::*;
