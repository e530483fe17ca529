pub mod event;
pub mod payload;
pub mod stream;
pub mod thread;

pub use event::*;
pub use payload::*;
pub use stream::*;
pub use thread::*;
