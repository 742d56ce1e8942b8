mod app;
pub mod dom;
pub mod error;
pub mod history;
pub mod net;
pub mod render;
pub mod router;
pub mod state;
pub mod surface;
mod util;
pub mod ws;

pub use app::run;
pub use error::ClientError;
pub use history::{Action, History};
pub use router::{Emitter, Origin, Whiteboard};
pub use surface::{Pen, Shape, Surface};
