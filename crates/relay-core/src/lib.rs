pub mod config;
pub mod endpoint;
pub mod error;
pub mod mode;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use config::Config;
pub use endpoint::{EndpointClient, ReplySource, ResearchReply};
pub use error::{ConfigError, RequestError};
pub use mode::Mode;
pub use session::{Session, SessionController};
pub use state::{Message, Role, Transcript};
