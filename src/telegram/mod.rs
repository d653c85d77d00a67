//! Telegram front-end.
//!
//! ```text
//! telegram/
//! ├── mod.rs         # public API
//! ├── bot.rs         # bot construction and dispatcher
//! ├── handlers.rs    # commands, wallet messages, button clicks, background jobs
//! ├── keyboards.rs   # inline keyboards
//! └── session.rs     # per-chat wallets and per-user jobs
//! ```

pub mod bot;
pub mod handlers;
pub mod keyboards;
pub mod session;

pub use bot::{run, BotContext};
pub use handlers::Command;
pub use session::SessionStore;
