pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod i18n;
pub mod layout;
pub mod loader;
pub mod logging;
pub mod popup;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod toolkit;
pub mod ui;

pub use error::{PopupError, PopupResult};
pub use events::{PopupEvent, PopupEventKind};
pub use popup::{ImageEditingPopup, PopupOptions, PopupServices};
