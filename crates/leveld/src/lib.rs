//! leveld - reference host for the vault level engine.
//!
//! A directory of Markdown notes stands in for the note-taking host:
//! [`vault::FsVault`] enumerates and parses notes, [`watcher::VaultWatcher`]
//! feeds filesystem changes to the scheduler, and [`render`] prints the
//! status panel.

pub mod config;
pub mod markdown;
pub mod render;
pub mod session;
pub mod vault;
pub mod watcher;

pub use config::LevelConfig;
pub use render::{render_status, RenderOptions};
pub use vault::FsVault;
pub use watcher::VaultWatcher;
