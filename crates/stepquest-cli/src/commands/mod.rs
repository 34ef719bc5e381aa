//! Command implementations for the CLI.

mod dashboard;
mod export;
mod goal;
mod import;
mod list;
mod pace;
mod sync;
mod today;
mod watch;

pub use dashboard::cmd_dashboard;
pub use export::{ExportArgs, cmd_export};
pub use goal::cmd_goal;
pub use import::cmd_import;
pub use list::{ListArgs, cmd_list};
pub use pace::cmd_pace;
pub use sync::cmd_sync;
pub use today::cmd_today;
pub use watch::cmd_watch;
