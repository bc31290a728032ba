pub mod human;
pub mod terminal;
pub mod watch;

pub use human::HumanMode;
pub use watch::WatchMode;
