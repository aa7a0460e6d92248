pub mod backup;
pub mod check;

pub use backup::handle_backup;
pub use check::handle_check;
