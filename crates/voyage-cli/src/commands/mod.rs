pub mod comments;
pub mod init;
pub mod journal;
pub mod maintenance;
pub mod misc;
pub mod photos;
pub mod social;
pub mod stops;
