pub mod check;
pub mod common;
pub mod format;
pub mod gate;
pub mod init;
pub mod lint;
pub mod rules;
