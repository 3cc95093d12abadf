mod access;
pub mod generation;
pub mod hardware;
pub mod jobs;
