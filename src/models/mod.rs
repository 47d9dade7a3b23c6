pub mod board;
pub mod team;
pub mod user;
