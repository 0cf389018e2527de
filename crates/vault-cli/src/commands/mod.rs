pub mod account;
pub mod binary;
pub mod card;
pub mod init;
pub mod misc;
pub mod text;
