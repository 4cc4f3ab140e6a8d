pub mod choice;
pub mod question;
pub mod upload_file;
pub mod user;
pub mod vote;
