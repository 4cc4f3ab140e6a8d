pub mod question;
pub mod user;
pub mod vote;

#[cfg(test)]
pub(crate) mod memory;
