pub mod hasher;
pub mod repository;
pub mod tokener;
pub mod uploader;
