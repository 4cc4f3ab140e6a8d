pub mod hasher {
    pub mod sha256;
}

pub mod tokener {
    pub mod jwt;
}

pub mod uploaders {
    pub mod local_storage;
}
