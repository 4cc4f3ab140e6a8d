pub trait Hasher {
    fn gen_salt(&self) -> String;
    fn hash_password(&self, password: &str, salt: &str) -> String;

    fn verify_password(&self, password: &str, salt: &str, hashed: &str) -> bool {
        self.hash_password(password, salt) == hashed
    }
}
