/// Directory an uploaded image is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Avatar,
    Picture,
}

impl Category {
    pub fn dir(&self) -> &'static str {
        match self {
            Category::Avatar => "avatar",
            Category::Picture => "picture",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFileCreate {
    pub category: Category,
    pub extension: String,
    pub content: Vec<u8>,
}
