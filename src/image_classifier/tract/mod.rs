pub mod image;
pub mod manifest;
