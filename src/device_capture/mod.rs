pub mod captured_image;
pub mod impl_fake;
pub mod interface;
pub mod temp_file;
