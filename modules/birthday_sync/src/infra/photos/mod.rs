pub mod fs_cache;

pub use fs_cache::{photo_key, FsPhotoCache};
