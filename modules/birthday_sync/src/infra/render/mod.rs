pub mod file_mirror;

pub use file_mirror::FileMirrorSurface;
