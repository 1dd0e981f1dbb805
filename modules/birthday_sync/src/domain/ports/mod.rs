pub mod account;
pub mod clock;
pub mod directory;
pub mod kv;
pub mod photos;
pub mod render;

pub use account::{Account, CredentialProvider};
pub use clock::Clock;
pub use directory::{ConnectionsPage, DirectoryPort};
pub use kv::KeyValueStore;
pub use photos::PhotoCache;
pub use render::RenderSurface;
