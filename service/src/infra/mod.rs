//! Infrastructure layer.

pub mod backend;
#[cfg(feature = "process-camera")]
pub mod camera;
pub mod storage;

#[cfg(feature = "process-camera")]
pub use self::camera::ProcessCamera;
#[cfg(feature = "http")]
pub use self::backend::Http;
pub use self::{
    backend::Backend,
    storage::{FileStorage, MemoryStorage, Storage},
};
