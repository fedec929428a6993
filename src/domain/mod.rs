//! Domain layer: view models and the pure helpers that derive their fields.

pub mod content;
pub mod projects;
pub mod reading;
pub mod slug;

pub use content::{ContentBody, ContentPreview};
pub use projects::{GalleryImage, ProjectBody, ProjectCategory, ProjectPreview, ProjectStat};
