pub mod camera;

pub use camera::{Camera, CapturePrompt, FolderCamera};
