pub mod frame;
pub mod idol;
pub mod image;
pub mod loaders;

pub use frame::{AppState, PhotoFrame, TOTAL_FRAMES};
pub use idol::IdolInfo;
pub use image::{EncodedImage, ImageFormat};
pub use loaders::{list_image_files, load_reference_image, ImageSource};
