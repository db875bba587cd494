pub mod gray;
pub mod io;

pub use self::gray::GrayImage;
