pub mod sessions;
pub mod stops;
pub mod util;
