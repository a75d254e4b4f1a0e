pub mod path_processing;
pub mod text_processing;
pub mod url_building;

pub use path_processing::*;
pub use text_processing::*;
pub use url_building::*;
