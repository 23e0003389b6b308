pub mod api_reference;
pub mod best_practices;
pub mod npm_package;
pub mod search;
pub mod version_info;

pub use api_reference::*;
pub use best_practices::*;
pub use npm_package::*;
pub use search::*;
pub use version_info::*;
