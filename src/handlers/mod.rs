pub mod create;
pub mod delete;
pub mod get;
pub mod health;
pub mod home;
pub mod list;
pub mod options;
pub mod patch;
pub mod update;

pub use create::{create_at_handler, create_handler};
pub use delete::delete_handler;
pub use get::{get_handler, head_handler};
pub use health::health_handler;
pub use home::home_handler;
pub use list::list_handler;
pub use options::{item_options_handler, items_options_handler};
pub use patch::patch_handler;
pub use update::{update_by_index_handler, update_handler};
