pub mod category;
pub mod notification;
pub mod product;
pub mod user;

pub use category::{Category, CategoryWithCount};
pub use notification::Notification;
pub use product::ProductRow;
pub use user::User;
