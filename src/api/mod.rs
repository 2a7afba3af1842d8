pub mod extract;
pub mod format;
pub mod pagination;

pub use extract::{Path, Query};
pub use format::{price_display, ProductView};
pub use pagination::{Page, PageParams};
