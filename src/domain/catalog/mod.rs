mod add_product;
mod admin_products;
mod delete_product;
mod edit_product;
mod errors;
pub mod image_store;
mod product_detail;
mod product_list;
pub mod products;

pub use add_product::add_product_endpoint;
pub use admin_products::admin_products;
pub use delete_product::delete_product_endpoint;
pub use edit_product::edit_product_endpoint;
pub use errors::CatalogError;
pub use image_store::{FsImageStore, ImageStore};
pub use product_detail::product_detail;
pub use product_list::product_list;
pub use products::{Product, count_products, find_products_by_ids, list_products};

pub const ADMIN_PRODUCTS_PATH: &str = "/accounts/admin/products";
