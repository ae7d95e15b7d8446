//! Input validation module.
//!
//! Provides validators for account fields, identifiers, basket quantities
//! and post-login redirect targets.

mod account;
mod identifier;
mod quantity;
mod redirect;

pub use account::{validate_email, validate_mobile_number, validate_password, validate_user_name};
pub use identifier::{
    parse_category_id, validate_file_id, validate_order_id, validate_product_code,
};
pub use quantity::{parse_quantity_or_default, validate_quantity, MAX_QUANTITY};
pub use redirect::local_redirect_target;
