//! # Statement Catalogue
//!
//! Every SQL statement the product repository issues. Values are always
//! bound as parameters, never spliced into the text.
//!
//! All reads select `id, name, type, count, price` in that order so one
//! row mapping serves every query.

/// Rows with an exact name match.
pub const GET_BY_NAME: &str = "select id, name, type, count, price from products where name = ?";

/// Insert without an id; the store assigns it.
pub const INSERT_PRODUCT: &str =
    "insert into products(name, type, count, price) values (?, ?, ?, ?)";

/// Every row, in store order (no ORDER BY).
pub const GET_ALL: &str = "select id, name, type, count, price from products";

/// Replace all columns of one row, addressed by id (last parameter).
pub const UPDATE_PRODUCT: &str =
    "update products set name = ?, type = ?, count = ?, price = ? where id = ?";

/// At most one row, addressed by id.
pub const GET_BY_ID: &str = "select id, name, type, count, price from products where id = ?";

/// Remove one row, addressed by id.
pub const DELETE_PRODUCT: &str = "delete from products where id = ?";

/// Number of stored rows.
pub const COUNT_PRODUCTS: &str = "select count(*) from products";
