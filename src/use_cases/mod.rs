pub mod categories;
pub mod login;
pub mod products;
pub mod sales;
pub mod suppliers;
pub mod users;
pub mod verify_token;

mod validation;

#[cfg(test)]
pub(crate) mod test_support;
