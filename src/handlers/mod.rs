pub mod carts;
pub mod menu;
pub mod reviews;
pub mod token;
pub mod users;
