pub mod health;
pub mod images;
pub mod migrate;
pub mod seed;
pub mod token;
