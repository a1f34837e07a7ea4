pub mod photo;
pub mod profile;
pub mod token;
