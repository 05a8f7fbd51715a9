pub mod clips;
pub mod feed;
pub mod uploads;
