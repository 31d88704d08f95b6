pub mod docs;
pub mod map;
