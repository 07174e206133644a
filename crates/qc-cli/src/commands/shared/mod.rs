pub mod gate;
pub mod limit;
pub mod path;
