pub mod classify;
pub mod matrix;
