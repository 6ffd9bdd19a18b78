pub mod payback;
