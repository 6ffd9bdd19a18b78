pub mod dollar;
