pub mod arr;
