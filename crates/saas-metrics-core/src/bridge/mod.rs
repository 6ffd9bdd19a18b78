pub mod customers;
pub mod mrr;
