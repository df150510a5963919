pub mod compare;
pub mod filter;
pub mod shuffle;
