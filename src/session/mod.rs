pub mod countdown;
pub mod display;
pub mod driver;
pub mod input;
pub mod practice;
pub mod result;
