pub mod factors;
