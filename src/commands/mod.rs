pub mod general;

pub use general::{hello, setup};
