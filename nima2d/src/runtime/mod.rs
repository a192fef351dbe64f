mod jelly;
mod transform;

pub use jelly::*;
pub use transform::*;


#[cfg(test)]
mod transform_tests;
