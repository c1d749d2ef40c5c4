//! A worked example of the refactoring pipeline on a small C translation unit.

pub mod c99;

#[cfg(test)]
mod __tests__;
