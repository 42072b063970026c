pub mod catalog;
pub mod error;
pub mod packer;
pub mod pieces;
pub mod render;
pub mod solver;
pub mod types;
