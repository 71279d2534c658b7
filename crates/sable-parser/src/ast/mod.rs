//! Abstract syntax tree: node types, the arena that stores them and an
//! S-expression printer.

pub mod node;
pub use node::*;

pub mod arena;
pub use arena::NodeArena;

pub mod printer;
pub use printer::{AstPrinter, print_tree};
