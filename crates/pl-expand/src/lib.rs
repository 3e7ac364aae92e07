// pl-expand: chain recognition and stage lowering for PipeLift
//
// Architecture:
// - chain: the recovered chain model (stages, kinds, vocabulary)
// - scanner: walks the tree upward from entry references, recovers chains,
//   resolves nested entries depth-first before outer stages attach them
// - lower: compiles one chain into an equivalent expression or function
// - inline: substitution of trivial single-expression callbacks

pub mod chain;
pub mod error;
pub mod inline;
pub mod lower;
pub mod scanner;

pub use chain::{Chain, Stage, StageKind};
pub use lower::{LoweredChain, LoweringState, PendingBail};
pub use scanner::{expand_unit, ExpandOptions, Expander};
