//! # Microprolog
//!
//! A minimal Prolog engine implementation in Rust.
//!
//! ## Features
//!
//! - Terms, substitution and Robinson unification with an optional occurs check
//! - A clause store indexed by `functor/arity`
//! - Depth-first SLD resolution producing solutions lazily
//! - The `\=` built-in
//! - A text front end and an interactive shell (feature `parsing`)
//!
//! ## Example
//!
//! ```rust
//! use microprolog::{Clause, KnowledgeBase, QueryEngine, Term};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.add_clause(Clause::fact(Term::compound(
//!     "parent",
//!     vec![Term::atom("tom"), Term::atom("bob")],
//! )))
//! .unwrap();
//!
//! let engine = QueryEngine::new(&kb);
//! let goal = Term::compound("parent", vec![Term::atom("tom"), Term::var("X")]);
//! for solution in engine.solve(&goal).unwrap() {
//!     println!("{}", solution.unwrap());
//! }
//! ```

/// Engine configuration.
pub mod config;
/// Error type.
pub mod error;
/// Clause storage.
pub mod knowledge_base;
#[cfg(feature = "parsing")]
pub mod parser;
/// Query resolution.
pub mod query;
pub mod samples;
/// Terms, clauses and bindings.
pub mod term;
/// Unification.
pub mod unify;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use knowledge_base::KnowledgeBase;
pub use query::{QueryEngine, Solution, Solutions};
pub use term::{Bindings, Clause, Signature, Term};
pub use unify::Unifier;
