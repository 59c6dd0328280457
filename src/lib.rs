//! boolsearch - boolean keyword search over a crawled document corpus.
//!
//! A crawler leaves one words file per page plus an `index.txt` manifest.
//! boolsearch turns that corpus into an inverted index (cached on disk as
//! JSON) and answers queries combining words with AND, OR and NOT.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use boolsearch::{BuildOptions, QueryParser, builder, search};
//!
//! let loaded = builder::load_or_build(
//!     Path::new("Pages"),
//!     Path::new("index.json"),
//!     &BuildOptions::default(),
//! );
//! let parser = QueryParser::default();
//! let ids =
//!     search::execute_search(&parser, &loaded.index, "кот И !мышь").unwrap();
//! println!("{}", search::format_ids(&ids));
//! ```

pub mod builder;
pub mod cli;
pub mod data_dir;
pub mod error;
pub mod evaluator;
pub mod handle;
pub mod index_cache;
pub mod inverted_index;
pub mod manifest;
pub mod query;
pub mod repl;
pub mod search;
pub mod tokenizer;

pub use builder::{BuildOptions, BuildReport, IndexOrigin, LoadedIndex};
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use handle::IndexHandle;
pub use index_cache::IndexSettings;
pub use inverted_index::{DocId, InvertedIndex};
pub use manifest::{Corpus, CorpusReadError};
pub use query::{Expr, QueryError, QueryParser, QuerySyntax};
pub use tokenizer::{Alphabet, Tokenizer};
