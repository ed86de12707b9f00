//! Writes pull request descriptions from the branch diff with an LLM and
//! keeps them up to date without losing what people wrote by hand.

pub mod cli_args;
pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod git;
pub mod github;
pub mod llm;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod setup;

pub use cli_args::Cli;
pub use error::{Error, Result};
