//! Chat channels for todobot.
//!
//! Only the terminal is supported: one line in, one reply out.

pub mod cli;

pub use cli::{ChannelError, CliChannel, EXIT_WORDS, PROMPT, is_exit_word};
