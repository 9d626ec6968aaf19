//! home-survey-rust
//!
//! ガイド付き住宅エネルギー調査CLIの実装クレート。
//! ウィザードの中核ロジックは home-survey-common 側にある。

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod photo_file;
pub mod runner;
pub mod scanner;
pub mod session_file;
pub mod validator;
