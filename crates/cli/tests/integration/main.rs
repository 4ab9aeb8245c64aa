//! End-to-end CLI tests running the build loop against fake external tools.

#![cfg(unix)]

mod build_tests;
mod common;
