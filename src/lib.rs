//! sheetbox - A local-first API for organizing scanned revision sheets
//!
//! This crate organizes imported revision sheets (images and PDFs) into
//! user-created folders, with:
//! - Swappable blob storage backends (local filesystem, redb)
//! - A single-source-of-truth repository over two JSON collection blobs
//! - An import flow driving folder choice, asset acquisition, persistence
//! - REST API with global search and per-folder listings

pub mod api;
pub mod blob_store;
pub mod config;
pub mod import;
pub mod search;
pub mod storage;

use std::sync::Arc;

use config::Config;
use import::ImportFlow;
use storage::Repository;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub repo: Arc<Repository>,
    pub import: ImportFlow,
}
