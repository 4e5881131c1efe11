//! razornav: a navigation language server for ASP.NET MVC projects
//!
//! This crate turns textual references to MVC artifacts (view names, action
//! names, controller names, partial views, view components) found in C# and
//! Razor files into navigable links, resolving each reference to a concrete
//! file and, where it makes sense, a source line.
//!
//! # Overview
//!
//! The engine is a best-effort pattern matcher over raw text. There is no C#
//! or Razor parser underneath: references are recognized by a fixed catalog
//! of call-shape patterns and resolved by probing the framework's
//! conventional project layout (`Views/`, `Controllers/`, `Areas/`,
//! `Shared/`). A reference that cannot be resolved simply produces no link.
//!
//! # Architecture
//!
//! - [`patterns`]: the ordered pattern catalog, one regex per call shape
//! - [`extract`]: scans documents and yields references with identifier spans
//! - [`project`]: project-root discovery and area detection
//! - [`resolve`]: convention-based file lookup and declaration-line location
//! - [`links`]: combines the above into ranged, tooltipped navigation links
//! - [`navigation`]: bounded registries used by the server layer
//! - [`config`]: layered settings
//!
//! # Usage
//!
//! The crate backs the `razornav` binary, an LSP server speaking stdio. The
//! library surface is usable directly:
//!
//! ```ignore
//! use razornav::links::document_links;
//!
//! let links = document_links(&text, &file_path, &workspace_root);
//! ```

// The resolution engine
pub mod extract;
pub mod links;
pub mod patterns;
pub mod project;
pub mod resolve;

// Server support
pub mod cli;
pub mod config;
pub mod navigation;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
