//! Role-scoped view models for an LMS dashboard.
//!
//! A page run goes access check, [`scope::resolve_scope`],
//! [`shape::shape_view`], then [`filter::apply_filters`]; see
//! [`pipeline::run_page`].

pub mod config;
pub mod dataset;
pub mod db;
pub mod demo;
pub mod error;
pub mod filter;
pub mod identity;
pub mod models;
pub mod mutations;
pub mod pages;
pub mod pipeline;
pub mod report;
pub mod scope;
pub mod shape;

pub use dataset::Dataset;
pub use error::{AccessDenied, InvalidFilter, MutationError};
pub use filter::{apply_filters, FilterSet};
pub use identity::{IdentityDirectory, StaticDirectory};
pub use models::{Principal, Role};
pub use pipeline::{run_page, run_page_as, PageOutcome, PageView};
pub use scope::{resolve_scope, EntityKind};
pub use shape::{shape_view, MetricsPolicy, RoleView, ShapeContext};
