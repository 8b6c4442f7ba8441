//! Entity bindings for Github's v3 API
//! https://developer.github.com/v3/
//!
//! Every entity wraps the raw JSON Github returned (see [`Entity`]) together
//! with the [`Client`] and [`Auth`] it was fetched with, and exposes the
//! endpoints that hang off it.

#[macro_use]
mod macros;

pub mod client;
mod entity;
mod git;
mod org;
mod pull;
mod repo;
mod user;

pub use client::{Auth, Client, ClientBuilder, Error, Method, RequestOptions, Result};
pub use entity::{is_truthy, Entity, MISSING_KEY};
pub use git::*;
pub use org::*;
pub use pull::*;
pub use repo::*;
pub use user::*;
