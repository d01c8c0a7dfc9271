//! esm-hmr: client-side runtime for ESM Hot Module Replacement
//!
//! A running application receives out-of-band notifications that modules
//! changed on disk and decides, per module, whether to re-import just that
//! module and run the callbacks it registered, or to fall back to a full
//! reload.
//!
//! # Features
//!
//! - **Module registry**: one hot context per module, locked when the module re-executes
//! - **Accept/dispose/decline/invalidate**: the contract module code uses to opt in
//! - **Safe update ordering**: dispose before re-import before accept, callbacks
//!   drained exactly once
//! - **Reload fallback**: every failure degrades to a full reload
//!
//! # Quick Start
//!
//! ```no_run
//! use esm_hmr::prelude::*;
//! use std::rc::Rc;
//!
//! struct Loader;
//!
//! impl ModuleLoader for Loader {
//!     async fn import(&self, _specifier: &ImportSpecifier) -> anyhow::Result<ModuleNamespace> {
//!         Ok(ModuleNamespace::new())
//!     }
//! }
//!
//! # async fn demo() -> esm_hmr::Result<()> {
//! let host = Rc::new(|reason: &ReloadReason| println!("reload: {}", reason));
//! let registry = ModuleRegistry::new(host);
//! let hot = registry.create_hot_context("http://localhost/src/app.js")?;
//! hot.accept();
//!
//! let mut coordinator = UpdateCoordinator::new(registry, Loader, HmrConfig::default());
//! coordinator.handle_message(r#"{"type":"update","url":"/src/app.js"}"#).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Overview
//!
//! Events flow: [`transport`] → [`coordinator`] → [`protocol`] → [`hmr`], ending
//! in a reload or in accept callbacks
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Core** | [`hmr`], [`coordinator`] |
//! | **Wire** | [`protocol`], [`transport`] |
//! | **Ambient** | [`config`], [`error`](HmrError) |

pub mod config;
pub mod coordinator;
pub mod hmr;
pub mod prelude;
pub mod protocol;
pub mod transport;

mod error;

pub use config::HmrConfig;
pub use coordinator::{Dispatch, RunSummary, UpdateCoordinator};
pub use error::{HmrError, Result};
pub use hmr::{HotContext, ModuleId, ModuleRegistry};

/// esm-hmr version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
