//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//! ```

// Core analysis types
pub use crate::error::{DeadcssError, DeadcssResult};
pub use crate::extract::{extract_selectors, SelectorSet};
pub use crate::pipeline::{AnalysisResult, EvidencePolicy};

// Builder API
pub use crate::builder::Deadcss;

// File scanning
pub use crate::scan::{collect_files, collect_files_with_excludes, ExtensionFilter};

// Configuration
pub use crate::config::{load_config, DeadcssConfig};

// Reporting
pub use crate::report::{print_json, print_plain, Report};
