//! Optional exports written alongside the text report.
//!
//! # Submodules
//!
//! - [`json`]: the notable offers, ranked, as a JSON array
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── results_2025-05-06_14-03-59.txt    # always
//! └── results_2025-05-06_14-03-59.json   # with --json
//! ```

pub mod json;
