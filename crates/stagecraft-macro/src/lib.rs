//! # stagecraft-macro
//!
//! A template macro that expands compact pipeline declarations.
//!
//! Resources whose `Type` starts with `<namespace>::` are owned by the macro.
//! They are validated against a JSON [`Schema`](stagecraft_schema::Schema)
//! and, when every one of them is valid, rewritten into the deployment
//! engine's native pipeline shape. Everything else in the template passes
//! through untouched.
//!
//! ```rust
//! use serde_json::json;
//! use stagecraft_core::{MacroConfig, MacroRequest};
//! use stagecraft_macro::MacroProcessor;
//!
//! let processor = MacroProcessor::new(MacroConfig::new("Acme").unwrap()).unwrap();
//! let fragment = json!({
//!     "Resources": {
//!         "Pipe": {
//!             "Type": "Acme::Pipeline",
//!             "Properties": {
//!                 "Stages": [{"Fetch": {"Type": "S3", "Configuration": {"S3Bucket": "b"}}}]
//!             }
//!         }
//!     }
//! });
//!
//! let response = processor.process(MacroRequest::new("req-1", fragment)).unwrap();
//! assert!(response.is_success());
//! assert_eq!(
//!     response.fragment["Resources"]["Pipe"]["Properties"]["Stages"][0]["Actions"][0]["Name"],
//!     "Fetch"
//! );
//! ```

pub mod consistency;
pub mod error;
pub mod filter;
pub mod processor;
pub mod schema;
pub mod transform;

pub use consistency::{ensure_resource_types_match, ensure_stage_types_match};
pub use error::MacroError;
pub use filter::filter_resources;
pub use processor::MacroProcessor;
pub use schema::{RESOURCE_TYPE_PATH, STAGE_TYPE_PATH, macro_schema};
pub use transform::{PipelineTransformer, ResourceTransformer, TransformerRegistry};
