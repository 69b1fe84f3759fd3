/*!
 * wixgen - Generate a WiX installer description from a build directory
 *
 * The build directory is walked once. Every directory becomes a nested
 * `Directory` element and every file a `Component` with a fresh GUID, all
 * listed in the installer's single feature.
 */

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod path;
pub mod reconciler;
pub mod registry;
pub mod report;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;


// Re-export main components for easier access
pub use config::Config;
pub use error::{Result, WixGenError};
pub use generator::Generator;
pub use path::{divergence, normalize, NormalizedPath, PathDivergence};
pub use reconciler::{MarkupSink, NestingReconciler};
pub use registry::IdentityRegistry;
pub use report::{GenerationReport, ReportFormat, Reporter};
pub use types::{ContainerFrame, DirectoryVisit, LeafRecord, ProductInfo};
pub use walker::{TreeWalker, WalkOptions, WalkOrder};
pub use writer::WixWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
