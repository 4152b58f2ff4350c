//! Report generators for docreport.
//!
//! Each module is one independent report over the documentation site:
//! release notes ([`whats_new`]), version statuses ([`versions`]), the
//! archive download ([`download`]), and the proposal index aggregation with
//! status cross-validation ([`peps`]). All of them run strictly
//! sequentially — one page in flight at a time.

pub mod download;
pub mod peps;
pub mod progress;
pub mod versions;
pub mod whats_new;

pub use download::download;
pub use peps::pep_report;
pub use progress::{ProgressReporter, SilentProgress};
pub use versions::latest_versions;
pub use whats_new::whats_new;

use docreport_shared::{DocReportError, Result};
use url::Url;

/// Resolve a scraped (possibly relative) href against its page's base URL.
pub(crate) fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|e| {
        DocReportError::parse(format!("cannot resolve {href:?} against {base}: {e}"))
    })
}
