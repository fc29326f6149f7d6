//! Label sheet generation: records in, TikZ document out.
//!
//! Records are walked through a [`LayoutEngine`] that assigns every label a
//! cell on the stock described by a [`Template`], rendered by a
//! [`Renderer`], and stitched into a [`Sheet`] ready for the TeX engine.

pub mod document;
pub mod error;
pub mod layout;
pub mod qr;
pub mod record;
pub mod render;
pub mod seal;
pub mod template;

pub use document::Sheet;
pub use error::{LabelError, Result};
pub use layout::{Grid, LayoutCursor, LayoutEngine, Placement, Transition};
pub use qr::{DEFAULT_URL_PREFIX, QrPayload};
pub use record::{Record, read_records, read_records_from_path};
pub use render::{Asset, RenderOptions, RenderedCell, Renderer};
pub use template::{Catalog, Layout, Template};
