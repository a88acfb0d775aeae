//! `cwatm_settings` - round-trip editing engine for CWatM settings files
//!
//! Settings text is split into sections, rendered with collapsible `[+]`/`[-]`
//! section headers, edited piecemeal, and reconstructed byte for byte on
//! save. Collapsed bodies are never lost: they are restored from the
//! pending-edit cache or, failing that, from the last known document.
//!
//! ```
//! use cwatm_settings::EditSession;
//!
//! let text = "[OPTIONS]\nfoo = True\nbar = False\n";
//! let mut session = EditSession::from_text(text, "settings.ini");
//! session.collapse("[OPTIONS]")?;
//! assert_eq!(session.view().text(), "[+] [OPTIONS]");
//! assert_eq!(session.clean_text(), text);
//! # Ok::<(), cwatm_settings::Error>(())
//! ```

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)] // SectionId, SessionEvent etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::needless_pass_by_value)] // Output readers move into forwarding threads

pub mod ansi;
pub mod color;
pub mod config;
pub mod display;
pub mod document;
pub mod error;
pub mod event;
pub mod fields;
pub mod highlight;
pub mod io;
pub mod options;
pub mod placeholder;
pub mod reconstruct;
pub mod runner;
pub mod session;
pub mod style;
pub mod text;

// Re-export core types at crate root
pub use color::Rgba;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use event::{EventSink, SessionEvent};
pub use style::{Style, TextAttributes};

pub use display::{Display, DisplayLine, Marker, ViewAnchor};
pub use document::{ConfigDocument, Section, SectionId, SectionKey, is_section_header};
pub use highlight::{LineClass, LineKind, Theme, TokenKind, classify_line, tokenize_line};
pub use reconstruct::{Reconstruction, reconstruct, strip_markers};
pub use session::{EditSession, PendingEditCache};
pub use text::ViewBuffer;

pub use fields::{DateRange, FieldValues, SimulationDates, parse_date};
pub use io::{FileStore, LoadedFile, SaveReport};
pub use options::{BoolOptions, OptionKey};
pub use placeholder::{PlaceholderResolver, Resolution, UnresolvedPlaceholder, resolve_placeholders};
pub use runner::{
    CancelToken, CommandRunner, ModelRunner, RunEvent, RunHandle, RunOutcome, RunRequest,
    StopOutcome,
};
