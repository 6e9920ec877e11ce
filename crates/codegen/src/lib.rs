//! # Tarn Code Generation
//!
//! Turns rewritten tarn IR into Kotlin source text.
//!
//! ## Pipeline position
//!
//! 1. **Input**: a [`SourceFile`] after every transformation pass, plus the
//!    frozen [`Registry`] the passes read
//! 2. **Emission**: recursive descent in [`emitter`], one function per node kind
//! 3. **Output**: a [`Translation`] holding the text and the file's output
//!    redirections, which the caller writes out
//!
//! ## Usage
//!
//! ```
//! use tarn_codegen::{EmitConfig, emit};
//! use tarn_core::{Registry, SourceFile};
//!
//! let translation = emit(&SourceFile::new("empty.swift"), &Registry::default(), &EmitConfig::default());
//! assert!(translation.text.is_empty());
//! ```

pub mod emitter;
pub mod error;
pub mod names;
pub mod output;
pub mod types;

pub use emitter::{EmitConfig, Emitter};
pub use error::{OutputError, OutputResult};
pub use output::Translation;
pub use types::translate_type;

use tarn_core::{Registry, SourceFile};

/// Emit one file.
pub fn emit(file: &SourceFile, registry: &Registry, config: &EmitConfig) -> Translation {
    log::debug!("emitting {}", file.path.display());
    let text = Emitter::new(registry, config).emit_file(file);
    let translation = Translation {
        source: file.path.clone(),
        text,
        outputs: file.outputs.clone(),
    };
    log::trace!(
        "{}: {} bytes, {} markers",
        file.path.display(),
        translation.text.len(),
        translation.marker_count()
    );
    translation
}
