/*!
 * # modlang - translation resource packs for game mods
 *
 * A Rust library that builds translation resource packs for a directory of
 * game mods.
 *
 * ## Features
 *
 * - Extract language files (`.json` and `.lang`) from mod archives
 * - Merge bundled translations and third-party resource packs
 * - Resolve every key through an ordered cascade of sources:
 *   - translations bundled with the mod
 *   - a personal dictionary, by key and by original text
 *   - a community dictionary store, by key and by original text
 *   - third-party packs
 * - Machine-translate the remainder with rotating API keys, caching and retries
 * - Regenerate files that keep the layout of the originals byte for byte
 * - Write the pack as a directory or a zip archive
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `archive_scanner`: Locating language files inside archives and directories
 * - `lang_file`: Span scanner for both language file formats
 * - `aggregator`: Merging scanned files into namespaces
 * - `dictionary`: Personal and community dictionaries
 * - `resolution`: The source cascade
 * - `translation`: Batch machine translation:
 *   - `translation::batch`: Batching, worker pool and retries
 *   - `translation::key_pool`: API key rotation and cooldowns
 *   - `translation::cache`: Caching of translated strings
 *   - `translation::response`: Parsing model answers
 * - `regenerator`: Rewriting templates with translated values
 * - `pack_builder`: Manifest and pack output
 * - `providers`: Chat completion clients
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod aggregator;
pub mod app_config;
pub mod app_controller;
pub mod archive_scanner;
pub mod dictionary;
pub mod errors;
pub mod file_utils;
pub mod lang_file;
pub mod language_utils;
pub mod model;
pub mod pack_builder;
pub mod providers;
pub mod regenerator;
pub mod resolution;
pub mod translation;
pub mod version;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunReport};
pub use errors::{AppError, BuildError, ConfigError, DictionaryError, ExtractionError, ProviderError};
pub use model::{ExtractionResult, LangFormat, LanguageEntry, SourceTag, TranslationResult};
pub use resolution::ResolutionEngine;
pub use translation::{BatchTranslator, CancellationFlag};
