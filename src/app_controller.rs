use anyhow::Result;
use indexmap::IndexSet;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::aggregator::Aggregator;
use crate::app_config::Config;
use crate::archive_scanner::{ArchiveScanner, collect_archives};
use crate::dictionary::{CommunityDictionary, DictionaryIndex, PersonalDictionary};
use crate::errors::{AppError, DictionaryError};
use crate::file_utils::FileManager;
use crate::language_utils::is_valid_translation;
use crate::model::{ExtractionResult, SourceStats, SourceTag, TranslationResult};
use crate::pack_builder::{PackBuilder, PackFile, PackOptions};
use crate::regenerator::regenerate_robust;
use crate::resolution::{ResolutionEngine, ResolutionOptions};
use crate::translation::{BatchTranslator, CancellationFlag};

// @module: Application controller for a full pack build

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Whether every phase completed; pending keys do not count as failure
    pub success: bool,
    /// Human readable summary or failure reason
    pub message: String,
    /// Source distribution of the resolved keys
    pub stats: SourceStats,
    /// Written pack, on success
    pub output_path: Option<PathBuf>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Injected translator, built from config when absent
    translator: Option<BatchTranslator>,

    // @field: Shared cancellation signal
    cancel: CancellationFlag,

    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            translator: None,
            cancel: CancellationFlag::new(),
            show_progress: true,
        })
    }

    /// Use this translator instead of building one from the configuration
    pub fn with_translator(mut self, translator: BatchTranslator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Hide progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Configuration in effect
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle for cancelling a running build
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Run the whole pipeline and report the outcome
    pub async fn run(&self) -> RunReport {
        let start_time = Instant::now();

        match self.execute().await {
            Ok((output_path, stats)) => {
                let message = format!(
                    "Wrote {:?}: {} in {}",
                    output_path,
                    stats.summary(),
                    Self::format_duration(start_time.elapsed())
                );
                info!("{}", message);
                RunReport {
                    success: true,
                    message,
                    stats,
                    output_path: Some(output_path),
                }
            }
            Err(e) => {
                error!("Build failed: {}", e);
                RunReport {
                    success: false,
                    message: e.to_string(),
                    ..RunReport::default()
                }
            }
        }
    }

    async fn execute(&self) -> Result<(PathBuf, SourceStats), AppError> {
        self.config.validate()?;

        // Extraction
        let archives = collect_archives(&self.config.paths.mods_dir);
        let packs = match &self.config.paths.packs_dir {
            Some(dir) => collect_packs(dir)?,
            None => Vec::new(),
        };
        info!(
            "Found {} mod archive(s) and {} pack(s)",
            archives.len(),
            packs.len()
        );

        let scanner = ArchiveScanner::new(&self.config.original_locale, &self.config.target_locale);
        let extraction = Aggregator::new(scanner).aggregate(&archives, &packs)?;

        // Decision pass
        let (personal, community) = self.load_dictionaries()?;
        let options = ResolutionOptions {
            origin_lookup: self.config.resolution.personal_origin_lookup,
        };
        let mut result = ResolutionEngine::new(&personal, &community, options).resolve(&extraction);

        // Machine translation of the residue
        if self.config.translation.enabled {
            self.translate_pending(&mut result).await?;
        }

        // Output
        let files = Self::regenerate_files(&extraction, &result);
        let builder = PackBuilder::new(PackOptions {
            name: self.config.pack.name.clone(),
            description: self.config.pack.description.clone(),
            pack_format: self.config.pack.pack_format,
            icon: self.config.pack.icon.clone(),
            target_locale: self.config.target_locale.clone(),
            mode: self.config.pack.output_mode,
        });
        let output_path = builder.build(&self.config.paths.output_dir, &files)?;

        Ok((output_path, result.stats))
    }

    fn load_dictionaries(&self) -> Result<(DictionaryIndex, DictionaryIndex), DictionaryError> {
        let personal = PersonalDictionary::load(&self.config.paths.personal_dictionary)?.index();

        let community = match &self.config.paths.community_dictionary {
            Some(path) => CommunityDictionary::open(path, &self.config.paths.community_table)?,
            None => {
                debug!("No community dictionary configured");
                CommunityDictionary::empty()
            }
        };

        Ok((personal, community.into_index()))
    }

    async fn translate_pending(&self, result: &mut TranslationResult) -> Result<usize, AppError> {
        let pending: Vec<(String, String, String)> = result
            .pending()
            .into_iter()
            .filter(|entry| !entry.original.trim().is_empty())
            .map(|entry| (entry.namespace.clone(), entry.key.clone(), entry.original.clone()))
            .collect();
        if pending.is_empty() {
            info!("Nothing left to translate");
            return Ok(0);
        }

        let built;
        let translator = match &self.translator {
            Some(translator) => translator,
            None => {
                built = BatchTranslator::from_config(&self.config)?;
                &built
            }
        };

        let texts: Vec<String> = pending
            .iter()
            .map(|(_, _, original)| original.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        info!(
            "Translating {} pending key(s) ({} unique string(s))",
            pending.len(),
            texts.len()
        );

        let progress_bar = self.progress_bar();
        let callback_bar = progress_bar.clone();
        let translations = translator
            .translate_all(&texts, &self.cancel, move |current, total| {
                callback_bar.set_length(total as u64);
                callback_bar.set_position(current as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        if self.cancel.is_cancelled() {
            warn!("Translation cancelled, keeping dictionary results only");
        }

        let positions: HashMap<&str, usize> = texts
            .iter()
            .enumerate()
            .map(|(position, text)| (text.as_str(), position))
            .collect();

        let mut applied = 0;
        for (namespace, key, original) in &pending {
            let Some(&position) = positions.get(original.as_str()) else {
                continue;
            };
            match translations.get(position).and_then(Option::as_deref) {
                Some(translation) if is_valid_translation(translation) => {
                    if result.apply(namespace, key, translation, SourceTag::Ai) {
                        applied += 1;
                    }
                }
                Some(_) => debug!("Discarding unusable translation for '{}'", key),
                None => {}
            }
        }

        let (hits, misses, _) = translator.cache().stats();
        info!(
            "Applied {} machine translation(s); cache {} hit(s), {} miss(es)",
            applied, hits, misses
        );
        Ok(applied)
    }

    fn regenerate_files(extraction: &ExtractionResult, result: &TranslationResult) -> Vec<PackFile> {
        extraction
            .namespaces
            .iter()
            .filter_map(|(namespace, info)| {
                let translations = result.translation_map(namespace);
                if translations.is_empty() {
                    debug!("Namespace '{}' has no translations, skipping", namespace);
                    return None;
                }
                Some(PackFile {
                    asset_namespace: info.asset_namespace.clone(),
                    format: info.format,
                    content: regenerate_robust(&info.raw_text, info.format, &translations),
                })
            })
            .collect()
    }

    fn progress_bar(&self) -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        if !self.show_progress {
            progress_bar.set_draw_target(ProgressDrawTarget::hidden());
            return progress_bar;
        }

        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}

/// Third-party packs: archives and unpacked directories directly inside `dir`
fn collect_packs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut packs = FileManager::find_files(dir, &["zip", "jar"], false)?;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if FileManager::dir_exists(&path) {
            packs.push(path);
        }
    }
    packs.sort();
    Ok(packs)
}
