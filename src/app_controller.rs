use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::Config;
use crate::subtitle_processor::{SubtitleCollection, SubtitleFormat, output_filename};
use crate::translation::TranslationService;

// @module: Application controller for subtitle translation

/// Main application controller for subtitle translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Service translating the text column
    service: TranslationService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let service = TranslationService::new(config.provider, &config)?;
        Ok(Self { config, service })
    }

    /// Create a controller around an existing service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self { config, service }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one subtitle file into `output_dir`
    ///
    /// # Returns
    /// * `Ok(Some(path))` - the file written
    /// * `Ok(None)` - the output already exists and `force_overwrite` is off
    pub async fn run(
        &self,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = std::time::Instant::now();

        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let format = SubtitleFormat::from_path(input_file)?;

        let output_path = output_dir.join(output_filename(
            input_file,
            &self.config.target_language,
            self.config.output.mode,
            self.config.output.position,
        ));
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, translation already exists (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(None);
        }

        let content = fs::read_to_string(input_file)
            .with_context(|| format!("Failed to read subtitle file: {:?}", input_file))?;
        let subtitles = SubtitleCollection::parse(format, &content)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", input_file))?;
        info!("Loaded {} {} entries from {}", subtitles.entries.len(), format, input_file.display());

        let translations = self.translate_with_progress(&subtitles).await?;

        let output = subtitles.build(&translations, self.config.output.mode, self.config.output.position)?;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
        fs::write(&output_path, output)
            .with_context(|| format!("Failed to write output file: {:?}", output_path))?;

        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(Some(output_path))
    }

    /// Translate every subtitle file below `input_dir`, next to its source
    ///
    /// Files that are themselves translations into the target language are
    /// skipped. A failing file is logged and does not stop the others.
    ///
    /// # Returns
    /// * Number of files written
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<usize> {
        let start_time = std::time::Instant::now();
        let inputs: Vec<PathBuf> = WalkDir::new(input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|path| path.is_file() && SubtitleFormat::from_path(path).is_ok())
            .filter(|path| !self.is_translation_output(path))
            .collect();

        info!("Found {} subtitle files in {}", inputs.len(), input_dir.display());

        let mut written = 0;
        for path in &inputs {
            let output_dir = path.parent().unwrap_or(Path::new("."));
            match self.run(path, output_dir, force_overwrite).await {
                Ok(Some(_)) => written += 1,
                Ok(None) => {}
                Err(e) => error!("Failed to translate {}: {:#}", path.display(), e),
            }
        }

        info!(
            "Finished processing {} of {} files in {}",
            written,
            inputs.len(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(written)
    }

    /// Whether `path` looks like a file this tool produced
    fn is_translation_output(&self, path: &Path) -> bool {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let marker = format!("_{}", self.config.target_language.to_lowercase());
        stem.ends_with(&marker)
            || stem.ends_with(&format!("{}_bilingual", marker))
            || stem.ends_with(&format!("{}_bilingual_above", marker))
    }

    async fn translate_with_progress(&self, subtitles: &SubtitleCollection) -> Result<Vec<String>> {
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(self.service.provider_kind().display_name());

        let pb = progress_bar.clone();
        let service = self.service.clone().with_progress(move |completed, total| {
            pb.set_length(total as u64);
            pb.set_position(completed as u64);
        });

        let result = service
            .translate(
                &subtitles.texts(),
                &self.config.target_language,
                &self.config.source_language,
                &self.config.credentials(),
            )
            .await;

        progress_bar.finish_and_clear();
        Ok(result?)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
