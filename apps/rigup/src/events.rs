//! Event handling and progress display

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rigup_events::{
    AppEvent, BuildEvent, DownloadEvent, ExtractEvent, GeneralEvent, PackageEvent, RunEvent,
};
use std::collections::HashMap;
use std::time::Duration;

/// Event handler for progress display and user feedback
pub struct EventHandler {
    /// Multi-progress manager for concurrent progress bars
    multi_progress: MultiProgress,
    /// Active progress bars by URL
    download_bars: HashMap<String, ProgressBar>,
    /// Show debug events
    debug: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(debug: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            download_bars: HashMap::new(),
            debug,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Run(event) => self.handle_run_event(event),
            AppEvent::Download(event) => self.handle_download_event(event),
            AppEvent::Extract(event) => self.handle_extract_event(event),
            AppEvent::Build(event) => self.handle_build_event(event),
            AppEvent::Package(event) => self.handle_package_event(event),
            AppEvent::General(event) => self.handle_general_event(event),
        }
    }

    fn handle_run_event(&self, event: RunEvent) {
        match event {
            RunEvent::Started { plan, total_steps } => {
                if total_steps == 1 {
                    self.show_status(&format!("🔄 Running '{plan}' (1 step)"));
                } else {
                    self.show_status(&format!("🔄 Running '{plan}' ({total_steps} steps)"));
                }
            }
            RunEvent::StepStarted { step, index, total } => {
                self.show_status(&format!("📋 [{index}/{total}] {step}"));
            }
            RunEvent::StepSkipped { step, probe } => {
                self.show_status(&format!("ℹ️  {step} already satisfied ({probe})"));
            }
            RunEvent::ProbeInconclusive { step, reason } => {
                self.show_status(&format!("⚠️  Probe for {step} inconclusive: {reason}"));
            }
            RunEvent::StepProvisioned { step, duration } => {
                self.show_status(&format!(
                    "✅ Provisioned {step} ({})",
                    format_duration(duration)
                ));
            }
            RunEvent::StepFailed { step, failure } => {
                self.show_error(&format!("❌ {step} failed: {}", failure.message));
                if let Some(hint) = &failure.hint {
                    self.show_error(&format!("   Hint: {hint}"));
                }
            }
            RunEvent::Completed {
                provisioned,
                satisfied,
                duration,
            } => {
                self.show_status(&format!(
                    "✅ Done: {provisioned} provisioned, {satisfied} already satisfied ({})",
                    format_duration(duration)
                ));
            }
        }
    }

    fn handle_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, total_size } => {
                self.handle_download_started(&url, total_size);
            }
            DownloadEvent::Progress {
                url,
                bytes_downloaded,
                total_bytes,
            } => {
                self.handle_download_progress(&url, bytes_downloaded, total_bytes);
            }
            DownloadEvent::Completed { url, .. } => {
                self.handle_download_completed(&url);
            }
            DownloadEvent::AlreadyPresent { url: _, path } => {
                self.show_status(&format!("ℹ️  Artifact already present: {path}"));
            }
        }
    }

    fn handle_extract_event(&self, event: ExtractEvent) {
        match event {
            ExtractEvent::Started { archive, dest: _ } => {
                self.show_status(&format!("📦 Unpacking {archive}"));
            }
            ExtractEvent::Completed {
                archive: _,
                dest,
                duration,
            } => {
                self.show_status(&format!(
                    "✅ Unpacked into {dest} ({})",
                    format_duration(duration)
                ));
            }
            ExtractEvent::Skipped { dest } => {
                self.show_status(&format!("ℹ️  {dest} already exists, skipping unpack"));
            }
        }
    }

    fn handle_build_event(&self, event: BuildEvent) {
        match event {
            BuildEvent::CommandStarted { command, workdir } => {
                self.show_status(&format!("🔧 {workdir} > {command}"));
            }
            BuildEvent::CommandCompleted { command, duration } => {
                self.show_status(&format!("✅ {command} ({})", format_duration(duration)));
            }
        }
    }

    fn handle_package_event(&self, event: PackageEvent) {
        match event {
            PackageEvent::Probing { manager, total } => {
                if total == 1 {
                    self.show_status(&format!("🔍 Probing 1 package via {manager}"));
                } else {
                    self.show_status(&format!("🔍 Probing {total} packages via {manager}"));
                }
            }
            PackageEvent::Missing { names } => {
                if names.len() == 1 {
                    self.show_status(&format!("📥 Missing package: {}", names[0]));
                } else {
                    self.show_status(&format!("📥 Missing packages: {}", names.join(", ")));
                }
            }
            PackageEvent::InstallStarted { manager, packages } => {
                if packages.len() == 1 {
                    self.show_status(&format!("📦 Installing {} via {manager}", packages[0]));
                } else {
                    self.show_status(&format!(
                        "📦 Installing {} packages via {manager}",
                        packages.len()
                    ));
                }
            }
            PackageEvent::InstallCompleted {
                manager: _,
                installed,
                duration,
            } => {
                self.show_status(&format!(
                    "✅ Installed {installed} packages ({})",
                    format_duration(duration)
                ));
            }
        }
    }

    fn handle_general_event(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                if let Some(context) = context {
                    self.show_status(&format!("⚠️  {message} ({context})"));
                } else {
                    self.show_status(&format!("⚠️  {message}"));
                }
            }
            GeneralEvent::Error { message, details } => {
                if let Some(details) = details {
                    self.show_error(&format!("❌ {message}: {details}"));
                } else {
                    self.show_error(&format!("❌ {message}"));
                }
            }
            GeneralEvent::DebugLog {
                message,
                context: _,
            } => {
                if self.debug {
                    self.show_status(&format!("[debug] {message}"));
                }
            }
            GeneralEvent::OperationStarted { operation } => {
                self.show_status(&format!("🔄 {operation}"));
            }
            GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    /// Handle download started event
    fn handle_download_started(&mut self, url: &str, size: Option<u64>) {
        let filename = url.split('/').next_back().unwrap_or(url);

        let pb = if let Some(total) = size {
            ProgressBar::new(total)
        } else {
            ProgressBar::new_spinner()
        };

        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("#>-")
        );

        pb.set_message(format!("Downloading {filename}"));

        let pb = self.multi_progress.add(pb);
        self.download_bars.insert(url.to_string(), pb);
    }

    /// Handle download progress event
    fn handle_download_progress(&mut self, url: &str, bytes_downloaded: u64, total_bytes: Option<u64>) {
        if let Some(pb) = self.download_bars.get(url) {
            if let Some(total) = total_bytes {
                pb.set_length(total);
            }
            pb.set_position(bytes_downloaded);
        }
    }

    /// Handle download completed event
    fn handle_download_completed(&mut self, url: &str) {
        if let Some(pb) = self.download_bars.remove(url) {
            pb.finish_with_message("Downloaded");
        }
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        // Use multi_progress to avoid interfering with progress bars
        self.multi_progress.println(message).unwrap_or(());
    }

    /// Show error message
    fn show_error(&self, message: &str) {
        // Use multi_progress to avoid interfering with progress bars
        self.multi_progress.println(message).unwrap_or(());
    }
}

/// Format a duration for status lines
fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 {
        format!("{}m {}s", duration.as_secs() / 60, duration.as_secs() % 60)
    } else if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigup_events::FailureContext;

    #[test]
    fn test_download_bar_lifecycle() {
        let mut handler = EventHandler::new(false);
        let url = "https://example.com/tool-1.0.tar.gz";

        handler.handle_event(AppEvent::Download(DownloadEvent::Started {
            url: url.to_string(),
            total_size: Some(1024),
        }));
        assert!(handler.download_bars.contains_key(url));

        handler.handle_event(AppEvent::Download(DownloadEvent::Progress {
            url: url.to_string(),
            bytes_downloaded: 512,
            total_bytes: Some(1024),
        }));

        handler.handle_event(AppEvent::Download(DownloadEvent::Completed {
            url: url.to_string(),
            final_size: 1024,
            hash: "0".repeat(64),
        }));
        assert!(!handler.download_bars.contains_key(url));
    }

    #[test]
    fn test_step_events_render_without_panic() {
        let mut handler = EventHandler::new(true);

        handler.handle_event(AppEvent::Run(RunEvent::StepStarted {
            step: "ocr-engine".to_string(),
            index: 1,
            total: 3,
        }));
        handler.handle_event(AppEvent::Run(RunEvent::StepSkipped {
            step: "ocr-engine".to_string(),
            probe: "command tesseract -v".to_string(),
        }));
        handler.handle_event(AppEvent::Run(RunEvent::StepFailed {
            step: "ocr-engine".to_string(),
            failure: FailureContext::new(
                Some("BUILD_COMMAND_FAILED"),
                "command failed",
                Some("check the build log"),
                false,
            ),
        }));
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }
}
