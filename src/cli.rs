use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use zipmirror::{
    downloader::DownloaderBuilder, mirror::MirrorBuilder, ArchiveReport, HttpClientConfig,
    Result, StyleOptions,
};

/// Download every .zip file linked from a directory page and extract each
/// into its own folder.
#[derive(Debug, Parser)]
#[command(name = "zipmirror", version)]
#[command(about = "Mirror a web directory of .zip archives and unpack them", long_about = None)]
pub struct Cli {
    /// Directory page to scan for .zip links
    /// (e.g. https://archive.org/download/SomeCollection/).
    #[arg(long)]
    pub base_url: Url,

    /// Destination folder for downloads and extractions.
    #[arg(long)]
    pub dest: PathBuf,

    /// Skip ZIP files that already exist locally.
    #[arg(long)]
    pub skip_existing: bool,

    /// Re-extract even if the target folder already exists.
    #[arg(long)]
    pub force_reextract: bool,

    /// Maximum download attempts per archive.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Connect and per-read timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Hide the progress bars.
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Run the mirror described by the command line.
    ///
    /// Pipeline messages go to stdout as they happen. Only a fault that
    /// stops the whole run is returned.
    pub async fn run(self) -> Result<Vec<ArchiveReport>> {
        let timeout = Duration::from_secs(self.timeout);

        let mut downloader = DownloaderBuilder::new()
            .retries(self.retries)
            .timeout(timeout);
        if self.no_progress {
            downloader = downloader.style_options(StyleOptions::hidden());
        }

        let mirror = MirrorBuilder::new(self.base_url, self.dest)
            .skip_existing(self.skip_existing)
            .force_reextract(self.force_reextract)
            .downloader(downloader)
            .index_client(HttpClientConfig {
                timeout,
                ..HttpClientConfig::default()
            })
            .on_event(|event| println!("{}", event))
            .build()?;

        tracing::debug!(?mirror, "starting mirror run");
        mirror.run().await
    }
}
