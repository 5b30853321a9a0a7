// A small CLI utility that downloads MICASE transcripts as XML into a target directory.
//
// The corpus browse page links to one page per transcript; each of those links to the
// full XML. Every request after the first waits out a fixed delay to keep the load on the
// corpus server low.

use anyhow::{Context, Result};
use clap::Parser;
use html_escape::decode_html_entities;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const BROWSE_URL: &str = "https://quod.lib.umich.edu/cgi/c/corpus/corpus?c=micase&cc=micase&type=browse";

/// Anchor text of the XML download link on a transcript page.
const DOWNLOAD_LINK_TEXT: &str = "Download entire transcript in XML";

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
        .expect("anchor pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

#[derive(Parser, Debug)]
#[command(name = "micase-fetch")]
#[command(about = "Download MICASE transcripts as XML", long_about = None)]
struct Args {
    /// Corpus browse page listing the transcripts.
    #[arg(long, default_value = BROWSE_URL)]
    url: String,

    /// Target directory to store transcripts (created if missing).
    #[arg(long, default_value = "./XMLs")]
    dir: PathBuf,

    /// Minimum pause between requests to the corpus server, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    delay_ms: u64,
}

/// Spaces out requests so that consecutive ones start at least `delay` apart.
#[derive(Debug)]
struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    /// Block until the next request may go out. The first call never waits.
    fn wait(&mut self) {
        if let Some(last) = self.last {
            let remaining = self.delay.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// What happened to one transcript link.
#[derive(Debug, PartialEq, Eq)]
enum Fetched {
    Saved(PathBuf),
    AlreadyExists(PathBuf),
    NoDownloadLink,
}

fn main() -> Result<()> {
    micase::logging::init_with_default(tracing::level_filters::LevelFilter::WARN);
    let args = Args::parse();

    fs::create_dir_all(&args.dir)
        .with_context(|| format!("failed to create target dir: {}", args.dir.display()))?;

    let base = Url::parse(&args.url).with_context(|| format!("invalid browse url: {}", args.url))?;

    let client = Client::builder()
        .user_agent("micase-fetch")
        .build()
        .context("failed to build HTTP client")?;

    let mut throttle = Throttle::new(Duration::from_millis(args.delay_ms));
    let index = fetch_text(&client, &mut throttle, base.as_str())?;
    let links = transcript_links(&index);
    if links.is_empty() {
        println!("No transcript links found on {}", args.url);
        return Ok(());
    }

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {pos}/{len} {bar:40.cyan/blue} {msg}")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut saved = 0usize;
    let mut failed = 0usize;
    for link in &links {
        pb.set_message(link.clone());
        match fetch_transcript(&client, &mut throttle, &base, link, &args.dir) {
            Ok(Fetched::Saved(path)) => {
                saved += 1;
                pb.println(format!("Downloaded XML file: {}", path.display()));
            }
            Ok(Fetched::AlreadyExists(path)) => {
                info!(path = %path.display(), "already exists");
            }
            Ok(Fetched::NoDownloadLink) => {
                failed += 1;
                warn!(%link, "download XML link not found");
                pb.println(format!("Download XML link not found on: {link}"));
            }
            Err(err) => {
                failed += 1;
                error!(%link, error = %format!("{err:#}"), "transcript download failed");
                pb.println(format!("Failed to download {link}: {err:#}"));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Downloaded {saved} XML files ({failed} failed) into {}",
        args.dir.display()
    );
    Ok(())
}

fn fetch_transcript(
    client: &Client,
    throttle: &mut Throttle,
    base: &Url,
    link: &str,
    dir: &Path,
) -> Result<Fetched> {
    let page_url = base
        .join(link)
        .with_context(|| format!("invalid transcript link: {link}"))?;
    let dest_path = dir.join(format!("{}.xml", document_id(page_url.as_str())));
    if dest_path.exists() {
        return Ok(Fetched::AlreadyExists(dest_path));
    }

    let page = fetch_text(client, throttle, page_url.as_str())?;
    let Some(xml_link) = download_link(&page) else {
        return Ok(Fetched::NoDownloadLink);
    };
    let xml_url = page_url
        .join(&xml_link)
        .with_context(|| format!("invalid download link: {xml_link}"))?;

    throttle.wait();
    let resp = client
        .get(xml_url.as_str())
        .send()
        .with_context(|| format!("request failed: {xml_url}"))?
        .error_for_status()
        .with_context(|| format!("download failed (bad status): {xml_url}"))?;

    download_to_path_with_reader(resp, &dest_path)?;
    Ok(Fetched::Saved(dest_path))
}

fn fetch_text(client: &Client, throttle: &mut Throttle, url: &str) -> Result<String> {
    throttle.wait();
    client
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status: {url}"))?
        .text()
        .with_context(|| format!("failed to read body: {url}"))
}

/// Every anchor `(href, text)` on a page, in page order.
fn anchors(html: &str) -> Vec<(String, String)> {
    ANCHOR
        .captures_iter(html)
        .map(|cap| {
            let href = decode_html_entities(&cap[1]).into_owned();
            let text = decode_html_entities(TAG.replace_all(&cap[2], "").trim()).into_owned();
            (href, text)
        })
        .collect()
}

/// Links on the browse page that lead to a transcript page, without duplicates.
fn transcript_links(html: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for (href, _) in anchors(html) {
        if href.contains("transcript") && !links.contains(&href) {
            links.push(href);
        }
    }
    links
}

/// The XML download link on a transcript page, if there is one.
fn download_link(html: &str) -> Option<String> {
    anchors(html)
        .into_iter()
        .find(|(_, text)| text == DOWNLOAD_LINK_TEXT)
        .map(|(href, _)| href)
}

/// The transcript id is whatever follows the last `;id=` in its page URL.
fn document_id(transcript_url: &str) -> &str {
    transcript_url
        .rsplit_once(";id=")
        .map_or(transcript_url, |(_, id)| id)
}

/// Write a response body into `dest_path` safely:
/// - write to `dest_path.part`
/// - fsync + rename to final path
fn download_to_path_with_reader<R: Read>(mut reader: R, dest_path: &Path) -> Result<()> {
    let tmp_path = PathBuf::from(format!("{}.part", dest_path.display()));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
        }

        file.sync_all()?;

        fs::rename(&tmp_path, dest_path)
            .with_context(|| format!("failed to move into place: {}", dest_path.display()))?;

        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}
