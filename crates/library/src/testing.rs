//! Canned pages for a small fake series, served by a [`MockFetcher`].

use crate::Komik;
use komik_config::Config;
use komik_fetch::MockFetcher;
use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub(crate) const DETAIL_URL: &str = "https://komikcast.bz/komik/one-piece";

pub(crate) fn chapter_link(number: u32) -> String {
    format!("chapter/one-piece-chapter-{number}")
}

pub(crate) fn chapter_url(number: u32) -> String {
    format!("https://komikcast.bz/{}", chapter_link(number))
}

pub(crate) fn image_url(chapter: u32, page: usize) -> String {
    format!("https://img.example/one-piece/{chapter}/{page}.jpg")
}

/// Detail page listing `chapters`, newest first like the site does.
pub(crate) fn detail_html(chapters: &[u32]) -> String {
    let items: String = chapters
        .iter()
        .rev()
        .map(|n| {
            format!(
                r#"<li class="komik_info-chapters-item">
                    <a class="chapter-link-item" href="https://komikcast.bz/{}/">Chapter {n}</a>
                    <div class="chapter-link-time">{n} days ago</div>
                </li>"#,
                chapter_link(*n)
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="komik_info">
            <h1 class="komik_info-content-body-title">One Piece</h1>
            <div class="komik_info-content-meta"><span>Released: 1997</span></div>
            <ul class="komik_info-chapters-wrapper">{items}</ul>
        </div></body></html>"#
    )
}

pub(crate) fn chapter_html(number: u32, images: usize) -> String {
    let images: String =
        (1..=images).map(|page| format!(r#"<img class="alignnone" src="{}">"#, image_url(number, page))).collect();
    format!(
        r#"<html><body>
            <div class="chapter_headpost"><h1>One Piece Chapter {number}</h1></div>
            <div class="main-reading-area">{images}</div>
        </body></html>"#
    )
}

pub(crate) fn listing_html(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|title| {
            let slug = title.to_lowercase().replace(' ', "-");
            format!(
                r#"<div class="list-update_item"><a href="https://komikcast.bz/komik/{slug}/">
                    <h3 class="title">{title}</h3><div class="chapter">Ch.1</div>
                </a></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="list-update_items">{items}</div></body></html>"#)
}

/// A series with `chapters` chapters of `images` pages each.
pub(crate) fn series(chapters: u32, images: usize) -> MockFetcher {
    let numbers: Vec<u32> = (1..=chapters).collect();
    let mut fetcher = MockFetcher::default().with_page(DETAIL_URL, detail_html(&numbers));
    for number in numbers {
        fetcher = fetcher.with_page(chapter_url(number), chapter_html(number, images));
        for page in 1..=images {
            fetcher = fetcher.with_page(image_url(number, page), format!("ch{number}p{page}"));
        }
    }
    fetcher
}

pub(crate) fn komik(fetcher: &Arc<MockFetcher>) -> Komik {
    Komik::new(&Config::default(), fetcher.clone()).unwrap()
}

/// Entry names and contents of a ZIP, in archive order.
pub(crate) fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            (file.name().to_string(), contents)
        })
        .collect()
}

/// Collects formatted `WARN` and above events for the current thread.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);
impl CapturedLogs {
    pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
