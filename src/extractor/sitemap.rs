use quick_xml::events::Event;
use url::Url;

pub const SITE_MAP_PATH: &str = "sitemap.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapFormat {
    Xml,
    PlainText,
}

/// Parsed sitemap body. An index lists further sitemaps rather than pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    pub is_index: bool,
    pub locations: Vec<String>,
}

impl SitemapFormat {
    fn detect(text: &str) -> Self {
        match text.contains("<loc>") || text.contains("<loc ") {
            true => SitemapFormat::Xml,
            false => SitemapFormat::PlainText,
        }
    }

    fn extract_urls(&self, text: &str) -> Vec<String> {
        match self {
            SitemapFormat::Xml => Self::extract_from_xml(text),
            SitemapFormat::PlainText => Self::extract_from_plain_text(text),
        }
    }

    fn extract_from_xml(text: &str) -> Vec<String> {
        let mut reader = quick_xml::Reader::from_str(text);
        let mut urls = Vec::new();
        let mut buf = Vec::new();
        let mut current: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"loc" => {
                    current = Some(String::new());
                }
                Ok(Event::Text(e)) => {
                    if let Some(loc) = current.as_mut() {
                        match e.decode() {
                            Ok(txt) => loc.push_str(&txt),
                            Err(e) => {
                                tracing::warn!(
                                    "Invalid sitemap text at {}: {}",
                                    reader.buffer_position(),
                                    e
                                );
                            }
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(loc) = current.as_mut() {
                        loc.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"loc" => {
                    if let Some(loc) = current.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            urls.push(loc.to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    tracing::warn!("Stopping sitemap parse at {}: {}", reader.buffer_position(), e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }
        urls
    }

    fn extract_from_plain_text(text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter_map(|token| Url::parse(token).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .map(|url| url.to_string())
            .collect()
    }
}

/// Parse a sitemap body in either XML or plain-text form.
pub fn parse_sitemap(text: &str) -> SitemapDocument {
    let format = SitemapFormat::detect(text);
    tracing::debug!("Sitemap format detected: {:?}", format);
    SitemapDocument {
        is_index: format == SitemapFormat::Xml && text.contains("<sitemapindex"),
        locations: format.extract_urls(text),
    }
}

/// `Sitemap:` directives from a robots.txt body, in file order.
pub fn sitemaps_from_robots(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("sitemap")
                .then(|| value.trim().to_string())
        })
        .filter(|v| !v.is_empty())
        .collect()
}
