use crate::application::ports::PageElement;

/// Multilingual "download" vocabulary matched against a candidate's text,
/// value, title and accessible label. The third-party page localizes its
/// UI, so the list covers the languages we have seen it serve.
pub const DOWNLOAD_KEYWORDS: &[&str] = &[
    "download",
    "descargar",
    "télécharger",
    "telecharger",
    "baixar",
    "herunterladen",
    "scarica",
    "скачать",
    "下载",
    "ダウンロード",
    "convert",
    "convertir",
    "start",
];

/// Heuristic policy for picking the trigger element on an uncontrolled
/// third-party page. Versioned with the crate; swap the keyword list or
/// thresholds here rather than inside the browser adapter so the policy
/// can be unit-tested against fixture element dumps.
#[derive(Debug, Clone)]
pub struct LocatorPolicy {
    pub keywords: Vec<String>,
    /// Minimum bounding-box size for the prominent-call-to-action fallback.
    pub min_trigger_width: f64,
    pub min_trigger_height: f64,
}

impl Default for LocatorPolicy {
    fn default() -> Self {
        Self {
            keywords: DOWNLOAD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            min_trigger_width: 80.0,
            min_trigger_height: 28.0,
        }
    }
}

impl LocatorPolicy {
    /// Pick the trigger among the page's clickable elements.
    ///
    /// First pass: the first visible element whose text, value, title or
    /// accessible label contains a download keyword (case-insensitive).
    /// Second pass: the first visible element whose bounding box clears
    /// the prominence thresholds. Returns the index into `elements`.
    pub fn select_trigger(&self, elements: &[PageElement]) -> Option<usize> {
        let keyword_match = elements
            .iter()
            .position(|el| el.visible && self.matches_keyword(el));
        if keyword_match.is_some() {
            return keyword_match;
        }

        elements.iter().position(|el| {
            el.visible && el.width >= self.min_trigger_width && el.height >= self.min_trigger_height
        })
    }

    fn matches_keyword(&self, el: &PageElement) -> bool {
        let haystacks = [&el.text, &el.value, &el.title, &el.aria_label];
        self.keywords.iter().any(|kw| {
            haystacks
                .iter()
                .any(|h| h.to_lowercase().contains(kw.as_str()))
        })
    }
}
