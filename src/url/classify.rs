use crate::record::TopicLabel;

/// Default keyword table, in precedence order
pub const DEFAULT_TOPICS: &[(&str, TopicLabel)] = &[
    ("forecast", TopicLabel::Forecast),
    ("nowcast", TopicLabel::Nowcast),
    ("alert", TopicLabel::Alerts),
    ("ocean", TopicLabel::OceanApplications),
    ("cyclone", TopicLabel::Cyclone),
    ("monsoon", TopicLabel::Monsoon),
    ("weather", TopicLabel::Weather),
    ("energy", TopicLabel::Energy),
    ("rainfall", TopicLabel::Rainfall),
    ("data", TopicLabel::Dataset),
    ("archive", TopicLabel::Archive),
    ("announcement", TopicLabel::Announcement),
    ("satellite", TopicLabel::Satellite),
];

/// Maps URLs to topic labels using an ordered keyword table
///
/// Precedence is table order, not position in the URL: for
/// `.../ocean-data-portal/` the entry listed first wins.
#[derive(Debug, Clone)]
pub struct SourceClassifier {
    table: Vec<(String, TopicLabel)>,
}

impl SourceClassifier {
    /// Creates a classifier from (keyword, label) pairs in precedence order
    ///
    /// Keywords are trimmed and lower-cased so matching stays case-insensitive.
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TopicLabel)>,
        K: AsRef<str>,
    {
        let table = entries
            .into_iter()
            .map(|(keyword, label)| (keyword.as_ref().trim().to_lowercase(), label))
            .collect();
        Self { table }
    }

    /// Returns the label of the first table keyword found in the URL
    ///
    /// # Examples
    ///
    /// ```
    /// use page_harvest::url::SourceClassifier;
    /// use page_harvest::TopicLabel;
    ///
    /// let classifier = SourceClassifier::default();
    /// assert_eq!(classifier.classify("https://example.org/Forecast/today"), TopicLabel::Forecast);
    /// assert_eq!(classifier.classify("https://example.org/contact"), TopicLabel::General);
    /// ```
    pub fn classify(&self, url: &str) -> TopicLabel {
        let lowered = url.to_lowercase();
        self.table
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, label)| *label)
            .unwrap_or(TopicLabel::General)
    }

    /// Number of keywords in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for SourceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOPICS.iter().copied())
    }
}

/// Classifies a URL against the default keyword table
pub fn classify(url: &str) -> TopicLabel {
    let lowered = url.to_lowercase();
    DEFAULT_TOPICS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, label)| *label)
        .unwrap_or(TopicLabel::General)
}
