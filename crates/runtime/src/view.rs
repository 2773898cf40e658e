use reqwest::Url;

/// Whether diagnostic (alter) data is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    Alter,
}

impl ViewMode {
    /// Reads `show=alter` from a page URL; anything unparsable is normal view.
    pub fn from_url(url: &str) -> Self {
        let Ok(url) = Url::parse(url) else {
            return ViewMode::Normal;
        };
        let alter = url
            .query_pairs()
            .any(|(key, value)| key == "show" && value == "alter");
        if alter { ViewMode::Alter } else { ViewMode::Normal }
    }

    pub fn is_alter(self) -> bool {
        self == ViewMode::Alter
    }
}

#[cfg(test)]
mod tests {
    use super::ViewMode;

    #[test]
    fn reads_show_alter_parameter() {
        assert_eq!(ViewMode::from_url("https://map.example.org/?show=alter"), ViewMode::Alter);
        assert_eq!(
            ViewMode::from_url("https://map.example.org/index.html?world=2&show=alter#x"),
            ViewMode::Alter
        );
        assert_eq!(ViewMode::from_url("https://map.example.org/?show=all"), ViewMode::Normal);
        assert_eq!(ViewMode::from_url("not a url"), ViewMode::Normal);
    }
}
