//! Session state: only the latest raw report text is held. Everything else is
//! recomputed from it on demand.

use tracing::{error, info};

use crate::error::ReportError;
use crate::profile::ReportProfile;
use crate::report::{analyze, Analysis};
use crate::source::ReportSource;

#[derive(Debug, Default)]
pub struct Session {
    raw_text: String,
}

impl Session {
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Replace the held text with manually supplied input.
    pub fn paste(&mut self, text: String) {
        self.raw_text = text;
    }

    /// Load a named report. On failure the previous text stays in place.
    pub fn select(&mut self, source: &dyn ReportSource, name: &str) -> Result<(), ReportError> {
        match source.get_text(name) {
            Ok(text) => {
                info!("loaded report {} ({} bytes)", name, text.len());
                self.raw_text = text;
                Ok(())
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    pub fn analyze(&self, profile: &ReportProfile) -> Result<Analysis, ReportError> {
        analyze(&self.raw_text, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn select_replaces_text() {
        let src = MemorySource::bundled();
        let mut s = Session::default();
        s.paste("old".into());
        s.select(&src, "nifty_wheel.txt").unwrap();
        assert!(s.raw_text().contains("Scrip"));
        let a = s.analyze(&ReportProfile::standard()).unwrap();
        assert_eq!(a.metrics.ledger.len(), 6);
    }

    #[test]
    fn failed_select_keeps_previous_text() {
        let src = MemorySource::new();
        let mut s = Session::default();
        s.paste("0 2024-01-25 PE 21600 206.95 13451.75 True".into());
        let err = s.select(&src, "missing.txt").unwrap_err();
        assert!(matches!(err, ReportError::UnknownReport(_)));
        assert!(s.analyze(&ReportProfile::standard()).is_ok());
    }

    #[test]
    fn fresh_session_has_no_data() {
        let s = Session::default();
        assert!(matches!(
            s.analyze(&ReportProfile::standard()),
            Err(ReportError::NoData)
        ));
    }
}
