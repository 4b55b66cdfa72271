//! Virtual language-sample resources.
//!
//! `/languoid/samples/100` and `/languoid/samples/200` name the curated
//! 100- and 200-language samples. A [`Sample`] is not stored anywhere;
//! it is built from the URL token and its members are fetched only when
//! [`Sample::languages`] is awaited.

use wals_db::{Catalog, CatalogResult};
use wals_types::{LanguageWithGenus, SampleSize};

use crate::error::WebError;

/// One of the curated language samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Which sample.
    pub size: SampleSize,
    /// Display name, e.g. `100-language sample`.
    pub name: String,
}

impl Sample {
    /// Build the sample named by a URL `count` token.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::NotFound`] for anything but `100` and `200`.
    pub fn from_token(token: &str) -> Result<Self, WebError> {
        let size = SampleSize::from_token(token)
            .ok_or_else(|| WebError::not_found("sample", token))?;
        Ok(Self {
            size,
            name: size.name(),
        })
    }

    /// The sample's members, ordered by name, with genus and family.
    ///
    /// # Errors
    ///
    /// Propagates catalog failures.
    pub async fn languages<C: Catalog>(&self, catalog: &C) -> CatalogResult<Vec<LanguageWithGenus>> {
        catalog.sample_languages(self.size).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens() {
        let sample = Sample::from_token("100").unwrap();
        assert_eq!(sample.size, SampleSize::Hundred);
        assert_eq!(sample.name, "100-language sample");
        assert_eq!(Sample::from_token("200").unwrap().name, "200-language sample");
    }

    #[test]
    fn unknown_tokens_are_not_found() {
        for token in ["300", "0", "", "100.json", "abc"] {
            assert!(matches!(Sample::from_token(token), Err(WebError::NotFound(_))), "{token}");
        }
    }
}
