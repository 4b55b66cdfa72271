//! The route table: logical route names mapped to URL path patterns.
//!
//! Patterns use `{name}` and `{name:regex}` placeholders. A placeholder
//! without a regex matches one path segment (`[^/]+`). The same compiled
//! [`Pattern`] is used to match incoming paths (legacy redirects) and to
//! build canonical URLs ([`RouteTable::route_url`]).

use std::collections::BTreeMap;

use regex::Regex;

/// Placeholder regex used when a pattern does not give one.
const DEFAULT_SEGMENT: &str = "[^/]+";

/// Placeholder values extracted from a matched path.
pub type MatchDict = BTreeMap<String, String>;

/// Errors raised while compiling patterns or building URLs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A pattern could not be parsed or compiled.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A URL was built without a value for one of its placeholders.
    #[error("missing parameter {param:?} for pattern {pattern:?}")]
    MissingParam {
        /// The pattern being built.
        pattern: String,
        /// The placeholder without a value.
        param: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(String),
}

/// A compiled URL pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    parts: Vec<Part>,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern such as `/datapoint/{fid}/wals_code_{lid}`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] on unbalanced braces, empty
    /// or non-identifier placeholder names, or an invalid placeholder regex.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        let mut parts = Vec::new();
        let mut expr = String::from("^");
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c == '}' {
                return Err(invalid("unbalanced '}'"));
            }
            if c != '{' {
                literal.push(c);
                continue;
            }

            // Placeholder: read up to the matching brace. Regexes may
            // contain their own `{m,n}` quantifiers.
            let mut body = String::new();
            let mut depth = 1_u32;
            loop {
                let Some(inner) = chars.next() else {
                    return Err(invalid("unterminated placeholder"));
                };
                match inner {
                    '{' => depth = depth.saturating_add(1),
                    '}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                body.push(inner);
            }

            let (name, segment) = body
                .split_once(':')
                .unwrap_or((body.as_str(), DEFAULT_SEGMENT));
            if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
                return Err(invalid("placeholder names must be identifiers"));
            }

            if !literal.is_empty() {
                expr.push_str(&regex::escape(&literal));
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            expr.push_str("(?P<");
            expr.push_str(name);
            expr.push('>');
            expr.push_str(segment);
            expr.push(')');
            parts.push(Part::Placeholder(name.to_owned()));
        }

        if !literal.is_empty() {
            expr.push_str(&regex::escape(&literal));
            parts.push(Part::Literal(literal));
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: pattern.to_owned(),
            parts,
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a full request path, returning the placeholder values.
    pub fn matches(&self, path: &str) -> Option<MatchDict> {
        let captures = self.regex.captures(path)?;
        Some(
            self.placeholders()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_owned(), m.as_str().to_owned()))
                })
                .collect(),
        )
    }

    /// Substitute placeholder values into the pattern.
    ///
    /// Values are inserted verbatim; they are not checked against the
    /// placeholder regex.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingParam`] if a placeholder has no value.
    pub fn build(&self, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let mut path = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => path.push_str(text),
                Part::Placeholder(name) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| RouteError::MissingParam {
                            pattern: self.source.clone(),
                            param: name.clone(),
                        })?;
                    path.push_str(value);
                }
            }
        }
        Ok(path)
    }

    fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Placeholder(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Route names
// ---------------------------------------------------------------------------

/// Every named route the application can build URLs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteName {
    /// Home page.
    Dataset,
    /// Dataset metadata in another format.
    DatasetAlt,
    /// Language listing.
    Languages,
    /// Language detail.
    Language,
    /// Family listing (shares the language listing URL).
    Familys,
    /// Family detail.
    Family,
    /// Bibliography listing.
    Sources,
    /// Bibliography record.
    Source,
    /// Feature listing.
    Parameters,
    /// Feature detail.
    Parameter,
    /// Example listing.
    Sentences,
    /// Example detail.
    Sentence,
    /// Chapter listing.
    Contributions,
    /// Chapter detail.
    Contribution,
    /// Country listing.
    Countrys,
    /// Country detail.
    Country,
    /// Author listing.
    Contributors,
    /// Author detail.
    Contributor,
    /// Datapoint detail.
    ValueSet,
    /// Datapoint listing.
    Values,
    /// Legal notice.
    Legal,
    /// Credits page.
    Credits,
    /// OAI-PMH endpoint for languages.
    Olac,
    /// OAI-PMH endpoint for the bibliography.
    OlacSource,
    /// Language sample.
    Sample,
    /// Feature summary popup.
    FeatureInfo,
    /// Genealogy overview.
    Genealogy,
    /// Recent datapoint changes.
    Changes,
    /// Index of the per-resource sitemaps.
    SitemapIndex,
    /// One chunk of the sitemap for a resource kind.
    Sitemap,
}

/// Route names with their URL patterns, in registration order.
pub const ROUTE_PATTERNS: &[(RouteName, &str)] = &[
    (RouteName::Dataset, "/"),
    (RouteName::DatasetAlt, "/void.{ext}"),
    (RouteName::Languages, "/languoid"),
    (RouteName::Language, r"/languoid/lect/wals_code_{id:[^/\.]+}"),
    (RouteName::Familys, "/languoid"),
    (RouteName::Family, r"/languoid/family/{id:[^/\.]+}"),
    (RouteName::Sources, "/refdb"),
    (RouteName::Source, r"/refdb/record/{id:[^/\.]+}"),
    (RouteName::Parameters, "/feature"),
    (RouteName::Parameter, r"/feature/{id:[^/\.]+}"),
    (RouteName::Sentences, "/example"),
    (RouteName::Sentence, r"/example/{id:[^/\.]+}"),
    (RouteName::Contributions, "/chapter"),
    (RouteName::Contribution, r"/chapter/{id:[^/\.]+}"),
    (RouteName::Countrys, "/country"),
    (RouteName::Country, r"/country/{id:[^/\.]+}"),
    (RouteName::Contributors, "/author"),
    (RouteName::Contributor, r"/author/{id:[^/\.]+}"),
    (RouteName::ValueSet, r"/valuesets/{id:[^/\.]+}"),
    (RouteName::Values, "/values"),
    (RouteName::Legal, "/about/legal"),
    (RouteName::Credits, "/about/credits"),
    (RouteName::Olac, "/languoid/oai"),
    (RouteName::OlacSource, "/refdb_oai"),
    (RouteName::Sample, "/languoid/samples/{count}"),
    (RouteName::FeatureInfo, "/feature-info/{id}"),
    (RouteName::Genealogy, "/languoid/genealogy"),
    (RouteName::Changes, "/changes"),
    (RouteName::SitemapIndex, "/sitemap.xml"),
    (RouteName::Sitemap, "/sitemap.{rsc:[a-z]+}.{n:[0-9]+}.xml"),
];

impl RouteName {
    /// The route's registered name (`dataset_alt`, `olac.source`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::DatasetAlt => "dataset_alt",
            Self::Languages => "languages",
            Self::Language => "language",
            Self::Familys => "familys",
            Self::Family => "family",
            Self::Sources => "sources",
            Self::Source => "source",
            Self::Parameters => "parameters",
            Self::Parameter => "parameter",
            Self::Sentences => "sentences",
            Self::Sentence => "sentence",
            Self::Contributions => "contributions",
            Self::Contribution => "contribution",
            Self::Countrys => "countrys",
            Self::Country => "country",
            Self::Contributors => "contributors",
            Self::Contributor => "contributor",
            Self::ValueSet => "valueset",
            Self::Values => "values",
            Self::Legal => "legal",
            Self::Credits => "credits",
            Self::Olac => "olac",
            Self::OlacSource => "olac.source",
            Self::Sample => "sample",
            Self::FeatureInfo => "feature_info",
            Self::Genealogy => "genealogy",
            Self::Changes => "changes",
            Self::SitemapIndex => "sitemapindex",
            Self::Sitemap => "sitemap",
        }
    }
}

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

/// Compiled route patterns plus the public URL prefix for building links.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public_url: String,
    routes: BTreeMap<RouteName, Pattern>,
}

impl RouteTable {
    /// Compile [`ROUTE_PATTERNS`].
    ///
    /// `public_url` (e.g. `https://wals.info`) is prepended to every built
    /// URL; pass an empty string for host-relative URLs.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if a pattern fails to compile.
    pub fn new(public_url: &str) -> Result<Self, RouteError> {
        let routes = ROUTE_PATTERNS
            .iter()
            .map(|(name, pattern)| Pattern::parse(pattern).map(|p| (*name, p)))
            .collect::<Result<BTreeMap<_, _>, RouteError>>()?;
        Ok(Self {
            public_url: public_url.trim_end_matches('/').to_owned(),
            routes,
        })
    }

    /// The compiled pattern for a route.
    pub fn pattern(&self, name: RouteName) -> Option<&Pattern> {
        self.routes.get(&name)
    }

    /// Build the URL for a named route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingParam`] if a placeholder has no value.
    pub fn route_url(&self, name: RouteName, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let pattern = self
            .routes
            .get(&name)
            .ok_or_else(|| RouteError::InvalidPattern {
                pattern: name.as_str().to_owned(),
                reason: String::from("route is not registered"),
            })?;
        let path = pattern.build(params)?;
        Ok(format!("{}{path}", self.public_url))
    }

    /// Match a host-relative `path` against one named route.
    pub fn match_route(&self, name: RouteName, path: &str) -> Option<MatchDict> {
        self.routes.get(&name)?.matches(path)
    }

    /// Shorthand for routes with a single `id` placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the route has other placeholders.
    pub fn resource_url(&self, name: RouteName, id: &str) -> Result<String, RouteError> {
        self.route_url(name, &[("id", id)])
    }
}
