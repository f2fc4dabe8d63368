use std::cmp::Ordering;

use crate::utils::path::{decode_segment, encode_segment};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    /// `:name`, one segment.
    Param(String),
    /// `:name(.*)*`, any number of segments including none.
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(':') {
            Some(rest) => match rest.find('(') {
                Some(paren) => Segment::CatchAll(rest[..paren].to_string()),
                None => Segment::Param(rest.to_string()),
            },
            None => Segment::Static(raw.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Segment::Static(_) => 3,
            Segment::Param(_) => 2,
            Segment::CatchAll(_) => 0,
        }
    }
}

/// A parsed route path such as `/gat/:courseName/people/:user/`.
///
/// Trailing slashes are kept for building links but ignored when matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    trailing_slash: bool,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        PathPattern {
            raw: raw.to_string(),
            segments: split(raw).map(Segment::parse).collect(),
            trailing_slash: raw.len() > 1 && raw.ends_with('/'),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Names of the parameters this pattern captures, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Match already-split path segments, returning decoded parameters.
    pub fn matches(&self, path: &[&str]) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest: Vec<String> = path
                        .get(i..)
                        .unwrap_or_default()
                        .iter()
                        .map(|s| decode_segment(s).into_owned())
                        .collect();
                    params.push((name.clone(), rest.join("/")));
                    return Some(params);
                }
                // Static text matches in any case; parameter values keep theirs.
                Segment::Static(expected) => match path.get(i) {
                    Some(actual) if actual.eq_ignore_ascii_case(expected) => {}
                    _ => return None,
                },
                Segment::Param(name) => {
                    let value = path.get(i)?;
                    params.push((name.clone(), decode_segment(value).into_owned()));
                }
            }
        }
        (path.len() == self.segments.len()).then_some(params)
    }

    /// Fill in the pattern. `lookup` returns the value of a parameter.
    pub(crate) fn build<'a>(
        &self,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<String, String> {
        let mut path = String::new();
        for segment in &self.segments {
            let part = match segment {
                Segment::Static(text) => text.clone(),
                Segment::Param(name) => {
                    let value = lookup(name.as_str()).ok_or_else(|| name.clone())?;
                    encode_segment(value)
                }
                Segment::CatchAll(name) => lookup(name.as_str())
                    .unwrap_or_default()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(encode_segment)
                    .collect::<Vec<_>>()
                    .join("/"),
            };
            if part.is_empty() {
                continue;
            }
            path.push('/');
            path.push_str(&part);
        }
        if path.is_empty() || self.trailing_slash {
            path.push('/');
        }
        Ok(path)
    }

    /// More specific patterns sort first: static segments beat parameters
    /// position by position, and a catch-all always sorts last.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        self.is_catch_all()
            .cmp(&other.is_catch_all())
            .then_with(|| {
                let ranks = |p: &Self| p.segments.iter().map(Segment::rank).collect::<Vec<_>>();
                ranks(other).cmp(&ranks(self))
            })
    }
}

/// Non-empty segments of a path.
pub(crate) fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
