use std::collections::BTreeMap;

/// Keys that shape the response rather than filter it.
pub const RESERVED_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];

/// A decoded query-string value: repeated keys collapse into `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::One(v) => vec![v.as_str()],
            ParamValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// The value to use where only one makes sense; the last occurrence wins
    pub fn last(&self) -> &str {
        match self {
            ParamValue::One(v) => v,
            ParamValue::Many(vs) => vs.last().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Untrusted query parameters, exactly as the caller sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams(BTreeMap<String, ParamValue>);

impl RawParams {
    /// Decode an `application/x-www-form-urlencoded` query string
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self::from_pairs(pairs)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, ParamValue> = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match map.remove(&key) {
                None => {
                    map.insert(key, ParamValue::One(value));
                }
                Some(ParamValue::One(prev)) => {
                    map.insert(key, ParamValue::Many(vec![prev, value]));
                }
                Some(ParamValue::Many(mut prev)) => {
                    prev.push(value);
                    map.insert(key, ParamValue::Many(prev));
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Last value for `key`, ignoring empty strings
    pub fn single(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(ParamValue::last).filter(|v| !v.trim().is_empty())
    }

    /// Every parameter that is not one of [`RESERVED_PARAMS`]
    pub fn filters(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0
            .iter()
            .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }
}
