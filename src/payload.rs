use crate::PayloadValue;

/// Ordered key/value request body. May include binary attachments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<(String, PayloadValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a payload from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PayloadValue>,
    {
        let mut payload = Self::new();
        for (key, value) in pairs {
            payload.insert(key, value);
        }
        payload
    }

    /// Sets a field, replacing an existing value with the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Sets a field only if the key is absent. Caller-supplied values win over defaults.
    pub fn insert_default(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.fields.push((key, value.into()));
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PayloadValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn has_blob(&self) -> bool {
        self.fields.iter().any(|(_, value)| value.is_blob())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Text fields only, for form-urlencoded bodies.
    pub(crate) fn text_fields(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(key, value)| value.as_text().map(|text| (key.as_str(), text)))
            .collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Payload
where
    K: Into<String>,
    V: Into<PayloadValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs)
    }
}

impl IntoIterator for Payload {
    type Item = (String, PayloadValue);
    type IntoIter = std::vec::IntoIter<(String, PayloadValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
