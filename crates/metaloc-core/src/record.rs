//! Location records as read from the import file.
//!
//! A [`LocationRecord`] is an ordered field-name → value mapping. Values are
//! opaque strings; nothing beyond presence is validated before upload.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("row has {found} column(s) but the header has {expected}")]
    ArityMismatch { expected: usize, found: usize },
}

/// One location, keyed by header name in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationRecord {
    fields: Vec<(String, String)>,
}

impl LocationRecord {
    /// Pair a header row with a data row.
    ///
    /// A header name that appears twice keeps its first position and takes
    /// the later value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ArityMismatch`] if the two rows differ in length.
    pub fn from_row<H, V>(headers: &[H], values: &[V]) -> Result<Self, RecordError>
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        if headers.len() != values.len() {
            return Err(RecordError::ArityMismatch {
                expected: headers.len(),
                found: values.len(),
            });
        }

        let mut record = Self::default();
        for (name, value) in headers.iter().zip(values) {
            record.insert(name.as_ref(), value.as_ref());
        }
        Ok(record)
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            value.clone_into(&mut slot.1);
        } else {
            self.fields.push((name.to_owned(), value.to_owned()));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl Serialize for LocationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for LocationRecord
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (name, value) in iter {
            record.insert(name.as_ref(), value.as_ref());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_pairs_headers_with_values() {
        let record = LocationRecord::from_row(
            &["Name", "City", "published"],
            &["Blue Door Cafe", "Charleston", "1"],
        )
        .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Name"), Some("Blue Door Cafe"));
        assert_eq!(record.get("City"), Some("Charleston"));
        assert_eq!(record.get("published"), Some("1"));
        assert_eq!(record.get("State"), None);
    }

    #[test]
    fn from_row_rejects_mismatched_arity() {
        let err = LocationRecord::from_row(&["Name", "City"], &["only one"]).unwrap_err();
        assert_eq!(
            err,
            RecordError::ArityMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn duplicate_header_keeps_position_and_last_value() {
        let record =
            LocationRecord::from_row(&["Name", "Phone", "Name"], &["first", "555", "second"])
                .unwrap();
        let fields: Vec<_> = record.iter().collect();
        assert_eq!(fields, vec![("Name", "second"), ("Phone", "555")]);
    }

    #[test]
    fn serializes_to_json_object_with_header_keys() {
        let headers = ["Name", "Address", "Monday Hours", "category1"];
        let values = ["Hub", "1 Main St", "9-5", "Coffee"];
        let record = LocationRecord::from_row(&headers, &values).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().expect("record serializes to an object");
        assert_eq!(object.len(), headers.len());
        for (h, v) in headers.iter().zip(values) {
            assert_eq!(object.get(*h).and_then(|x| x.as_str()), Some(v));
        }
    }

    #[test]
    fn serialization_preserves_header_order() {
        let record: LocationRecord = [("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"z":"1","a":"2","m":"3"}"#);
    }
}
