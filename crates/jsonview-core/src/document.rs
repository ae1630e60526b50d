use serde_json::Value as JsonValue;
use std::{fmt, io};

///
/// SerializedDocument
///
/// Result of a serialize call: the caller's value (borrowed, never owned), the
/// json document, and its text form computed once at construction.
///

pub struct SerializedDocument<'a, T: ?Sized> {
    native: Option<&'a T>,
    document: JsonValue,
    text: String,
}

impl<'a, T: ?Sized> SerializedDocument<'a, T> {
    #[must_use]
    pub fn new(native: Option<&'a T>, document: JsonValue) -> Self {
        let text = document.to_string();

        Self {
            native,
            document,
            text,
        }
    }

    /// The value this document was produced from, if any.
    #[must_use]
    pub const fn native(&self) -> Option<&'a T> {
        self.native
    }

    #[must_use]
    pub const fn document(&self) -> &JsonValue {
        &self.document
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_document(self) -> JsonValue {
        self.document
    }

    /// Write the text form verbatim, as a response body writer would.
    pub fn write_to(&self, mut writer: impl io::Write) -> io::Result<()> {
        writer.write_all(self.text.as_bytes())?;
        writer.flush()
    }
}

impl<T: ?Sized> fmt::Debug for SerializedDocument<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedDocument")
            .field("has_native", &self.native.is_some())
            .field("document", &self.document)
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for SerializedDocument<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_matches_the_document_and_is_written_verbatim() {
        let names = vec!["a".to_string()];
        let doc = SerializedDocument::new(Some(&names), json!({"name": "a", "age": 3}));

        let mut body = Vec::new();
        doc.write_to(&mut body).expect("write to a vec should succeed");

        assert_eq!(doc.text(), r#"{"name":"a","age":3}"#);
        assert_eq!(body, doc.text().as_bytes());
        assert_eq!(doc.to_string(), doc.text());
        assert_eq!(doc.native(), Some(&names));
    }

    #[test]
    fn documents_without_a_native_value_still_render() {
        let doc: SerializedDocument<'_, str> = SerializedDocument::new(None, JsonValue::Null);

        assert!(doc.native().is_none());
        assert_eq!(doc.text(), "null");
        assert_eq!(doc.into_document(), JsonValue::Null);
    }
}
