//! Traits shared by the value types of this crate

/// A property value type, as listed in RFC 5545 section 3.3
///
/// Implementors turn the raw text found after a property's `:` into a value, and back.
pub trait DataType {
    /// The name used in a `VALUE=` parameter (e.g. `TEXT`)
    const NAME: &'static str;
    type Value;
    type Error: std::error::Error;

    /// Decode the raw value of `property`
    fn decode(property: &str, raw: &str) -> Result<Self::Value, Self::Error>;
    /// Encode a value so that it can be written after `property:`
    fn encode(property: &str, value: &Self::Value) -> String;
}
