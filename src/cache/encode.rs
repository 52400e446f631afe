//! Key Encoding Module
//!
//! Serializes call arguments into a canonical, lossless token string.
//!
//! Every token carries a type tag and strings are length-prefixed, so
//! concatenated tokens never run into each other. `None` and `Some(x)` stay
//! apart, non-finite floats keep their value, and map entries are sorted by
//! their encoded key so iteration order never leaks into the key.

use std::fmt::{self, Write};

use serde::ser::{self, Serialize};

// == Encode Error ==
/// Failure raised by an argument's `Serialize` impl.
#[derive(Debug)]
pub struct EncodeError(String);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EncodeError {}

impl ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EncodeError(msg.to_string())
    }
}

type Result<T> = std::result::Result<T, EncodeError>;

/// Encodes `value` into its canonical key token.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut encoder = Encoder::default();
    value.serialize(&mut encoder)?;
    Ok(encoder.out)
}

#[derive(Default)]
struct Encoder {
    out: String,
}

impl Encoder {
    fn push_str_token(&mut self, tag: char, s: &str) {
        // Writing into a String cannot fail
        let _ = write!(self.out, "{tag}{}:{s}", s.len());
    }

    fn push_float(&mut self, v: f64) {
        // All NaNs are the same argument value
        let bits = if v.is_nan() { f64::NAN.to_bits() } else { v.to_bits() };
        let _ = write!(self.out, "f{bits:016x};");
    }
}

impl<'a> ser::Serializer for &'a mut Encoder {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = Seq<'a>;
    type SerializeTuple = Seq<'a>;
    type SerializeTupleStruct = Seq<'a>;
    type SerializeTupleVariant = Seq<'a>;
    type SerializeMap = Map<'a>;
    type SerializeStruct = Map<'a>;
    type SerializeStructVariant = Map<'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.out.push_str(if v { "b1" } else { "b0" });
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        let _ = write!(self.out, "i{v};");
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        let _ = write!(self.out, "i{v};");
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.push_float(f64::from(v));
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.push_float(v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.push_str_token('s', v.encode_utf8(&mut buf));
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.push_str_token('s', v);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        let _ = write!(self.out, "y{}:", v.len());
        for byte in v {
            let _ = write!(self.out, "{byte:02x}");
        }
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        self.out.push('n');
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        self.out.push('S');
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.out.push('z');
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.push_str_token('v', variant);
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push_str_token('V', variant);
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Seq<'a>> {
        Ok(Seq::open(self, None, '[', ']'))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Seq<'a>> {
        Ok(Seq::open(self, None, '(', ')'))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Seq<'a>> {
        Ok(Seq::open(self, None, '(', ')'))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Seq<'a>> {
        Ok(Seq::open(self, Some(variant), '(', ')'))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Map<'a>> {
        Ok(Map::new(self, None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Map<'a>> {
        Ok(Map::new(self, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Map<'a>> {
        Ok(Map::new(self, Some(variant)))
    }
}

// == Sequences ==
/// Elements are written in order between delimiters.
pub struct Seq<'a> {
    encoder: &'a mut Encoder,
    close: char,
}

impl<'a> Seq<'a> {
    fn open(encoder: &'a mut Encoder, variant: Option<&str>, open: char, close: char) -> Self {
        if let Some(variant) = variant {
            encoder.push_str_token('V', variant);
        }
        encoder.out.push(open);
        Self { encoder, close }
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.encoder)
    }

    fn close(self) -> Result<()> {
        self.encoder.out.push(self.close);
        Ok(())
    }
}

impl ser::SerializeSeq for Seq<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTuple for Seq<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTupleStruct for Seq<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTupleVariant for Seq<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

// == Maps ==
/// Entries are buffered, then written sorted by encoded key.
pub struct Map<'a> {
    encoder: &'a mut Encoder,
    entries: Vec<(String, String)>,
    pending_key: Option<String>,
}

impl<'a> Map<'a> {
    fn new(encoder: &'a mut Encoder, variant: Option<&str>) -> Self {
        if let Some(variant) = variant {
            encoder.push_str_token('V', variant);
        }
        Self {
            encoder,
            entries: Vec::new(),
            pending_key: None,
        }
    }

    fn field<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let mut key = Encoder::default();
        key.push_str_token('s', name);
        self.entries.push((key.out, encode(value)?));
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.entries.sort();
        let out = &mut self.encoder.out;
        out.push('{');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(value);
        }
        out.push('}');
        Ok(())
    }
}

impl ser::SerializeMap for Map<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(encode(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| EncodeError("map value without a key".to_string()))?;
        self.entries.push((key, encode(value)?));
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeStruct for Map<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeStructVariant for Map<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_scalars() {
        assert_eq!(encode(&true).unwrap(), "b1");
        assert_eq!(encode(&-3i32).unwrap(), "i-3;");
        assert_eq!(encode("ab").unwrap(), "s2:ab");
        assert_eq!(encode(&()).unwrap(), "z");
    }

    #[test]
    fn test_option_tag_is_kept() {
        assert_ne!(encode(&None::<()>).unwrap(), encode(&Some(())).unwrap());
        assert_ne!(encode(&None::<Option<u8>>).unwrap(), encode(&Some(None::<u8>)).unwrap());
    }

    #[test]
    fn test_non_finite_floats_are_distinct() {
        let nan = encode(&f64::NAN).unwrap();
        let inf = encode(&f64::INFINITY).unwrap();
        let neg_inf = encode(&f64::NEG_INFINITY).unwrap();

        assert_ne!(nan, inf);
        assert_ne!(inf, neg_inf);
        assert_ne!(nan, encode(&None::<f64>).unwrap());
        assert_eq!(nan, encode(&-f64::NAN).unwrap());
    }

    #[test]
    fn test_strings_are_length_prefixed() {
        assert_ne!(encode(&("ab", "")).unwrap(), encode(&("a", "b")).unwrap());
        assert_ne!(encode(&("a:1", "")).unwrap(), encode(&("a", ":1")).unwrap());
    }

    #[test]
    fn test_map_order_is_canonical() {
        let forward: HashMap<String, u32> = (0..32).map(|i| (format!("k{i}"), i)).collect();
        let backward: HashMap<String, u32> = (0..32).rev().map(|i| (format!("k{i}"), i)).collect();
        let sorted: BTreeMap<String, u32> = (0..32).map(|i| (format!("k{i}"), i)).collect();

        assert_eq!(encode(&forward).unwrap(), encode(&backward).unwrap());
        assert_eq!(encode(&forward).unwrap(), encode(&sorted).unwrap());
    }

    #[test]
    fn test_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        map.insert(vec![2u8], 2);

        assert_eq!(encode(&map).unwrap(), "{[i1;]i1;[i2;]i2;}");
    }

    #[test]
    fn test_enum_variants_differ() {
        #[derive(Serialize)]
        enum Range {
            All,
            Day(u32),
            Span { from: u32, to: u32 },
        }

        let all = encode(&Range::All).unwrap();
        let day = encode(&Range::Day(1)).unwrap();
        let span = encode(&Range::Span { from: 1, to: 2 }).unwrap();

        assert_ne!(all, day);
        assert_ne!(day, span);
        assert_eq!(span, "V4:Span{s2:toi2;s4:fromi1;}");
    }

    #[test]
    fn test_serialize_failure_is_reported() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: ser::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
                Err(ser::Error::custom("cannot encode"))
            }
        }

        let err = encode(&(1, Broken)).unwrap_err();
        assert_eq!(err.to_string(), "cannot encode");
    }
}
