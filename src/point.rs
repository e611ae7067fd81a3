// point.rs

use std::fmt::Write;

/// Value of a single field in a line-protocol record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Float32(f32),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl FieldValue {
    fn is_representable(&self) -> bool {
        match self {
            FieldValue::Float(v) => v.is_finite(),
            FieldValue::Float32(v) => v.is_finite(),
            _ => true,
        }
    }

    fn write_to(&self, out: &mut String) {
        // writing into a String cannot fail
        let _ = match self {
            FieldValue::Float(v) => write!(out, "{v}"),
            FieldValue::Float32(v) => write!(out, "{v}"),
            FieldValue::Integer(v) => write!(out, "{v}i"),
            FieldValue::Boolean(v) => write!(out, "{v}"),
            FieldValue::Text(s) => {
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                Ok(())
            }
        };
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float32(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One line-protocol record: measurement name, tags and fields.
///
/// Tags and fields keep their insertion order. Clearing keeps the allocations,
/// so a long-lived point can be rebuilt on every loop pass.
#[derive(Clone, Debug)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl Point {
    pub fn new(measurement: &str) -> Self {
        Point {
            measurement: measurement.to_string(),
            tags: Vec::with_capacity(2),
            fields: Vec::with_capacity(2),
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn add_tag(&mut self, key: &str, value: &str) -> &mut Self {
        self.tags.push((key.to_string(), value.to_string()));
        self
    }

    pub fn add_field<V: Into<FieldValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    pub fn has_fields(&self) -> bool {
        self.fields.iter().any(|(_, v)| v.is_representable())
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Serialize without timestamp, the server stamps arrival time.
    /// Empty when no field is representable.
    pub fn to_line_protocol(&self) -> String {
        if !self.has_fields() {
            return String::new();
        }

        let mut out = String::with_capacity(64);
        escape_into(&mut out, &self.measurement, &[',', ' ']);
        for (k, v) in self.tags.iter() {
            out.push(',');
            escape_into(&mut out, k, &[',', '=', ' ']);
            out.push('=');
            escape_into(&mut out, v, &[',', '=', ' ']);
        }

        let mut sep = ' ';
        for (k, v) in self.fields.iter().filter(|(_, v)| v.is_representable()) {
            out.push(sep);
            escape_into(&mut out, k, &[',', '=', ' ']);
            out.push('=');
            v.write_to(&mut out);
            sep = ',';
        }
        out
    }
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_record_line() {
        let mut p = Point::new("temperature");
        p.add_tag("location", "studeerkamer")
            .add_field("value", 22.5f32)
            .add_field("fahrenheit", 72.5f32);
        assert_eq!(
            p.to_line_protocol(),
            "temperature,location=studeerkamer value=22.5,fahrenheit=72.5"
        );
    }

    #[test]
    fn integers_get_suffix() {
        let mut p = Point::new("device_status");
        p.add_tag("device", "ESP32")
            .add_tag("SSID", "home")
            .add_field("rssi", -61i32)
            .add_field("uptime", 300_123u64);
        assert_eq!(
            p.to_line_protocol(),
            "device_status,device=ESP32,SSID=home rssi=-61i,uptime=300123i"
        );
    }

    #[test]
    fn f32_fields_keep_short_form() {
        let mut p = Point::new("t");
        p.add_field("f", 22.0625f32 * 1.8 + 32.0);
        assert!(!p.to_line_protocol().contains("0000"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut p = Point::new("my temp,x");
        p.add_tag("room name", "a=b,c").add_field("note", "say \"hi\" \\o/");
        assert_eq!(
            p.to_line_protocol(),
            r#"my\ temp\,x,room\ name=a\=b\,c note="say \"hi\" \\o/""#
        );
    }

    #[test]
    fn booleans() {
        let mut p = Point::new("m");
        p.add_field("ok", true);
        assert_eq!(p.to_line_protocol(), "m ok=true");
    }

    #[test]
    fn non_finite_fields_are_left_out() {
        let mut p = Point::new("m");
        p.add_field("bad", f32::NAN).add_field("good", 1.5f64);
        assert_eq!(p.to_line_protocol(), "m good=1.5");

        let mut q = Point::new("m");
        q.add_field("bad", f64::INFINITY);
        assert!(!q.has_fields());
        assert_eq!(q.to_line_protocol(), "");
    }

    #[test]
    fn clear_then_set_is_repeatable() {
        let mut p = Point::new("temperature");
        let mut lines = Vec::new();
        for _ in 0..2 {
            p.clear_tags();
            p.clear_fields();
            p.add_tag("location", "studeerkamer")
                .add_field("value", 19.25f32)
                .add_field("fahrenheit", 66.65f32);
            lines.push(p.to_line_protocol());
        }
        assert_eq!(lines[0], lines[1]);
        assert_eq!(p.field("value"), Some(&FieldValue::Float32(19.25)));
        assert_eq!(p.tag("location"), Some("studeerkamer"));
    }
}

// EOF
