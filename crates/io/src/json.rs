// JSON export

use std::io::Write;

use serde::Serialize;

use crate::error::IoError;

/// Pretty-printed JSON, as written by `--format json`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn write_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> Result<(), IoError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelgrid_recon::{reconcile, ParcelInput};

    #[test]
    fn result_fields_are_snake_case() {
        let result = reconcile(100.0, 100.0, &[ParcelInput::new("1", 10.0)]).unwrap();
        let json = to_json(&result).unwrap();
        let val: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(val["exceeds_limit"], serde_json::json!(false));
        assert_eq!(val["total_rounded_area"], serde_json::json!(10));
        assert_eq!(val["rows"][0]["label"], serde_json::json!("1"));
        assert_eq!(val["rows"][0]["adjusted_area"], serde_json::json!(10.0));
        assert_eq!(val["rows"][0]["rounded_area"], serde_json::json!(10));
    }

    #[test]
    fn write_json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&vec![1, 2], &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.ends_with("]\n"));
    }
}
