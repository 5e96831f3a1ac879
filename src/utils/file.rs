use base64::{engine::general_purpose, Engine as _};

use crate::errors::Result;

pub const DEFAULT_FILE_NAME: &str = "photo.jpg";

/// Extension as written in the file name, or `jpg` when the name has none.
pub fn get_file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or("jpg")
}

pub fn get_content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Accepts raw base64 or a `data:<mime>;base64,<payload>` URL.
pub fn decode_file_data(file_data: &str) -> Result<Vec<u8>> {
    let payload = match file_data.split_once(',') {
        Some((_, payload)) if file_data.starts_with("data:") => payload,
        _ => file_data,
    };

    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Ok(general_purpose::STANDARD.decode(cleaned)?)
}

pub fn generate_photo_key(id: uuid::Uuid, extension: &str) -> String {
    format!("photos/{}.{}", id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_extension_from_name() {
        assert_eq!(get_file_extension("holiday.PNG"), "PNG");
        assert_eq!(get_file_extension("archive.tar.gz"), "gz");
        assert_eq!(get_file_extension("no_extension"), "jpg");
        assert_eq!(get_file_extension(DEFAULT_FILE_NAME), "jpg");
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(get_content_type("PNG"), "image/png");
        assert_eq!(get_content_type("gif"), "image/gif");
        assert_eq!(get_content_type("WebP"), "image/webp");
        assert_eq!(get_content_type("jpeg"), "image/jpeg");
        assert_eq!(get_content_type("bmp"), "image/jpeg");
    }

    #[test]
    fn test_decode_raw_and_data_url() {
        assert_eq!(decode_file_data("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_file_data("data:image/png;base64,aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_file_data("aGVs\nbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_file_data("not base64!!").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_photo_key_layout() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            generate_photo_key(id, "png"),
            "photos/00000000-0000-0000-0000-000000000000.png"
        );
    }
}
