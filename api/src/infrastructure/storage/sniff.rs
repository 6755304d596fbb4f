//! Content sniffing for the accepted upload formats.

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_MP4: &str = "video/mp4";

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Detects the media type from leading bytes. Only JPEG, PNG and MP4 are
/// recognised; anything else yields `None`.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(MIME_JPEG)
    } else if bytes.starts_with(PNG_SIGNATURE) {
        Some(MIME_PNG)
    } else if is_mp4(bytes) {
        Some(MIME_MP4)
    } else {
        None
    }
}

// ISO base media: a leading `ftyp` box whose brand list mentions "mp4".
fn is_mp4(bytes: &[u8]) -> bool {
    if bytes.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if box_size < 12 || bytes.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if &bytes[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        // offset 12 holds the minor version, not a brand
        .filter(|&offset| offset != 12)
        .any(|offset| &bytes[offset..offset + 3] == b"mp4")
}

pub fn default_extension(mime: &str) -> &'static str {
    match mime {
        MIME_JPEG => "jpg",
        MIME_PNG => "png",
        MIME_MP4 => "mp4",
        _ => "bin",
    }
}

/// Keeps the uploaded file's extension when it agrees with the sniffed type.
pub fn extension_for(mime: &str, original_filename: Option<&str>) -> String {
    let from_name = original_filename
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .filter(|ext| {
            mime_guess::from_ext(ext)
                .iter()
                .any(|guess| guess.essence_str() == mime)
        });
    from_name.unwrap_or_else(|| default_extension(mime).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_header(brand: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 20];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(brand);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(b"isom");
        bytes.extend_from_slice(&[0u8; 16]);
        bytes
    }

    #[test]
    fn recognises_the_allowed_signatures() {
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), Some(MIME_JPEG));
        assert_eq!(detect_mime(PNG_SIGNATURE), Some(MIME_PNG));
        assert_eq!(detect_mime(&mp4_header(b"mp42")), Some(MIME_MP4));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(detect_mime(b"GIF89a......"), None);
        assert_eq!(detect_mime(b"%PDF-1.7 hello world"), None);
        assert_eq!(detect_mime(b""), None);
        assert_eq!(detect_mime(&mp4_header(b"qt  ")), None);
    }

    #[test]
    fn extension_follows_content_not_name() {
        assert_eq!(extension_for(MIME_JPEG, Some("holiday.JPEG")), "jpeg");
        assert_eq!(extension_for(MIME_JPEG, Some("holiday.png")), "jpg");
        assert_eq!(extension_for(MIME_PNG, None), "png");
        assert_eq!(extension_for(MIME_MP4, Some("clip")), "mp4");
    }
}
