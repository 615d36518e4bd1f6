//! Décodage des fichiers texte
//!
//! Les CSV du Census Bureau sont en Latin-1 ; les exports retravaillés sont
//! généralement en UTF-8. On valide l'UTF-8 (SIMD) et on retombe sur Windows-1252.

use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Décode des octets en texte, sans copie quand la source est de l'UTF-8 valide
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    match simdutf8::basic::from_utf8(data) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(data);
            tracing::debug!(bytes = data.len(), "Source is not UTF-8, decoded as Windows-1252");
            decoded
        }
    }
}
