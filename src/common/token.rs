// src/common/token.rs

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};

/// 256 bits de entropia.
pub const INVITATION_TOKEN_BYTES: usize = 32;

/// Token de convite: bytes do gerador criptográfico do SO, em base64url sem padding.
pub fn generate_invitation_token() -> String {
    let mut bytes = [0u8; INVITATION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
