use soroban_sdk::{contractclient, Address, Bytes, Env, String};

use crate::error::Error;

const MAX_URI_LEN: usize = 256;

/// Optional collaborator that renders per-unit metadata.
#[contractclient(name = "MetadataRendererClient")]
pub trait MetadataRenderer {
    fn token_uri(env: Env, market: Address, token_id: u32) -> String;

    fn initialize_token_metadata(env: Env, market: Address, data: Bytes);
}

/// Static URI template with the decimal `id` appended
pub fn static_uri(env: &Env, base: &String, id: u32) -> Result<String, Error> {
    let mut digits = [0u8; 10];
    let mut start = digits.len();
    let mut rest = id;
    loop {
        start -= 1;
        digits[start] = b'0' + (rest % 10) as u8;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    let id_digits = &digits[start..];

    let base_len = base.len() as usize;
    let total = base_len + id_digits.len();
    if total > MAX_URI_LEN {
        return Err(Error::UriTooLong);
    }

    let mut buf = [0u8; MAX_URI_LEN];
    base.copy_into_slice(&mut buf[..base_len]);
    buf[base_len..total].copy_from_slice(id_digits);

    Ok(String::from_bytes(env, &buf[..total]))
}
