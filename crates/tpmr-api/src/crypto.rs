// Login handshake cryptography
//
// The device publishes an RSA public key (`nn`, `ee`) and a sequence number
// on `/cgi/getParm`. The client picks a fresh AES-128-CBC key/IV, encrypts
// the credentials with it, and proves possession of that key by RSA-encrypting
// a signature string that carries the key, IV, a credential hash, and
// `seq + len(data)`. Nothing here is reused across logins.

use std::fmt::Write;

use aes::Aes128;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use num_bigint::BigUint;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// PKCS#1 overhead the device's JS subtracts from the modulus size when
/// splitting the signature into RSA blocks.
const RSA_BLOCK_OVERHEAD: usize = 11;

/// Anything shorter leaves no room for a signature block.
const MIN_MODULUS_BITS: u64 = 256;

/// Find `var <name>="<value>";` in a JavaScript blob served by the device.
pub(crate) fn extract_js_var<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("var {name}=\"");
    let start = text.find(&needle)? + needle.len();
    let rest = text.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end)
}

/// Find the handshake return code `$.ret=<code>;`.
pub(crate) fn extract_ret_code(text: &str) -> Option<i64> {
    let start = text.find("$.ret=")? + "$.ret=".len();
    let rest = text.get(start..)?;
    let end = rest.find(';').unwrap_or(rest.len());
    rest.get(..end)?.trim().parse().ok()
}

// ── Key material ─────────────────────────────────────────────────────

/// Ephemeral public-key parameters fetched at the start of each login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    modulus: BigUint,
    exponent: BigUint,
    seq: u64,
}

impl KeyMaterial {
    /// Build key material from the hex modulus/exponent and decimal sequence.
    pub fn new(modulus_hex: &str, exponent_hex: &str, seq: u64) -> Result<Self, Error> {
        let modulus = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
            .ok_or_else(|| Error::KeyMaterial(format!("modulus is not hex: {modulus_hex:?}")))?;
        let exponent = BigUint::parse_bytes(exponent_hex.as_bytes(), 16)
            .ok_or_else(|| Error::KeyMaterial(format!("exponent is not hex: {exponent_hex:?}")))?;

        if modulus.bits() < MIN_MODULUS_BITS {
            return Err(Error::KeyMaterial(format!(
                "modulus too small ({} bits)",
                modulus.bits()
            )));
        }

        Ok(Self {
            modulus,
            exponent,
            seq,
        })
    }

    /// Parse the `/cgi/getParm` reply.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let field = |name: &str| {
            extract_js_var(body, name)
                .ok_or_else(|| Error::malformed(format!("key reply has no `{name}`"), body))
        };
        let exponent = field("ee")?;
        let modulus = field("nn")?;
        let seq = field("seq")?
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::malformed("key reply `seq` is not a number", body))?;
        Self::new(modulus, exponent, seq)
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Modulus size in bytes.
    pub fn modulus_len(&self) -> usize {
        usize::try_from(self.modulus.bits().div_ceil(8)).unwrap_or(usize::MAX)
    }

    /// Raw RSA over `plaintext`, block by block.
    ///
    /// Each block of `modulus_len - 11` bytes is zero-padded on the right to
    /// the modulus length, raised to the exponent, and written as fixed-width
    /// lowercase hex. Block outputs are concatenated.
    pub fn encrypt_hex(&self, plaintext: &[u8]) -> String {
        let size = self.modulus_len();
        let block_len = size.saturating_sub(RSA_BLOCK_OVERHEAD).max(1);
        let width = size * 2;

        let mut out = String::with_capacity(plaintext.len().div_ceil(block_len) * width);
        for block in plaintext.chunks(block_len) {
            let mut padded = vec![0u8; size];
            padded
                .iter_mut()
                .zip(block)
                .for_each(|(dst, src)| *dst = *src);
            let cipher = BigUint::from_bytes_be(&padded).modpow(&self.exponent, &self.modulus);
            let _ = write!(out, "{:0>width$}", cipher.to_str_radix(16));
        }
        out
    }
}

// ── Symmetric session key ────────────────────────────────────────────

/// AES-128-CBC key and IV, each 16 ASCII digits, generated per login.
pub struct SessionCipher {
    key: [u8; 16],
    iv: [u8; 16],
}

impl SessionCipher {
    /// Millisecond timestamp followed by random digits, cut to 16 characters.
    pub fn generate() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let key = digits16(&format!("{now}{}", rng.gen_range(100_000_000_u32..1_000_000_000)));
        let iv = digits16(&format!("{now}{}", rng.gen_range(100_000_000_u32..1_000_000_000)));
        Self { key, iv }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(key: [u8; 16], iv: [u8; 16]) -> Self {
        Self { key, iv }
    }

    pub fn key(&self) -> &str {
        std::str::from_utf8(&self.key).unwrap_or_default()
    }

    pub fn iv(&self) -> &str {
        std::str::from_utf8(&self.iv).unwrap_or_default()
    }

    /// PKCS#7-padded AES-128-CBC, base64 encoded.
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let cipher = Aes128CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        STANDARD.encode(cipher)
    }
}

fn digits16(source: &str) -> [u8; 16] {
    let mut out = [b'0'; 16];
    out.iter_mut()
        .zip(source.bytes())
        .for_each(|(dst, src)| *dst = src);
    out
}

/// Lowercase hex MD5 of `username + password`, as the device computes it.
pub fn credential_hash(username: &str, password: &SecretString) -> String {
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(password.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

// ── Login payload ────────────────────────────────────────────────────

/// The two query parameters submitted to `/cgi/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPayload {
    /// Base64 AES ciphertext of `username\npassword`.
    pub data: String,
    /// Hex RSA ciphertext of the signature string.
    pub sign: String,
}

impl LoginPayload {
    /// Encrypt credentials under a freshly generated session cipher.
    pub fn build(key: &KeyMaterial, username: &str, password: &SecretString) -> Self {
        Self::build_with(key, &SessionCipher::generate(), username, password)
    }

    pub(crate) fn build_with(
        key: &KeyMaterial,
        cipher: &SessionCipher,
        username: &str,
        password: &SecretString,
    ) -> Self {
        let plaintext = format!("{username}\n{}", password.expose_secret());
        let data = cipher.encrypt(plaintext.as_bytes());

        let seq = key.seq().saturating_add(u64::try_from(data.len()).unwrap_or(u64::MAX));
        let signature = format!(
            "k={}&i={}&h={}&s={seq}",
            cipher.key(),
            cipher.iv(),
            credential_hash(username, password),
        );
        let sign = key.encrypt_hex(signature.as_bytes());

        Self { data, sign }
    }
}

#[cfg(test)]
mod tests {
    use cbc::cipher::BlockDecryptMut;

    use super::*;

    type Aes128CbcDec = cbc::Decryptor<Aes128>;

    /// 512-bit all-ones modulus with exponent 1: encryption is the identity,
    /// so the hex output exposes the padded blocks.
    fn identity_key(seq: u64) -> KeyMaterial {
        KeyMaterial::new(&"f".repeat(128), "1", seq).expect("valid key")
    }

    #[test]
    fn parses_get_parm_reply() {
        let modulus = format!("C5A3F1{}", "0".repeat(122));
        let body = format!("var ee=\"010001\";\nvar nn=\"{modulus}\";\nvar seq=\"987654321\";\n$.ret=0;\n");
        let key = KeyMaterial::parse(&body).expect("parses");
        assert_eq!(key.seq(), 987_654_321);
        assert_eq!(key.modulus_len(), 64);
    }

    #[test]
    fn missing_modulus_is_malformed() {
        let err = KeyMaterial::parse("var ee=\"010001\";\nvar seq=\"1\";\n")
            .expect_err("no modulus");
        assert!(matches!(err, Error::MalformedResponse { .. }), "{err:?}");
    }

    #[test]
    fn bad_hex_is_rejected() {
        let err = KeyMaterial::new("zz", "010001", 1).expect_err("bad hex");
        assert!(matches!(err, Error::KeyMaterial(_)));
    }

    #[test]
    fn rsa_blocks_are_padded_and_fixed_width() {
        let key = identity_key(0);
        let plaintext = [b'a'; 60];
        let hex_out = key.encrypt_hex(&plaintext);

        // 60 bytes at 53 per block → two 64-byte blocks.
        assert_eq!(hex_out.len(), 2 * 128);
        let first = hex::decode(&hex_out[..128]).expect("hex");
        assert_eq!(&first[..53], &[b'a'; 53]);
        assert!(first[53..].iter().all(|b| *b == 0));
        let second = hex::decode(&hex_out[128..]).expect("hex");
        assert_eq!(&second[..7], &[b'a'; 7]);
        assert!(second[7..].iter().all(|b| *b == 0));
    }

    #[test]
    fn cipher_digits_are_sixteen_ascii_digits() {
        let cipher = SessionCipher::generate();
        assert_eq!(cipher.key().len(), 16);
        assert_eq!(cipher.iv().len(), 16);
        assert!(cipher.key().bytes().all(|b| b.is_ascii_digit()));
        assert!(cipher.iv().bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn aes_round_trips_with_device_parameters() {
        let cipher = SessionCipher::from_parts(*b"1700000000000123", *b"1700000000000456");
        let encoded = cipher.encrypt(b"admin\nsecret");
        let mut raw = STANDARD.decode(encoded).expect("base64");
        let plain = Aes128CbcDec::new(b"1700000000000123".into(), b"1700000000000456".into())
            .decrypt_padded_mut::<Pkcs7>(&mut raw)
            .expect("unpad");
        assert_eq!(plain, b"admin\nsecret");
    }

    #[test]
    fn credential_hash_is_md5_of_concatenation() {
        let password = SecretString::from("admin".to_owned());
        // md5("adminadmin")
        assert_eq!(
            credential_hash("admin", &password),
            "f6fdffe48c908deb0f4c3bd36c032e72"
        );
    }

    #[test]
    fn signature_carries_key_iv_hash_and_sequence() {
        let key = identity_key(1000);
        let cipher = SessionCipher::from_parts(*b"1111111111111111", *b"2222222222222222");
        let password = SecretString::from("admin".to_owned());
        let payload = LoginPayload::build_with(&key, &cipher, "admin", &password);

        let bytes = hex::decode(&payload.sign).expect("hex");
        let text: String = bytes
            .chunks(64)
            .flat_map(|block| block.iter().take(53).copied())
            .filter(|b| *b != 0)
            .map(char::from)
            .collect();
        let expected_seq = 1000 + payload.data.len();
        assert_eq!(
            text,
            format!(
                "k=1111111111111111&i=2222222222222222&h=f6fdffe48c908deb0f4c3bd36c032e72&s={expected_seq}"
            )
        );
    }

    #[test]
    fn extracts_js_values() {
        let page = "<script>var token=\"abc123\";</script>";
        assert_eq!(extract_js_var(page, "token"), Some("abc123"));
        assert_eq!(extract_js_var(page, "missing"), None);
        assert_eq!(extract_ret_code("$.ret=71233;\nvar x=1;"), Some(71233));
        assert_eq!(extract_ret_code("$.ret=0;"), Some(0));
        assert_eq!(extract_ret_code("nothing here"), None);
    }
}
